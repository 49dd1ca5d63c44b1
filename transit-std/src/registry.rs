//! Listener registry.
//!
//! A [`ListenerRegistry`] maps event keys to ordered listener lists. It is a
//! shared handle: the host creates one when it sets up its store, attaches it
//! to the middleware and hands it to every subscription.

use parking_lot::RwLock;
use std::{
    collections::HashMap,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use transit_core::{BoxError, Event, EventKey, EventKeyResolver, HookResult, IntoHookResult};

static NEXT_LISTENER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`Callback`]. Clones of a callback share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn next() -> Self {
        Self(NEXT_LISTENER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

type ListenerFn<A> = dyn Fn(&Event<A>) -> Result<HookResult, BoxError> + Send + Sync;

/// A listener callback with a stable identity.
///
/// Registration and deregistration compare callbacks by [`ListenerId`], so
/// the same `Callback` value (or a clone of it) must be used for both.
pub struct Callback<A> {
    id: ListenerId,
    f: Arc<ListenerFn<A>>,
}

impl<A: 'static> Callback<A> {
    /// Wrap a closure. It may return `()`, `bool`, [`HookResult`] or a
    /// `Result` of those.
    pub fn new<F, R>(f: F) -> Self
    where
        F: Fn(&Event<A>) -> R + Send + Sync + 'static,
        R: IntoHookResult + 'static,
    {
        Self {
            id: ListenerId::next(),
            f: Arc::new(move |event: &Event<A>| f(event).into_hook_result()),
        }
    }
}

impl<A> Callback<A> {
    /// The callback's identity.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Invoke the callback.
    pub fn call(&self, event: &Event<A>) -> Result<HookResult, BoxError> {
        (self.f)(event)
    }
}

impl<A> Clone for Callback<A> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            f: Arc::clone(&self.f),
        }
    }
}

impl<A> PartialEq for Callback<A> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<A> Eq for Callback<A> {}

impl<A> fmt::Debug for Callback<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Callback").field(&self.id.0).finish()
    }
}

struct RegistryInner<A> {
    resolver: EventKeyResolver,
    listeners: RwLock<HashMap<EventKey, Vec<Callback<A>>>>,
}

/// Shared map from [`EventKey`] to ordered listeners.
///
/// Cloning yields another handle to the same registry. One registry belongs
/// to one store; nothing is global.
///
/// # Example
///
/// ```rust
/// use transit_std::registry::{Callback, ListenerRegistry};
/// use transit_core::{Event, EventKey, Tagged};
///
/// let registry = ListenerRegistry::<Tagged>::new();
/// let listener = Callback::new(|_event: &Event<Tagged>| ());
/// let key = EventKey::from("FETCH");
///
/// registry.register(key.clone(), &listener);
/// assert_eq!(registry.listener_count(&key), 1);
///
/// registry.deregister(&key, &listener);
/// assert!(registry.lookup(&key).is_empty());
/// ```
pub struct ListenerRegistry<A> {
    inner: Arc<RegistryInner<A>>,
}

impl<A> ListenerRegistry<A> {
    /// Create an empty registry with the default resolver.
    pub fn new() -> Self {
        Self::with_resolver(EventKeyResolver::default())
    }

    /// Create an empty registry resolving keys with `resolver`.
    pub fn with_resolver(resolver: EventKeyResolver) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                resolver,
                listeners: RwLock::new(HashMap::new()),
            }),
        }
    }

    /// The resolver shared by subscriptions and the middleware.
    pub fn resolver(&self) -> &EventKeyResolver {
        &self.inner.resolver
    }

    /// Append `callback` to the list for `key`.
    ///
    /// Returns `false` (and changes nothing) when this callback is already
    /// registered under `key`.
    pub fn register(&self, key: EventKey, callback: &Callback<A>) -> bool {
        let mut listeners = self.inner.listeners.write();
        let list = listeners.entry(key).or_default();
        if list.contains(callback) {
            #[cfg(feature = "tracing")]
            tracing::debug!(listener = ?callback.id(), "listener already registered, ignoring");
            return false;
        }
        list.push(callback.clone());
        true
    }

    /// Remove the first occurrence of `callback` from the list for `key`.
    ///
    /// Returns `false` when it was not registered there. Never fails.
    pub fn deregister(&self, key: &EventKey, callback: &Callback<A>) -> bool {
        let mut listeners = self.inner.listeners.write();
        let Some(list) = listeners.get_mut(key) else {
            return false;
        };
        let Some(position) = list.iter().position(|registered| registered == callback) else {
            return false;
        };
        list.remove(position);
        if list.is_empty() {
            listeners.remove(key);
        }
        true
    }

    /// Snapshot of the listeners for `key`, in registration order.
    ///
    /// The lock is released before returning, so the caller may invoke the
    /// listeners while they (de)register others.
    pub fn lookup(&self, key: &EventKey) -> Vec<Callback<A>> {
        self.inner
            .listeners
            .read()
            .get(key)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `callback` is registered under `key`.
    pub fn contains(&self, key: &EventKey, callback: &Callback<A>) -> bool {
        self.inner
            .listeners
            .read()
            .get(key)
            .is_some_and(|list| list.contains(callback))
    }

    /// Number of listeners registered under `key`.
    pub fn listener_count(&self, key: &EventKey) -> usize {
        self.inner.listeners.read().get(key).map_or(0, Vec::len)
    }

    /// Keys that currently have at least one listener.
    pub fn keys(&self) -> Vec<EventKey> {
        self.inner.listeners.read().keys().cloned().collect()
    }

    /// Number of keys with listeners.
    pub fn len(&self) -> usize {
        self.inner.listeners.read().len()
    }

    /// Whether no listener is registered.
    pub fn is_empty(&self) -> bool {
        self.inner.listeners.read().is_empty()
    }

    /// Whether both handles point to the same registry.
    pub fn same_registry(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<A> Default for ListenerRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for ListenerRegistry<A> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A> fmt::Debug for ListenerRegistry<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("resolver", &self.inner.resolver)
            .field("keys", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_core::Tagged;

    fn noop() -> Callback<Tagged> {
        Callback::new(|_event: &Event<Tagged>| ())
    }

    #[test]
    fn test_register_preserves_order() {
        let registry = ListenerRegistry::new();
        let key = EventKey::from("A");
        let (first, second) = (noop(), noop());

        registry.register(key.clone(), &first);
        registry.register(key.clone(), &second);

        let ids: Vec<_> = registry.lookup(&key).iter().map(Callback::id).collect();
        assert_eq!(ids, vec![first.id(), second.id()]);
    }

    #[test]
    fn test_duplicate_registration_is_ignored() {
        let registry = ListenerRegistry::new();
        let key = EventKey::from("A");
        let listener = noop();

        assert!(registry.register(key.clone(), &listener));
        assert!(!registry.register(key.clone(), &listener.clone()));
        assert_eq!(registry.listener_count(&key), 1);
    }

    #[test]
    fn test_deregister_removes_only_that_callback() {
        let registry = ListenerRegistry::new();
        let key = EventKey::from("A");
        let (first, second) = (noop(), noop());
        registry.register(key.clone(), &first);
        registry.register(key.clone(), &second);

        assert!(registry.deregister(&key, &first));
        assert!(!registry.contains(&key, &first));
        assert!(registry.contains(&key, &second));
    }

    #[test]
    fn test_deregister_unknown_is_noop() {
        let registry = ListenerRegistry::new();
        let listener = noop();
        assert!(!registry.deregister(&EventKey::from("NOPE"), &listener));

        registry.register(EventKey::from("A"), &noop());
        assert!(!registry.deregister(&EventKey::from("A"), &listener));
        assert_eq!(registry.listener_count(&EventKey::from("A")), 1);
    }

    #[test]
    fn test_empty_lists_are_dropped() {
        let registry = ListenerRegistry::new();
        let listener = noop();
        registry.register(EventKey::from("A"), &listener);
        registry.deregister(&EventKey::from("A"), &listener);
        assert!(registry.is_empty());
        assert!(registry.keys().is_empty());
    }

    #[test]
    fn test_clones_share_state() {
        let registry = ListenerRegistry::new();
        let handle = registry.clone();
        handle.register(EventKey::from("A"), &noop());
        assert!(registry.same_registry(&handle));
        assert_eq!(registry.len(), 1);
        assert!(!registry.same_registry(&ListenerRegistry::new()));
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn deregistering_keeps_survivor_order(removed in proptest::collection::vec(any::<bool>(), 1..12)) {
                let registry = ListenerRegistry::new();
                let key = EventKey::from("K");
                let listeners: Vec<_> = removed.iter().map(|_| noop()).collect();
                for listener in &listeners {
                    registry.register(key.clone(), listener);
                }
                for (listener, remove) in listeners.iter().zip(&removed) {
                    if *remove {
                        registry.deregister(&key, listener);
                    }
                }

                let expected: Vec<_> = listeners
                    .iter()
                    .zip(&removed)
                    .filter(|(_, remove)| !**remove)
                    .map(|(listener, _)| listener.id())
                    .collect();
                let actual: Vec<_> = registry.lookup(&key).iter().map(Callback::id).collect();
                prop_assert_eq!(actual, expected);
            }
        }
    }
}

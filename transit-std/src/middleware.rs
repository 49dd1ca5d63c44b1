//! Dispatch middleware.
//!
//! [`ActionListener`] sits in the host's middleware chain. For every event it
//! resolves the key, runs the listeners registered under it in order, and then
//! either forwards the event to the next stage or swallows it.

use crate::registry::ListenerRegistry;
use parking_lot::RwLock;
use std::fmt;
use transit_core::{Action, DispatchError, Event, HookResult};

/// Middleware invoking registered listeners for each dispatched event.
///
/// The middleware is installed once; the store's registry is attached with
/// [`ActionListener::attach`] before the first dispatch. Until then events go
/// straight through without key resolution or listener lookup; stop-marked
/// events are still swallowed.
///
/// # Propagation
///
/// After all listeners ran, the event is swallowed (not forwarded) when it
/// carries [`ActionFlags::STOP_PROPAGATION`] or a listener returned
/// [`HookResult::Stop`]. A listener error aborts the dispatch: remaining
/// listeners are skipped and the error reaches the caller.
///
/// [`ActionFlags::STOP_PROPAGATION`]: transit_core::ActionFlags::STOP_PROPAGATION
pub struct ActionListener<A> {
    registry: RwLock<Option<ListenerRegistry<A>>>,
}

impl<A> ActionListener<A> {
    /// Create a middleware with no registry attached.
    pub fn new() -> Self {
        Self {
            registry: RwLock::new(None),
        }
    }

    /// Create a middleware already attached to `registry`.
    pub fn with_registry(registry: &ListenerRegistry<A>) -> Self {
        Self {
            registry: RwLock::new(Some(registry.clone())),
        }
    }

    /// Give the middleware access to the store's registry. Attaching again
    /// replaces the previous registry.
    pub fn attach(&self, registry: &ListenerRegistry<A>) {
        let previous = self.registry.write().replace(registry.clone());
        #[cfg(feature = "tracing")]
        {
            if previous.is_some() {
                tracing::debug!("replacing the registry attached to the action listener");
            }
        }
        drop(previous);
    }

    /// Whether a registry is attached.
    pub fn is_attached(&self) -> bool {
        self.registry.read().is_some()
    }
}

impl<A: Action> ActionListener<A> {
    /// Dispatch `event`, handing it to `next` unless it is swallowed.
    ///
    /// Returns `Ok(None)` when the event was swallowed, `Ok(Some(_))` with the
    /// next stage's result otherwise.
    pub fn dispatch<R, N>(&self, event: Event<A>, next: N) -> Result<Option<R>, DispatchError>
    where
        N: FnOnce(Event<A>) -> R,
    {
        let registry = self.registry.read().clone();
        let Some(registry) = registry else {
            if event.stops_propagation() {
                return Ok(None);
            }
            return Ok(Some(next(event)));
        };

        let key = registry.resolver().resolve(&event)?;
        let listeners = registry.lookup(&key);

        #[cfg(feature = "tracing")]
        tracing::trace!(key = %key, listeners = listeners.len(), "dispatching event");

        let mut stop = false;
        for listener in &listeners {
            match listener.call(&event) {
                Ok(HookResult::Stop) => stop = true,
                Ok(HookResult::Next) => {}
                Err(source) => {
                    #[cfg(feature = "tracing")]
                    tracing::debug!(key = %key, listener = ?listener.id(), error = %source, "listener failed");
                    return Err(DispatchError::Listener { key, source });
                }
            }
        }

        if stop || event.stops_propagation() {
            #[cfg(feature = "tracing")]
            tracing::debug!(key = %key, "event consumed, not forwarding");
            return Ok(None);
        }

        Ok(Some(next(event)))
    }

    /// Wrap the next stage, producing the dispatch function of this stage.
    ///
    /// This is the `next => event => result` shape of a middleware chain.
    pub fn wrap<R, N>(&self, next: N) -> impl Fn(Event<A>) -> Result<Option<R>, DispatchError> + '_
    where
        N: Fn(Event<A>) -> R + 'static,
    {
        move |event| self.dispatch(event, &next)
    }
}

impl<A> Default for ActionListener<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> fmt::Debug for ActionListener<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionListener")
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::Callback;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use transit_core::{EventKey, Tagged};

    fn counting(count: &Arc<AtomicUsize>) -> Callback<Tagged> {
        let count = Arc::clone(count);
        Callback::new(move |_event: &Event<Tagged>| {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn test_unattached_forwards_without_lookup() {
        let middleware = ActionListener::<Tagged>::new();
        let result = middleware
            .dispatch(Event::from(Tagged::new("")), |event| event.is_thunk())
            .unwrap();
        assert_eq!(result, Some(false));
    }

    #[test]
    fn test_unattached_swallows_stop_marked() {
        let middleware = ActionListener::<Tagged>::new();
        let result = middleware
            .dispatch(Event::from(Tagged::new("").stop_propagation()), |_| "next")
            .unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_invokes_listeners_then_forwards() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        registry.register(EventKey::from("PING"), &counting(&count));

        let middleware = ActionListener::with_registry(&registry);
        let forwarded = middleware
            .dispatch(Event::from(Tagged::new("PING")), |_| "next")
            .unwrap();

        assert_eq!(forwarded, Some("next"));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_stop_marker_swallows_event() {
        let registry = ListenerRegistry::new();
        let middleware = ActionListener::new();
        middleware.attach(&registry);

        let forwarded = middleware
            .dispatch(Event::from(Tagged::new("PING").stop_propagation()), |_| {
                panic!("stop-marked event must not be forwarded")
            })
            .unwrap();
        assert_eq!(forwarded, None::<()>);
    }

    #[test]
    fn test_listener_stop_swallows_after_all_listeners() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let key = EventKey::from("DONE");
        registry.register(key.clone(), &Callback::new(|_event: &Event<Tagged>| HookResult::Stop));
        registry.register(key, &counting(&count));

        let middleware = ActionListener::with_registry(&registry);
        let forwarded = middleware
            .dispatch(Event::from(Tagged::new("DONE")), |_| ())
            .unwrap();

        assert_eq!(forwarded, None);
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_listener_error_aborts_dispatch() {
        let registry = ListenerRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let key = EventKey::from("BAD");
        registry.register(
            key.clone(),
            &Callback::new(|_event: &Event<Tagged>| Err::<(), _>("listener blew up")),
        );
        registry.register(key, &counting(&count));

        let middleware = ActionListener::with_registry(&registry);
        let err = middleware
            .dispatch(Event::from(Tagged::new("BAD")), |_| panic!("must not forward"))
            .map(|forwarded: Option<()>| forwarded)
            .unwrap_err();

        assert!(matches!(err, DispatchError::Listener { ref key, .. } if *key == "BAD"));
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_invalid_event_is_reported() {
        let middleware = ActionListener::with_registry(&ListenerRegistry::new());
        let err = middleware
            .dispatch(Event::from(Tagged::new("")), |_| ())
            .unwrap_err();
        assert!(matches!(err, DispatchError::InvalidEvent(_)));
    }

    #[test]
    fn test_wrap_builds_a_stage() {
        let registry = ListenerRegistry::new();
        let middleware = ActionListener::with_registry(&registry);
        let stage = middleware.wrap(|event: Event<Tagged>| event.as_action().cloned());

        let result = stage(Event::from(Tagged::new("X"))).unwrap();
        assert_eq!(result, Some(Some(Tagged::new("X"))));
    }
}

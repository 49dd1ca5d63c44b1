//! Subscription lifecycle.
//!
//! A [`Subscription`] owns a fixed list of [`ListenerGroup`]s and binds them to
//! an observer's active period: [`activate`](Subscription::activate) registers
//! every group, [`deactivate`](Subscription::deactivate) (or dropping the
//! subscription) removes exactly those entries again, in the same order.
//!
//! Groups are built once, so registration and teardown see the same
//! callbacks.

use crate::registry::{Callback, ListenerRegistry};
use std::fmt;
use transit_core::{
    Action, EventKey, EventKeyResolver, GroupingError, InvalidEventError, Thunk, Trigger,
};

/// Keys sharing one handler.
pub struct ListenerGroup<A> {
    keys: Vec<EventKey>,
    handler: Callback<A>,
}

impl<A> ListenerGroup<A> {
    /// Group already-resolved keys. Repeated keys are kept once.
    pub fn new<I, K>(keys: I, handler: Callback<A>) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<EventKey>,
    {
        let mut unique = Vec::new();
        for key in keys {
            let key = key.into();
            if !unique.contains(&key) {
                unique.push(key);
            }
        }
        Self {
            keys: unique,
            handler,
        }
    }

    /// Keys in registration order.
    pub fn keys(&self) -> &[EventKey] {
        &self.keys
    }

    /// The shared handler.
    pub fn handler(&self) -> &Callback<A> {
        &self.handler
    }
}

impl<A: Action> ListenerGroup<A> {
    /// Resolve `triggers` (keys, actions or generators) and group them.
    pub fn from_triggers<I, T>(
        resolver: &EventKeyResolver,
        triggers: I,
        handler: Callback<A>,
    ) -> Result<Self, InvalidEventError>
    where
        I: IntoIterator<Item = T>,
        T: Into<Trigger<A>>,
    {
        let keys = triggers
            .into_iter()
            .map(|trigger| resolver.resolve_trigger(&trigger.into()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(keys, handler))
    }
}

impl<A> Clone for ListenerGroup<A> {
    fn clone(&self) -> Self {
        Self {
            keys: self.keys.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<A> fmt::Debug for ListenerGroup<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGroup")
            .field("keys", &self.keys)
            .field("handler", &self.handler)
            .finish()
    }
}

// ============================================================================
// Positional lists
// ============================================================================

/// One entry of a positional listener list: triggers followed by the handler
/// they share.
pub enum ListenerItem<A> {
    /// A trigger for the next handler.
    Trigger(Trigger<A>),
    /// Handler for the triggers since the previous handler.
    Handler(Callback<A>),
}

impl<A> From<Trigger<A>> for ListenerItem<A> {
    fn from(trigger: Trigger<A>) -> Self {
        ListenerItem::Trigger(trigger)
    }
}

impl<A> From<&str> for ListenerItem<A> {
    fn from(key: &str) -> Self {
        ListenerItem::Trigger(key.into())
    }
}

impl<A> From<EventKey> for ListenerItem<A> {
    fn from(key: EventKey) -> Self {
        ListenerItem::Trigger(key.into())
    }
}

impl<A> From<Thunk<A>> for ListenerItem<A> {
    fn from(thunk: Thunk<A>) -> Self {
        ListenerItem::Trigger(thunk.into())
    }
}

impl<A> From<Callback<A>> for ListenerItem<A> {
    fn from(handler: Callback<A>) -> Self {
        ListenerItem::Handler(handler)
    }
}

/// Split a positional list into groups: every run of triggers is closed by
/// exactly one handler.
pub fn group_listeners<A, I>(
    resolver: &EventKeyResolver,
    items: I,
) -> Result<Vec<ListenerGroup<A>>, GroupingError>
where
    A: Action,
    I: IntoIterator<Item = ListenerItem<A>>,
{
    let mut groups = Vec::new();
    let mut pending = Vec::new();

    for (index, item) in items.into_iter().enumerate() {
        match item {
            ListenerItem::Trigger(trigger) => {
                let key = resolver
                    .resolve_trigger(&trigger)
                    .map_err(|source| GroupingError::InvalidTrigger { index, source })?;
                pending.push(key);
            }
            ListenerItem::Handler(handler) => {
                if pending.is_empty() {
                    return Err(GroupingError::EmptyGroup { index });
                }
                groups.push(ListenerGroup::new(std::mem::take(&mut pending), handler));
            }
        }
    }

    if !pending.is_empty() {
        return Err(GroupingError::DanglingTriggers {
            count: pending.len(),
        });
    }
    Ok(groups)
}

// ============================================================================
// Subscription
// ============================================================================

/// Listener groups bound to one observer's active period.
///
/// # Example
///
/// ```rust
/// use transit_std::{registry::{Callback, ListenerRegistry}, subscription::{ListenerGroup, Subscription}};
/// use transit_core::{Event, EventKey, Tagged};
///
/// let registry = ListenerRegistry::<Tagged>::new();
/// let handler = Callback::new(|_event: &Event<Tagged>| ());
/// let group = ListenerGroup::new(["A", "B"], handler.clone());
///
/// let mut subscription = Subscription::subscribe(&registry, vec![group]);
/// assert!(registry.contains(&EventKey::from("A"), &handler));
///
/// subscription.deactivate();
/// assert!(!registry.contains(&EventKey::from("B"), &handler));
/// ```
///
/// A subscription owns only the registrations it added. When another
/// subscriber already holds the same callback under a key, activation leaves
/// that entry alone and teardown does not remove it.
pub struct Subscription<A> {
    registry: ListenerRegistry<A>,
    groups: Vec<ListenerGroup<A>>,
    registered: Vec<(EventKey, Callback<A>)>,
    active: bool,
}

impl<A> Subscription<A> {
    /// Create an inactive subscription.
    pub fn new(registry: &ListenerRegistry<A>, groups: Vec<ListenerGroup<A>>) -> Self {
        Self {
            registry: registry.clone(),
            groups,
            registered: Vec::new(),
            active: false,
        }
    }

    /// Create a subscription and activate it.
    pub fn subscribe(registry: &ListenerRegistry<A>, groups: Vec<ListenerGroup<A>>) -> Self {
        let mut subscription = Self::new(registry, groups);
        subscription.activate();
        subscription
    }

    /// Register every group. Does nothing when already active.
    ///
    /// Returns whether this call activated the subscription.
    pub fn activate(&mut self) -> bool {
        if self.active {
            return false;
        }
        for group in &self.groups {
            for key in &group.keys {
                if self.registry.register(key.clone(), &group.handler) {
                    self.registered.push((key.clone(), group.handler.clone()));
                }
            }
        }
        self.active = true;

        #[cfg(feature = "tracing")]
        tracing::debug!(groups = self.groups.len(), "subscription activated");
        true
    }

    /// Deregister, in registration order, the entries `activate` added. Does
    /// nothing when not active.
    ///
    /// Returns whether this call deactivated the subscription.
    pub fn deactivate(&mut self) -> bool {
        if !self.active {
            return false;
        }
        for (key, handler) in std::mem::take(&mut self.registered) {
            self.registry.deregister(&key, &handler);
        }
        self.active = false;

        #[cfg(feature = "tracing")]
        tracing::debug!(groups = self.groups.len(), "subscription deactivated");
        true
    }

    /// Whether the groups are currently registered.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// The subscription's groups.
    pub fn groups(&self) -> &[ListenerGroup<A>] {
        &self.groups
    }

    /// The registry this subscription writes to.
    pub fn registry(&self) -> &ListenerRegistry<A> {
        &self.registry
    }
}

impl<A: Action> Subscription<A> {
    /// Group a positional list with the registry's resolver and activate the
    /// result.
    pub fn from_items<I>(registry: &ListenerRegistry<A>, items: I) -> Result<Self, GroupingError>
    where
        I: IntoIterator<Item = ListenerItem<A>>,
    {
        let groups = group_listeners(registry.resolver(), items)?;
        Ok(Self::subscribe(registry, groups))
    }
}

impl<A> Drop for Subscription<A> {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl<A> fmt::Debug for Subscription<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("groups", &self.groups)
            .field("registered", &self.registered.len())
            .field("active", &self.active)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_core::{Event, Tagged};

    fn handler() -> Callback<Tagged> {
        Callback::new(|_event: &Event<Tagged>| ())
    }

    #[test]
    fn test_group_positional_list() {
        let resolver = EventKeyResolver::default();
        let (first, second) = (handler(), handler());
        let groups = group_listeners(
            &resolver,
            vec![
                ListenerItem::from("A"),
                "B".into(),
                first.clone().into(),
                Trigger::action(Tagged::new("C")).into(),
                second.clone().into(),
            ],
        )
        .unwrap();

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].keys(), &[EventKey::from("A"), EventKey::from("B")]);
        assert_eq!(groups[0].handler(), &first);
        assert_eq!(groups[1].keys(), &[EventKey::from("C")]);
        assert_eq!(groups[1].handler(), &second);
    }

    #[test]
    fn test_dangling_triggers_are_rejected() {
        let resolver = EventKeyResolver::default();
        let err = group_listeners(
            &resolver,
            vec![ListenerItem::from("A"), handler().into(), "B".into(), "C".into()],
        )
        .unwrap_err();
        assert_eq!(err, GroupingError::DanglingTriggers { count: 2 });
    }

    #[test]
    fn test_handler_without_triggers_is_rejected() {
        let resolver = EventKeyResolver::default();
        let err = group_listeners(
            &resolver,
            vec![ListenerItem::from("A"), handler().into(), handler().into()],
        )
        .unwrap_err();
        assert_eq!(err, GroupingError::EmptyGroup { index: 2 });
    }

    #[test]
    fn test_invalid_trigger_reports_position() {
        let resolver = EventKeyResolver::default();
        let err = group_listeners(
            &resolver,
            vec![ListenerItem::from("A"), "".into(), handler().into()],
        )
        .unwrap_err();
        assert_eq!(
            err,
            GroupingError::InvalidTrigger {
                index: 1,
                source: InvalidEventError::MissingKind,
            }
        );
    }

    #[test]
    fn test_activation_is_idempotent() {
        let registry = ListenerRegistry::new();
        let listener = handler();
        let mut subscription =
            Subscription::new(&registry, vec![ListenerGroup::new(["A"], listener.clone())]);

        assert!(subscription.activate());
        assert!(!subscription.activate());
        assert_eq!(registry.listener_count(&EventKey::from("A")), 1);

        assert!(subscription.deactivate());
        assert!(!subscription.deactivate());
        assert!(registry.is_empty());

        assert!(subscription.activate());
        assert!(registry.contains(&EventKey::from("A"), &listener));
    }

    #[test]
    fn test_drop_deactivates() {
        let registry = ListenerRegistry::new();
        {
            let _subscription =
                Subscription::subscribe(&registry, vec![ListenerGroup::new(["A", "B"], handler())]);
            assert_eq!(registry.len(), 2);
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_teardown_leaves_other_subscribers() {
        let registry = ListenerRegistry::new();
        let other = handler();
        let _keep = Subscription::subscribe(&registry, vec![ListenerGroup::new(["A"], other.clone())]);

        let mut leaving = Subscription::from_items(
            &registry,
            vec![ListenerItem::from("A"), handler().into()],
        )
        .unwrap();
        assert_eq!(registry.listener_count(&EventKey::from("A")), 2);

        leaving.deactivate();
        assert_eq!(registry.lookup(&EventKey::from("A")), vec![other]);
    }

    #[test]
    fn test_shared_callback_survives_other_teardown() {
        let registry = ListenerRegistry::new();
        let listener = handler();
        let first = Subscription::subscribe(&registry, vec![ListenerGroup::new(["A"], listener.clone())]);
        let mut second =
            Subscription::subscribe(&registry, vec![ListenerGroup::new(["A", "B"], listener.clone())]);
        assert_eq!(registry.listener_count(&EventKey::from("A")), 1);

        second.deactivate();
        assert!(first.is_active());
        assert!(registry.contains(&EventKey::from("A"), &listener));
        assert!(!registry.contains(&EventKey::from("B"), &listener));

        drop(first);
        assert!(registry.is_empty());
    }
}

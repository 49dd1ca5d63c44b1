//! Transition declarations.
//!
//! A [`TransitionSpec`] is an ordered list of named transitions, each with the
//! keys that trigger it. Triggers are resolved once, when the spec is built,
//! so the spec itself only holds [`EventKey`]s.

use crate::{
    action::Action,
    error::InvalidEventError,
    key::{EventKey, EventKeyResolver},
    thunk::Thunk,
};
use std::collections::HashSet;

/// Default transition names used by pending-state tracking.
pub mod states {
    /// The operation started.
    pub const PENDING: &str = "pending";
    /// The operation finished.
    pub const SUCCESS: &str = "success";
    /// The operation failed.
    pub const FAILURE: &str = "failure";
}

/// Something a listener or transition can be keyed on.
#[derive(Debug, Clone)]
pub enum Trigger<A> {
    /// A literal key.
    Key(EventKey),
    /// An action; keyed on its kind.
    Action(A),
    /// A generator; keyed on its identity.
    Thunk(Thunk<A>),
}

impl<A> Trigger<A> {
    /// Trigger on an action's kind.
    pub fn action(action: A) -> Self {
        Trigger::Action(action)
    }
}

impl<A> From<&str> for Trigger<A> {
    fn from(key: &str) -> Self {
        Trigger::Key(EventKey::new(key))
    }
}

impl<A> From<String> for Trigger<A> {
    fn from(key: String) -> Self {
        Trigger::Key(EventKey::from(key))
    }
}

impl<A> From<EventKey> for Trigger<A> {
    fn from(key: EventKey) -> Self {
        Trigger::Key(key)
    }
}

impl<A> From<Thunk<A>> for Trigger<A> {
    fn from(thunk: Thunk<A>) -> Self {
        Trigger::Thunk(thunk)
    }
}

impl<A> From<&Thunk<A>> for Trigger<A> {
    fn from(thunk: &Thunk<A>) -> Self {
        Trigger::Thunk(thunk.clone())
    }
}

/// One named transition and its trigger keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionEntry {
    name: String,
    keys: Vec<EventKey>,
}

impl TransitionEntry {
    /// Transition name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Keys that trigger this transition, in declaration order.
    pub fn keys(&self) -> &[EventKey] {
        &self.keys
    }
}

/// An ordered set of named transitions.
///
/// When two transitions declare the same key, the first one owns it.
///
/// # Example
///
/// ```rust
/// use transit_core::{EventKey, Tagged, TransitionSpec};
///
/// let spec = TransitionSpec::builder::<Tagged>()
///     .transition("pending", ["FETCH"])
///     .transition("success", ["FETCH_OK"])
///     .transition("failure", ["FETCH_ERR", "FETCH_TIMEOUT"])
///     .build()
///     .unwrap();
///
/// assert_eq!(spec.transition_for(&EventKey::from("FETCH_TIMEOUT")), Some("failure"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransitionSpec {
    entries: Vec<TransitionEntry>,
    consumed: HashSet<EventKey>,
}

impl TransitionSpec {
    /// Start building a spec.
    pub fn builder<A>() -> TransitionSpecBuilder<A> {
        TransitionSpecBuilder::new()
    }

    /// Iterate over transitions in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &TransitionEntry> {
        self.entries.iter()
    }

    /// The first transition declaring `key`.
    pub fn transition_for(&self, key: &EventKey) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.keys.contains(key))
            .map(|entry| entry.name.as_str())
    }

    /// Whether the event for `key` must be swallowed once its transition ran.
    pub fn is_consumed(&self, key: &EventKey) -> bool {
        self.consumed.contains(key)
    }

    /// Number of transitions.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no transition is declared.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Builder for [`TransitionSpec`].
pub struct TransitionSpecBuilder<A> {
    entries: Vec<(String, Vec<Trigger<A>>)>,
    consumed: Vec<Trigger<A>>,
}

impl<A> Default for TransitionSpecBuilder<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> TransitionSpecBuilder<A> {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            consumed: Vec::new(),
        }
    }

    /// Declare a transition. Declaring the same name again adds triggers to
    /// the existing transition.
    pub fn transition<I, T>(mut self, name: impl Into<String>, triggers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Trigger<A>>,
    {
        let name = name.into();
        let triggers = triggers.into_iter().map(Into::into);
        match self.entries.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => existing.extend(triggers),
            None => self.entries.push((name, triggers.collect())),
        }
        self
    }

    /// Swallow events for this trigger after the transition ran, so they
    /// never reach the rest of the pipeline.
    pub fn consume(mut self, trigger: impl Into<Trigger<A>>) -> Self {
        self.consumed.push(trigger.into());
        self
    }
}

impl<A: Action> TransitionSpecBuilder<A> {
    /// Resolve all triggers with the default resolver.
    ///
    /// A machine subscribed to a registry with a non-default
    /// [`ResolverConfig`](crate::ResolverConfig) matches events with that
    /// registry's resolver; build its spec with [`build_with`](Self::build_with)
    /// instead.
    pub fn build(self) -> Result<TransitionSpec, InvalidEventError> {
        self.build_with(&EventKeyResolver::default())
    }

    /// Resolve all triggers with `resolver`.
    pub fn build_with(
        self,
        resolver: &EventKeyResolver,
    ) -> Result<TransitionSpec, InvalidEventError> {
        let entries = self
            .entries
            .into_iter()
            .map(|(name, triggers)| {
                let mut keys = Vec::with_capacity(triggers.len());
                for trigger in &triggers {
                    let key = resolver.resolve_trigger(trigger)?;
                    if !keys.contains(&key) {
                        keys.push(key);
                    }
                }
                Ok(TransitionEntry { name, keys })
            })
            .collect::<Result<Vec<_>, InvalidEventError>>()?;

        let consumed = self
            .consumed
            .iter()
            .map(|trigger| resolver.resolve_trigger(trigger))
            .collect::<Result<HashSet<_>, _>>()?;

        Ok(TransitionSpec { entries, consumed })
    }
}

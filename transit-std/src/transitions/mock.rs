use super::Reducer;
use crate::registry::ListenerRegistry;
use std::{fmt, sync::Arc};
use transit_core::{Action, Event, EventKey, EventKeyResolver, InvalidEventError, TransitionSpec};

/// What a [`TransitionMachine`](super::TransitionMachine) would compute, without
/// a registry.
///
/// Use it to unit test reducers: `apply(&event)` equals the live machine's
/// state right after `event` was dispatched.
pub struct MockTransition<A, S> {
    spec: TransitionSpec,
    reducer: Reducer<A, S>,
    resolver: EventKeyResolver,
}

/// Build a [`MockTransition`] for `spec` and `reducer`.
///
/// Events resolve with the default resolver, matching specs built with
/// [`build`](transit_core::TransitionSpecBuilder::build). When the live
/// registry uses another [`ResolverConfig`](transit_core::ResolverConfig),
/// build the spec with `build_with(registry.resolver())` and call
/// [`MockTransition::resolving_like`] so both sides agree on keys.
///
/// # Example
///
/// ```rust
/// use transit_std::transitions::mock_transition;
/// use transit_core::{Event, Tagged, TransitionSpec};
///
/// let spec = TransitionSpec::builder::<Tagged>()
///     .transition("pending", ["FETCH"])
///     .build()
///     .unwrap();
/// let mock = mock_transition(spec, |name: Option<&str>, _event: Option<&Event<Tagged>>| {
///     name == Some("pending")
/// });
///
/// assert!(mock.apply(&Event::from(Tagged::new("FETCH"))).unwrap());
/// assert!(!mock.apply_key("OTHER"));
/// ```
pub fn mock_transition<A, S, R>(spec: TransitionSpec, reducer: R) -> MockTransition<A, S>
where
    R: Fn(Option<&str>, Option<&Event<A>>) -> S + Send + Sync + 'static,
{
    MockTransition {
        spec,
        reducer: Arc::new(reducer),
        resolver: EventKeyResolver::default(),
    }
}

impl<A, S> MockTransition<A, S> {
    /// Resolve events with `resolver` instead of the default one.
    pub fn with_resolver(mut self, resolver: EventKeyResolver) -> Self {
        self.resolver = resolver;
        self
    }

    /// Resolve events the way `registry` does.
    pub fn resolving_like(self, registry: &ListenerRegistry<A>) -> Self {
        self.with_resolver(*registry.resolver())
    }

    /// The state before any transition.
    pub fn initial(&self) -> S {
        (self.reducer)(None, None)
    }

    /// Reduce a bare key, with no event.
    pub fn apply_key(&self, key: impl Into<EventKey>) -> S {
        let key = key.into();
        (self.reducer)(self.spec.transition_for(&key), None)
    }

    /// The transitions being mocked.
    pub fn spec(&self) -> &TransitionSpec {
        &self.spec
    }
}

impl<A: Action, S> MockTransition<A, S> {
    /// Reduce `event` the way the live machine would.
    ///
    /// Events matching no transition reduce with no transition name.
    pub fn apply(&self, event: &Event<A>) -> Result<S, InvalidEventError> {
        let key = self.resolver.resolve(event)?;
        Ok((self.reducer)(self.spec.transition_for(&key), Some(event)))
    }
}

impl<A, S> Clone for MockTransition<A, S> {
    fn clone(&self) -> Self {
        Self {
            spec: self.spec.clone(),
            reducer: Arc::clone(&self.reducer),
            resolver: self.resolver,
        }
    }
}

impl<A, S> fmt::Debug for MockTransition<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MockTransition")
            .field("spec", &self.spec)
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transit_core::{Tagged, Thunk, states};

    fn fetch_spec() -> TransitionSpec {
        TransitionSpec::builder::<Tagged<&'static str>>()
            .transition(states::PENDING, ["FETCH"])
            .transition(states::SUCCESS, ["FETCH_OK"])
            .transition(states::FAILURE, ["FETCH_ERR"])
            .build()
            .unwrap()
    }

    fn fetch_reducer(
        transition: Option<&str>,
        event: Option<&Event<Tagged<&'static str>>>,
    ) -> (bool, Option<&'static str>) {
        let error = match transition {
            Some(states::FAILURE) => event.and_then(Event::as_action).map(|action| *action.payload()),
            _ => None,
        };
        (transition == Some(states::PENDING), error)
    }

    #[test]
    fn test_apply_follows_matching_transition() {
        let mock = mock_transition(fetch_spec(), fetch_reducer);

        assert_eq!(mock.initial(), (false, None));
        assert_eq!(
            mock.apply(&Event::from(Tagged::with("FETCH", ""))).unwrap(),
            (true, None)
        );
        assert_eq!(
            mock.apply(&Event::from(Tagged::with("FETCH_ERR", "boom"))).unwrap(),
            (false, Some("boom"))
        );
    }

    #[test]
    fn test_unmatched_event_reduces_without_name() {
        let mock = mock_transition(fetch_spec(), |name: Option<&str>, event: Option<&Event<Tagged<&'static str>>>| {
            (name.map(str::to_owned), event.is_some())
        });
        assert_eq!(
            mock.apply(&Event::from(Tagged::with("UNRELATED", ""))).unwrap(),
            (None, true)
        );
        assert_eq!(mock.apply_key("FETCH_OK"), (Some("success".to_owned()), false));
    }

    #[test]
    fn test_marked_generator_is_matched_by_tag() {
        let load = Thunk::marked("users/load", || Tagged::new("USERS"));
        let spec = TransitionSpec::builder::<Tagged>()
            .transition(states::PENDING, [&load])
            .build()
            .unwrap();
        let mock = mock_transition(spec, |name: Option<&str>, _event: Option<&Event<Tagged>>| {
            name == Some(states::PENDING)
        });

        assert!(mock.apply(&Event::from(load)).unwrap());
    }

    #[test]
    fn test_invalid_event_is_reported() {
        let mock = mock_transition(fetch_spec(), fetch_reducer);
        assert_eq!(
            mock.apply(&Event::from(Tagged::with("", ""))),
            Err(InvalidEventError::MissingKind)
        );
    }

    #[test]
    fn test_resolving_like_uses_registry_config() {
        fn go() -> Tagged {
            Tagged::new("GO")
        }

        let registry = ListenerRegistry::<Tagged>::with_resolver(EventKeyResolver::new(
            transit_core::ResolverConfig::new().with_min_name_len(2),
        ));
        let load = transit_core::mark_as_generator(go);
        let spec = TransitionSpec::builder::<Tagged>()
            .transition(states::PENDING, [&load])
            .build_with(registry.resolver())
            .unwrap();
        let reducer = |name: Option<&str>, _event: Option<&Event<Tagged>>| name == Some(states::PENDING);

        let default = mock_transition(spec.clone(), reducer);
        assert!(matches!(
            default.apply(&Event::from(load.clone())),
            Err(InvalidEventError::AnonymousGenerator { .. })
        ));

        let mock = mock_transition(spec, reducer).resolving_like(&registry);
        assert!(mock.apply(&Event::from(load)).unwrap());
    }
}

//! # Event key resolution
//!
//! Every listener lookup goes through an [`EventKey`]. Records resolve to their
//! kind verbatim. Generators resolve through their identity:
//!
//! 1. **Tag**: `Thunk::marked("users/fetch", ..)` resolves to the tag. Exact.
//! 2. **Declared name**: `mark_as_generator(fetch_users)` resolves to the type
//!    name of the function item when its last segment is distinctive enough.
//! 3. **Source text** (legacy fallback): `thunk!(|| ..)` records the closure's
//!    source. The resolver checks that the text has a generator shape and keys
//!    on the declared name, or on the normalized text when the name is a
//!    closure. Two generators with the same text share listeners; prefer tags.

use crate::{
    action::Action,
    error::InvalidEventError,
    event::Event,
    thunk::{Identity, Thunk},
    transition::Trigger,
};
use regex::Regex;
use std::{borrow::Borrow, fmt, sync::Arc, sync::LazyLock};

/// The resolved identity of an event category.
///
/// Cloning is O(1).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventKey(Arc<str>);

impl EventKey {
    /// Create a key from a string.
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Arc::from(key.as_ref()))
    }

    /// The key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the key is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for EventKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EventKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EventKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for EventKey {
    fn from(key: String) -> Self {
        Self(Arc::from(key))
    }
}

impl PartialEq<str> for EventKey {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for EventKey {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

/// Resolver settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverConfig {
    /// Accept unmarked generators by inspecting their source text.
    pub source_fallback: bool,
    /// Minimum length of the last path segment of a declared name.
    pub min_name_len: usize,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ResolverConfig {
    /// Source fallback on, names of four characters or more.
    pub const fn new() -> Self {
        Self {
            source_fallback: true,
            min_name_len: 4,
        }
    }

    /// Enable or disable the source-text fallback.
    pub const fn with_source_fallback(mut self, enabled: bool) -> Self {
        self.source_fallback = enabled;
        self
    }

    /// Set the minimum distinctive name length.
    pub const fn with_min_name_len(mut self, len: usize) -> Self {
        self.min_name_len = len;
        self
    }
}

/// Converts events, generators and triggers into [`EventKey`]s.
///
/// Pure: the same input always resolves to the same key under the same
/// configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventKeyResolver {
    config: ResolverConfig,
}

impl EventKeyResolver {
    /// Create a resolver with the given configuration.
    pub const fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    /// The resolver's configuration.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Resolve a dispatched event.
    pub fn resolve<A: Action>(&self, event: &Event<A>) -> Result<EventKey, InvalidEventError> {
        match event {
            Event::Action(action) => self.resolve_action(action),
            Event::Thunk(thunk) => self.resolve_thunk(thunk),
        }
    }

    /// Resolve a record by its kind.
    pub fn resolve_action<A: Action>(&self, action: &A) -> Result<EventKey, InvalidEventError> {
        match action.kind() {
            Some(kind) if !kind.is_empty() => Ok(EventKey::new(kind)),
            _ => Err(InvalidEventError::MissingKind),
        }
    }

    /// Resolve a generator through its identity.
    pub fn resolve_thunk<A>(&self, thunk: &Thunk<A>) -> Result<EventKey, InvalidEventError> {
        match thunk.identity() {
            Identity::Tagged(key) => Ok(key.clone()),
            Identity::Named(name) => {
                if is_distinctive(name, self.config.min_name_len) {
                    Ok(EventKey::new(name))
                } else {
                    Err(InvalidEventError::AnonymousGenerator {
                        name: (*name).to_owned(),
                    })
                }
            }
            Identity::Legacy { name, source } => {
                if !self.config.source_fallback {
                    return Err(InvalidEventError::UnmarkedGenerator {
                        name: (*name).to_owned(),
                    });
                }
                let text = normalize_source(source);
                if !looks_like_generator(&text) {
                    return Err(InvalidEventError::NotAGenerator { text });
                }
                if is_distinctive(name, self.config.min_name_len) {
                    Ok(EventKey::new(name))
                } else {
                    Ok(EventKey::from(text))
                }
            }
        }
    }

    /// Resolve a listener trigger.
    pub fn resolve_trigger<A: Action>(
        &self,
        trigger: &Trigger<A>,
    ) -> Result<EventKey, InvalidEventError> {
        match trigger {
            Trigger::Key(key) if key.is_empty() => Err(InvalidEventError::MissingKind),
            Trigger::Key(key) => Ok(key.clone()),
            Trigger::Action(action) => self.resolve_action(action),
            Trigger::Thunk(thunk) => self.resolve_thunk(thunk),
        }
    }
}

// ============================================================================
// Source-text fallback
// ============================================================================

// Zero-argument closure, closure returning a closure, or fn returning a closure.
static GENERATOR_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:move\s*)?\|\s*\||^(?:move\s*)?\|[^|]*\|\s*(?:\{\s*)?(?:move\s*)?\||^fn\s*\w*\s*\([^)]*\)[^{]*\{\s*(?:move\s*)?\|",
    )
    .expect("valid generator regex")
});

/// Best-effort check that source text has the shape of a generator.
///
/// Only used for unmarked generators. Formatting changes can flip the
/// answer, which is why producers should mark their generators instead.
pub fn looks_like_generator(source: &str) -> bool {
    GENERATOR_SHAPE.is_match(source.trim_start())
}

fn normalize_source(source: &str) -> String {
    source.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_distinctive(name: &str, min_len: usize) -> bool {
    if name.contains("{{closure}}") {
        return false;
    }
    let last = name.rsplit("::").next().unwrap_or(name);
    last.chars().count() >= min_len
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::Tagged;

    fn load_user_list() -> Tagged {
        Tagged::new("USERS_LOADED")
    }

    fn go() -> Tagged {
        Tagged::new("GO")
    }

    #[test]
    fn test_resolves_action_kind_verbatim() {
        let resolver = EventKeyResolver::default();
        let event = Event::from(Tagged::new("FETCH"));
        assert_eq!(resolver.resolve(&event).unwrap(), "FETCH");
    }

    #[test]
    fn test_empty_kind_is_invalid() {
        let resolver = EventKeyResolver::default();
        let event = Event::from(Tagged::new(""));
        assert_eq!(resolver.resolve(&event), Err(InvalidEventError::MissingKind));
    }

    #[test]
    fn test_tag_wins_over_everything() {
        let resolver = EventKeyResolver::new(ResolverConfig::new().with_source_fallback(false));
        let thunk = Thunk::marked("users/load", load_user_list);
        assert_eq!(resolver.resolve_thunk(&thunk).unwrap(), "users/load");
    }

    #[test]
    fn test_declared_name_is_used_when_distinctive() {
        let resolver = EventKeyResolver::default();
        let key = resolver
            .resolve_thunk(&crate::thunk::mark_as_generator(load_user_list))
            .unwrap();
        assert!(key.as_str().ends_with("load_user_list"));
    }

    #[test]
    fn test_short_or_closure_names_are_rejected() {
        let resolver = EventKeyResolver::default();
        let short = crate::thunk::mark_as_generator(go);
        assert!(matches!(
            resolver.resolve_thunk(&short),
            Err(InvalidEventError::AnonymousGenerator { .. })
        ));

        let closure = crate::thunk::mark_as_generator(|| Tagged::new("X"));
        assert!(matches!(
            resolver.resolve_thunk(&closure),
            Err(InvalidEventError::AnonymousGenerator { .. })
        ));
    }

    #[test]
    fn test_legacy_closure_keys_on_normalized_source() {
        let resolver = EventKeyResolver::default();
        let thunk = Thunk::from_source("move   ||\n  Tagged::new(\"X\")", || Tagged::new("X"));
        assert_eq!(
            resolver.resolve_thunk(&thunk).unwrap(),
            "move || Tagged::new(\"X\")"
        );
    }

    #[test]
    fn test_legacy_requires_generator_shape() {
        let resolver = EventKeyResolver::default();
        let thunk = Thunk::from_source("load_user_list", load_user_list);
        assert!(matches!(
            resolver.resolve_thunk(&thunk),
            Err(InvalidEventError::NotAGenerator { .. })
        ));
    }

    #[test]
    fn test_legacy_disabled() {
        let resolver = EventKeyResolver::new(ResolverConfig::new().with_source_fallback(false));
        let thunk = Thunk::from_source("|| Tagged::new(\"X\")", || Tagged::new("X"));
        assert!(matches!(
            resolver.resolve_thunk(&thunk),
            Err(InvalidEventError::UnmarkedGenerator { .. })
        ));
    }

    #[test]
    fn test_generator_shapes() {
        assert!(looks_like_generator("|| fetch()"));
        assert!(looks_like_generator("move || fetch()"));
        assert!(looks_like_generator("|id| move |dispatch| dispatch(id)"));
        assert!(looks_like_generator("|id| { move |d| d(id) }"));
        assert!(looks_like_generator("fn fetch(id: u32) -> impl Fn() { move || go(id) }"));
        assert!(!looks_like_generator("|event| event.kind()"));
        assert!(!looks_like_generator("fetch_users"));
    }

    #[test]
    fn test_trigger_keys() {
        let resolver = EventKeyResolver::default();
        assert_eq!(
            resolver.resolve_trigger(&Trigger::<Tagged>::from("A")).unwrap(),
            "A"
        );
        assert_eq!(
            resolver.resolve_trigger(&Trigger::<Tagged>::from("")),
            Err(InvalidEventError::MissingKind)
        );
        assert_eq!(
            resolver
                .resolve_trigger(&Trigger::action(Tagged::new("B")))
                .unwrap(),
            "B"
        );
    }

    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn resolution_is_deterministic(kind in "[A-Z_]{1,16}") {
                let resolver = EventKeyResolver::default();
                let event = Event::from(Tagged::new(kind.clone()));
                let first = resolver.resolve(&event).unwrap();
                let second = resolver.resolve(&event).unwrap();
                prop_assert_eq!(&first, &second);
                prop_assert_eq!(first.as_str(), kind.as_str());
            }
        }
    }
}

//! Event generators ("thunks").
//!
//! A [`Thunk`] is a zero-argument function producing an action. Hosts
//! dispatch it like any other event; the next stage of the pipeline decides
//! when to run it. Listeners key on the thunk's identity, never on what it
//! produces.

use crate::{
    error::InvalidEventError,
    key::EventKey,
    transition::TransitionSpec,
};
use std::{fmt, sync::Arc};

/// How a generator identifies itself to the key resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Identity {
    /// Explicit tag set by the producer.
    Tagged(EventKey),
    /// Marked as a generator; keyed on the declared name.
    Named(&'static str),
    /// Unmarked; only the declared name and source text are known.
    Legacy {
        name: &'static str,
        source: &'static str,
    },
}

/// A shared, cheaply cloneable event generator.
///
/// # Example
///
/// ```rust
/// use transit_core::{EventKeyResolver, Tagged, Thunk};
///
/// let fetch = Thunk::marked("users/fetch", || Tagged::new("USERS_REQUESTED"));
/// let key = EventKeyResolver::default().resolve_thunk(&fetch).unwrap();
/// assert_eq!(key, "users/fetch");
/// assert_eq!(fetch.invoke(), Tagged::new("USERS_REQUESTED"));
/// ```
pub struct Thunk<A> {
    body: Arc<dyn Fn() -> A + Send + Sync>,
    identity: Identity,
    transitions: Option<Arc<TransitionSpec>>,
}

impl<A> Thunk<A> {
    /// Create a generator with an explicit tag. This is the exact path: the
    /// tag is the key.
    pub fn marked<F>(tag: impl Into<EventKey>, body: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            identity: Identity::Tagged(tag.into()),
            transitions: None,
        }
    }

    /// Create an unmarked generator from its source text.
    ///
    /// Prefer [`Thunk::marked`]. The key of an unmarked generator depends on
    /// how its source was written; see [`looks_like_generator`].
    ///
    /// [`looks_like_generator`]: crate::looks_like_generator
    pub fn from_source<F>(source: &'static str, body: F) -> Self
    where
        F: Fn() -> A + Send + Sync + 'static,
    {
        Self {
            body: Arc::new(body),
            identity: Identity::Legacy {
                name: std::any::type_name::<F>(),
                source,
            },
            transitions: None,
        }
    }

    /// Run the generator.
    pub fn invoke(&self) -> A {
        (self.body)()
    }

    /// Whether the producer marked this generator explicitly.
    pub fn is_marked(&self) -> bool {
        !matches!(self.identity, Identity::Legacy { .. })
    }

    /// Transitions attached with [`Thunk::with_transitions`].
    pub fn transitions(&self) -> Option<&TransitionSpec> {
        self.transitions.as_deref()
    }

    /// Attach the transitions this generator drives.
    pub fn with_transitions(mut self, spec: TransitionSpec) -> Self {
        self.transitions = Some(Arc::new(spec));
        self
    }

    /// Attach transitions built from the generator itself, so a spec can
    /// name the generator as one of its triggers.
    pub fn with_transitions_from<F>(self, factory: F) -> Result<Self, InvalidEventError>
    where
        F: FnOnce(&Self) -> Result<TransitionSpec, InvalidEventError>,
    {
        let spec = factory(&self)?;
        Ok(self.with_transitions(spec))
    }

    pub(crate) fn identity(&self) -> &Identity {
        &self.identity
    }
}

impl<A> Clone for Thunk<A> {
    fn clone(&self) -> Self {
        Self {
            body: Arc::clone(&self.body),
            identity: self.identity.clone(),
            transitions: self.transitions.clone(),
        }
    }
}

// Generators compare by identity, not by body.
impl<A> PartialEq for Thunk<A> {
    fn eq(&self, other: &Self) -> bool {
        self.identity == other.identity
    }
}

impl<A> fmt::Debug for Thunk<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Thunk")
            .field("identity", &self.identity)
            .field("transitions", &self.transitions)
            .finish_non_exhaustive()
    }
}

/// Mark a function as an event generator, keyed on its declared name.
///
/// Works for named functions whose last path segment is distinctive; a
/// closure has no declared name and fails to resolve. Use [`Thunk::marked`]
/// to pick the key yourself.
pub fn mark_as_generator<A, F>(body: F) -> Thunk<A>
where
    F: Fn() -> A + Send + Sync + 'static,
{
    Thunk {
        body: Arc::new(body),
        identity: Identity::Named(std::any::type_name::<F>()),
        transitions: None,
    }
}

/// Build an unmarked generator from a closure, recording its source text.
///
/// This is the legacy path; the key comes from the closure's source (see
/// [`Thunk::from_source`]).
#[macro_export]
macro_rules! thunk {
    ($body:expr) => {
        $crate::Thunk::from_source(::core::stringify!($body), $body)
    };
}

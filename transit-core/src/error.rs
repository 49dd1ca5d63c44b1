//! Error types for Transit.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`TransitError`] - Top-level error type for all Transit operations
//! - [`InvalidEventError`] - An event (or trigger) has no resolvable key
//! - [`DispatchError`] - Errors surfaced to the caller of a dispatch
//! - [`GroupingError`] - Malformed positional listener lists

use crate::key::EventKey;
use thiserror::Error;

/// A boxed error type for listener failures.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all Transit operations.
#[derive(Error, Debug)]
pub enum TransitError {
    /// An event could not be resolved to a key.
    #[error("invalid event: {0}")]
    InvalidEvent(#[from] InvalidEventError),

    /// A dispatch failed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A positional listener list could not be grouped.
    #[error("grouping error: {0}")]
    Grouping(#[from] GroupingError),
}

/// An event or trigger that has no resolvable key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidEventError {
    /// The action has no kind, or an empty one.
    #[error("action has no kind")]
    MissingKind,

    /// A marked generator whose declared name is too short or anonymous to
    /// serve as a key.
    #[error("generator `{name}` has no distinctive name, give it an explicit tag")]
    AnonymousGenerator {
        /// The declared (type) name of the generator.
        name: String,
    },

    /// An unmarked generator while source fallback is disabled.
    #[error("generator `{name}` is not marked and source fallback is disabled")]
    UnmarkedGenerator {
        /// The declared (type) name of the generator.
        name: String,
    },

    /// Source text that does not have a generator shape.
    #[error("`{text}` does not look like a generator")]
    NotAGenerator {
        /// The normalized source text.
        text: String,
    },
}

/// Errors returned from a dispatch.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// The dispatched event has no resolvable key.
    #[error(transparent)]
    InvalidEvent(#[from] InvalidEventError),

    /// A listener failed. Remaining listeners were skipped and the event was
    /// not forwarded.
    #[error("listener for `{key}` failed")]
    Listener {
        /// Key of the dispatched event.
        key: EventKey,
        /// The listener's error.
        #[source]
        source: BoxError,
    },
}

/// Errors from grouping a positional listener list.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GroupingError {
    /// Triggers at the end of the list with no handler after them.
    #[error("{count} trigger(s) at the end of the listener list have no handler")]
    DanglingTriggers {
        /// Number of trailing triggers.
        count: usize,
    },

    /// A handler with no triggers before it.
    #[error("handler at position {index} has no triggers")]
    EmptyGroup {
        /// Position of the handler in the list.
        index: usize,
    },

    /// A trigger that could not be resolved.
    #[error("invalid trigger at position {index}")]
    InvalidTrigger {
        /// Position of the trigger in the list.
        index: usize,
        /// Why it could not be resolved.
        #[source]
        source: InvalidEventError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fails_with<E>(err: E) -> Result<(), TransitError>
    where
        TransitError: From<E>,
    {
        Err(err)?
    }

    #[test]
    fn test_children_convert_with_question_mark() {
        assert!(matches!(
            fails_with(InvalidEventError::MissingKind),
            Err(TransitError::InvalidEvent(InvalidEventError::MissingKind))
        ));
        assert!(matches!(
            fails_with(GroupingError::EmptyGroup { index: 0 }),
            Err(TransitError::Grouping(GroupingError::EmptyGroup { index: 0 }))
        ));

        let listener = DispatchError::Listener {
            key: EventKey::from("SAVE"),
            source: "disk full".into(),
        };
        let err = fails_with(listener).unwrap_err();
        assert_eq!(err.to_string(), "dispatch error: listener for `SAVE` failed");
        let source = std::error::Error::source(&err).map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("listener for `SAVE` failed"));
    }
}

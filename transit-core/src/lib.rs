//! # transit-core
//!
//! Core types for the Transit action listener framework.
//!
//! This crate has minimal dependencies and is what producers of actions and
//! generators import. The registry, middleware and transition machines live
//! in `transit-std`.
//!
//! # Events
//!
//! An [`Event`] is either a plain record implementing [`Action`] (keyed on its
//! kind) or a [`Thunk`], a generator producing such a record (keyed on its
//! identity). [`EventKeyResolver`] turns both, and listener [`Trigger`]s, into
//! an [`EventKey`].
//!
//! # Generators
//!
//! Producers mark generators explicitly:
//!
//! - [`Thunk::marked`] - explicit tag, the exact path
//! - [`mark_as_generator`] - keyed on the function's declared name
//! - [`thunk!`] - unmarked, keyed on source text (legacy fallback)
//!
//! # Transitions
//!
//! A [`TransitionSpec`] names logical states (`pending`, `success`, ...) and
//! the keys that reach them. Generators can carry one with
//! [`Thunk::with_transitions`].
//!
//! # Error Types
//!
//! - [`TransitError`] - Top-level error type
//! - [`InvalidEventError`] - Unresolvable events and triggers
//! - [`DispatchError`] - Dispatch failures
//! - [`GroupingError`] - Malformed positional listener lists

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod action;
mod error;
mod event;
mod key;
mod message;
mod response;
mod thunk;
mod transition;

// Re-exports
pub use action::{Action, ActionFlags, Tagged};
pub use error::{BoxError, DispatchError, GroupingError, InvalidEventError, TransitError};
pub use event::Event;
pub use key::{EventKey, EventKeyResolver, ResolverConfig, looks_like_generator};
pub use message::Message;
pub use response::{HookResult, IntoHookResult};
pub use thunk::{Thunk, mark_as_generator};
pub use transition::{
    TransitionEntry, TransitionSpec, TransitionSpecBuilder, Trigger, states,
};

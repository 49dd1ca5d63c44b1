//! # transit-std
//!
//! Registry, middleware and subscribers for the Transit action listener
//! framework.
//!
//! This crate provides:
//! - **Registry**: [`ListenerRegistry`], keyed listener lists with stable
//!   [`Callback`] identities
//! - **Middleware**: [`ActionListener`], invoking listeners on dispatch
//! - **Subscriptions**: [`Subscription`], registering [`ListenerGroup`]s for
//!   an observer's active period
//! - **Transitions**: [`TransitionMachine`], [`PendingState`] and
//!   [`mock_transition`]
//! - **Testing**: recorders in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core types
pub use transit_core;

// Modules
pub mod middleware;
pub mod registry;
pub mod subscription;
pub mod testing;
pub mod transitions;

pub use middleware::ActionListener;
pub use registry::{Callback, ListenerId, ListenerRegistry};
pub use subscription::{ListenerGroup, ListenerItem, Subscription, group_listeners};
pub use transitions::{
    MockTransition, PendingConfig, PendingState, Reducer, StateCell, ThunkStatus,
    TransitionMachine, default_reducer, mock_transition,
};

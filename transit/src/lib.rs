//! # transit - Action Listeners for Dispatch Pipelines
//!
//! `transit` lets observers react to specific dispatched events without
//! touching the reducers, and derive small pieces of state (pending,
//! failed, or anything a reducer computes) from named transitions.
//!
//! ## Quick Start
//!
//! ```rust
//! use transit::prelude::*;
//!
//! // Store setup: one registry, one middleware.
//! let registry = ListenerRegistry::<Tagged>::new();
//! let middleware = ActionListener::with_registry(&registry);
//!
//! // An observer tracks a fetch while it is alive.
//! let fetch = PendingState::new(
//!     &registry,
//!     PendingConfig::new()
//!         .pending(["FETCH"])
//!         .success(["FETCH_OK"])
//!         .failure(["FETCH_ERR"]),
//! )
//! .unwrap();
//!
//! middleware.dispatch(Event::from(Tagged::new("FETCH")), |_| ()).unwrap();
//! assert!(fetch.is_pending());
//! ```
//!
//! ## Generators
//!
//! Generators ("thunks") are keyed on their identity. Mark them with
//! [`Thunk::marked`], [`mark_as_generator`] or `#[generator]` (with the
//! `macros` feature); [`thunk!`] is the unmarked legacy path.

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use transit_core::{
    // Events
    Action,
    ActionFlags,
    // Error types
    BoxError,
    DispatchError,
    Event,
    // Keys
    EventKey,
    EventKeyResolver,
    GroupingError,
    // Response
    HookResult,
    IntoHookResult,
    InvalidEventError,
    Message,
    ResolverConfig,
    Tagged,
    // Generators
    Thunk,
    TransitError,
    // Transitions
    TransitionEntry,
    TransitionSpec,
    TransitionSpecBuilder,
    Trigger,
    looks_like_generator,
    mark_as_generator,
    states,
    thunk,
};

pub use transit_std::{
    ActionListener, Callback, ListenerGroup, ListenerId, ListenerItem, ListenerRegistry,
    MockTransition, PendingConfig, PendingState, Reducer, StateCell, Subscription, ThunkStatus,
    TransitionMachine, default_reducer, group_listeners, mock_transition,
};

/// Testing utilities.
pub mod testing {
    pub use transit_std::testing::{OrderProbe, RecordingListener, RecordingNext};
}

/// Prelude module - common imports for Transit.
///
/// # Usage
///
/// ```rust
/// use transit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Events
        Action,
        ActionFlags,
        // Middleware
        ActionListener,
        // Errors
        BoxError,
        Callback,
        DispatchError,
        Event,
        EventKey,
        HookResult,
        InvalidEventError,
        // Subscribers
        ListenerGroup,
        ListenerRegistry,
        Message,
        PendingConfig,
        PendingState,
        Subscription,
        Tagged,
        Thunk,
        TransitionMachine,
        TransitionSpec,
        mark_as_generator,
        mock_transition,
        states,
    };
}

#[cfg(feature = "macros")]
pub use transit_macros::{Action, Message, generator};

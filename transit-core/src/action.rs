//! Tagged action records.
//!
//! An [`Action`] is the plain-record shape of an event: something carrying a
//! `kind` string that listeners are keyed on. [`Tagged`] is a ready-made
//! record for hosts that don't want to define their own action enum, and
//! `#[derive(Action)]` (with the `macros` feature of `transit`) covers the
//! enum case.

use crate::message::Message;

bitflags::bitflags! {
    /// Per-action markers read by the dispatch middleware.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ActionFlags: u8 {
        /// Swallow the action after listeners ran; it never reaches the next
        /// stage of the pipeline.
        const STOP_PROPAGATION = 0b0000_0001;
    }
}

/// A dispatched record identified by its kind.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an `Action`",
    label = "missing `Action` implementation",
    note = "Implement `Action` (or use `#[derive(Action)]`) to return the kind listeners are keyed on."
)]
pub trait Action: Message {
    /// The kind string of this action, `None` when it has none.
    fn kind(&self) -> Option<&str>;

    /// Markers attached to this action.
    fn flags(&self) -> ActionFlags {
        ActionFlags::empty()
    }

    /// Whether the middleware must swallow this action after listeners ran.
    fn stops_propagation(&self) -> bool {
        self.flags().contains(ActionFlags::STOP_PROPAGATION)
    }
}

/// A generic action record: a kind, a payload and flags.
///
/// # Example
///
/// ```rust
/// use transit_core::{Action, Tagged};
///
/// let failed = Tagged::new("FETCH_ERR").with_payload("boom");
/// assert_eq!(failed.kind(), Some("FETCH_ERR"));
/// assert_eq!(*failed.payload(), "boom");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Tagged<P = ()> {
    kind: String,
    payload: P,
    flags: ActionFlags,
}

impl Tagged<()> {
    /// Create a record with no payload.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            payload: (),
            flags: ActionFlags::empty(),
        }
    }
}

impl<P> Tagged<P> {
    /// Create a record carrying `payload`.
    pub fn with(kind: impl Into<String>, payload: P) -> Self {
        Self {
            kind: kind.into(),
            payload,
            flags: ActionFlags::empty(),
        }
    }

    /// Replace the payload, keeping kind and flags.
    pub fn with_payload<Q>(self, payload: Q) -> Tagged<Q> {
        Tagged {
            kind: self.kind,
            payload,
            flags: self.flags,
        }
    }

    /// Mark the record so the middleware swallows it after listeners ran.
    pub fn stop_propagation(mut self) -> Self {
        self.flags.insert(ActionFlags::STOP_PROPAGATION);
        self
    }

    /// The payload.
    pub fn payload(&self) -> &P {
        &self.payload
    }

    /// Consume the record, returning its payload.
    pub fn into_payload(self) -> P {
        self.payload
    }
}

impl<P: Send + Sync + 'static> Message for Tagged<P> {}

impl<P: Send + Sync + 'static> Action for Tagged<P> {
    fn kind(&self) -> Option<&str> {
        Some(&self.kind)
    }

    fn flags(&self) -> ActionFlags {
        self.flags
    }
}

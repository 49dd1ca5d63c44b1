//! Testing utilities for Transit.
//!
//! This module provides helpers to observe what the middleware does.
//!
//! # Features
//!
//! - [`RecordingListener`]: A listener that records all events it receives
//! - [`RecordingNext`]: A next stage that records forwarded events
//! - [`OrderProbe`]: Labelled listeners sharing one invocation log

use crate::registry::Callback;
use parking_lot::Mutex;
use std::sync::Arc;
use transit_core::{Event, HookResult};

// ============================================================================
// Recording Listener
// ============================================================================

/// A listener that records all events it receives.
///
/// Every call to [`callback`](RecordingListener::callback) returns the same
/// callback identity, so the recorder can be registered and deregistered
/// like any other listener.
///
/// # Example
///
/// ```rust
/// use transit_std::{registry::ListenerRegistry, testing::RecordingListener};
/// use transit_core::{EventKey, Tagged};
///
/// let registry = ListenerRegistry::<Tagged>::new();
/// let recorder = RecordingListener::new();
/// registry.register(EventKey::from("PING"), &recorder.callback());
///
/// assert_eq!(recorder.count(), 0);
/// ```
pub struct RecordingListener<A> {
    events: Arc<Mutex<Vec<Event<A>>>>,
    callback: Callback<A>,
}

impl<A: Clone + Send + Sync + 'static> RecordingListener<A> {
    /// Create a recording listener that returns `Next`.
    pub fn new() -> Self {
        Self::with_result(HookResult::Next)
    }

    /// Create a recording listener that returns a specific result.
    pub fn with_result(result: HookResult) -> Self {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback = Callback::new(move |event: &Event<A>| {
            sink.lock().push(event.clone());
            result
        });
        Self { events, callback }
    }
}

impl<A> RecordingListener<A> {
    /// The callback to register.
    pub fn callback(&self) -> Callback<A> {
        self.callback.clone()
    }

    /// Get a clone of the recorded events.
    pub fn events(&self) -> Vec<Event<A>>
    where
        A: Clone,
    {
        self.events.lock().clone()
    }

    /// Get the number of recorded events.
    pub fn count(&self) -> usize {
        self.events.lock().len()
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.lock().clear();
    }
}

impl<A: Clone + Send + Sync + 'static> Default for RecordingListener<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for RecordingListener<A> {
    fn clone(&self) -> Self {
        Self {
            events: self.events.clone(),
            callback: self.callback.clone(),
        }
    }
}

// ============================================================================
// Recording Next
// ============================================================================

/// Stands in for the rest of the pipeline and records what reached it.
pub struct RecordingNext<A> {
    forwarded: Arc<Mutex<Vec<Event<A>>>>,
}

impl<A> RecordingNext<A> {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self {
            forwarded: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Record `event` as forwarded.
    pub fn call(&self, event: Event<A>) {
        self.forwarded.lock().push(event);
    }

    /// A next stage for [`ActionListener::wrap`](crate::middleware::ActionListener::wrap).
    pub fn stage(&self) -> impl Fn(Event<A>) + use<A>
    where
        A: 'static,
    {
        let forwarded = Arc::clone(&self.forwarded);
        move |event| forwarded.lock().push(event)
    }

    /// Get a clone of the forwarded events.
    pub fn forwarded(&self) -> Vec<Event<A>>
    where
        A: Clone,
    {
        self.forwarded.lock().clone()
    }

    /// Get the number of forwarded events.
    pub fn count(&self) -> usize {
        self.forwarded.lock().len()
    }
}

impl<A> Default for RecordingNext<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Clone for RecordingNext<A> {
    fn clone(&self) -> Self {
        Self {
            forwarded: self.forwarded.clone(),
        }
    }
}

// ============================================================================
// Order Probe
// ============================================================================

/// Labelled listeners writing to one shared log.
///
/// # Example
///
/// ```rust
/// use transit_std::testing::OrderProbe;
/// use transit_core::{Event, Tagged};
///
/// let probe = OrderProbe::new();
/// let first = probe.listener::<Tagged>("first");
/// let second = probe.listener::<Tagged>("second");
///
/// let event = Event::from(Tagged::new("GO"));
/// second.call(&event).unwrap();
/// first.call(&event).unwrap();
/// assert_eq!(probe.order(), vec!["second", "first"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct OrderProbe {
    log: Arc<Mutex<Vec<String>>>,
}

impl OrderProbe {
    /// Create an empty probe.
    pub fn new() -> Self {
        Self::default()
    }

    /// A new listener appending `label` to the log when called.
    pub fn listener<A: 'static>(&self, label: impl Into<String>) -> Callback<A> {
        let log = Arc::clone(&self.log);
        let label = label.into();
        Callback::new(move |_event: &Event<A>| log.lock().push(label.clone()))
    }

    /// Labels in invocation order.
    pub fn order(&self) -> Vec<String> {
        self.log.lock().clone()
    }

    /// Clear the log.
    pub fn clear(&self) {
        self.log.lock().clear();
    }
}

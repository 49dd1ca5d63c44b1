#![allow(dead_code)]

use std::sync::Once;
use transit::{ActionListener, Event, ListenerRegistry, Tagged};
use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Route `tracing` output to the test harness. `RUST_LOG` picks the level.
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ============================================================================
// Store fixture
// ============================================================================

/// One registry and the middleware attached to it.
pub struct Store {
    pub registry: ListenerRegistry<Tagged<&'static str>>,
    pub middleware: ActionListener<Tagged<&'static str>>,
}

impl Store {
    pub fn new() -> Self {
        init_tracing();
        let registry = ListenerRegistry::new();
        let middleware = ActionListener::with_registry(&registry);
        Self {
            registry,
            middleware,
        }
    }

    /// Dispatch an action; `true` when it reached the next stage.
    pub fn dispatch(&self, kind: &str, payload: &'static str) -> bool {
        self.dispatch_event(Event::from(Tagged::with(kind, payload)))
    }

    /// Dispatch any event; `true` when it reached the next stage.
    pub fn dispatch_event(&self, event: Event<Tagged<&'static str>>) -> bool {
        self.middleware
            .dispatch(event, |_| ())
            .expect("dispatch failed")
            .is_some()
    }
}

/// Reducer of the fetch scenario: pending flag plus the failure payload.
pub fn fetch_reducer(
    transition: Option<&str>,
    event: Option<&Event<Tagged<&'static str>>>,
) -> (bool, Option<&'static str>) {
    let error = match transition {
        Some(transit::states::FAILURE) => event
            .and_then(Event::as_action)
            .map(|action| *action.payload()),
        _ => None,
    };
    (transition == Some(transit::states::PENDING), error)
}

use super::TransitionMachine;
use crate::registry::ListenerRegistry;
use std::{fmt, sync::Arc};
use transit_core::{Action, Event, InvalidEventError, TransitionSpec, Trigger, states};

type FailureHandler<A, E> = Arc<dyn Fn(&Event<A>) -> E + Send + Sync>;

/// Triggers of the three phases of an operation.
///
/// A phase without triggers is never entered.
pub struct PendingConfig<A, E> {
    pending: Vec<Trigger<A>>,
    success: Vec<Trigger<A>>,
    failure: Vec<Trigger<A>>,
    failure_handler: FailureHandler<A, E>,
}

impl<A: Clone + Send + Sync + 'static> PendingConfig<A, Event<A>> {
    /// Empty configuration keeping the failing event as the error.
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
            success: Vec::new(),
            failure: Vec::new(),
            failure_handler: Arc::new(|event: &Event<A>| event.clone()),
        }
    }
}

impl<A: Clone + Send + Sync + 'static> Default for PendingConfig<A, Event<A>> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, E> PendingConfig<A, E> {
    /// Triggers that start the operation.
    pub fn pending<I, T>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Trigger<A>>,
    {
        self.pending.extend(triggers.into_iter().map(Into::into));
        self
    }

    /// Triggers that finish it.
    pub fn success<I, T>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Trigger<A>>,
    {
        self.success.extend(triggers.into_iter().map(Into::into));
        self
    }

    /// Triggers that fail it.
    pub fn failure<I, T>(mut self, triggers: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Trigger<A>>,
    {
        self.failure.extend(triggers.into_iter().map(Into::into));
        self
    }

    /// Map the failing event to the reported error.
    pub fn failure_handler<F, E2>(self, handler: F) -> PendingConfig<A, E2>
    where
        F: Fn(&Event<A>) -> E2 + Send + Sync + 'static,
    {
        PendingConfig {
            pending: self.pending,
            success: self.success,
            failure: self.failure,
            failure_handler: Arc::new(handler),
        }
    }
}

/// Pending/error tracking for one operation.
///
/// Starts as `(false, None)`. A pending trigger sets `(true, None)`, a success
/// trigger `(false, None)` and a failure trigger `(false, Some(error))`.
///
/// # Example
///
/// ```rust
/// use transit_std::{ActionListener, ListenerRegistry, PendingConfig, PendingState};
/// use transit_core::{Event, Tagged};
///
/// let registry = ListenerRegistry::<Tagged<&'static str>>::new();
/// let middleware = ActionListener::with_registry(&registry);
///
/// let state = PendingState::new(
///     &registry,
///     PendingConfig::new()
///         .pending(["SAVE"])
///         .success(["SAVE_OK"])
///         .failure(["SAVE_ERR"])
///         .failure_handler(|event: &Event<Tagged<&'static str>>| {
///             event.as_action().map(|action| *action.payload())
///         }),
/// )
/// .unwrap();
///
/// middleware.dispatch(Event::from(Tagged::with("SAVE", "")), |_| ()).unwrap();
/// assert!(state.is_pending());
///
/// middleware.dispatch(Event::from(Tagged::with("SAVE_ERR", "disk full")), |_| ()).unwrap();
/// assert_eq!(state.get(), (false, Some(Some("disk full"))));
/// ```
pub struct PendingState<A, E> {
    machine: TransitionMachine<A, (bool, Option<E>)>,
}

impl<A, E> PendingState<A, E>
where
    A: Action,
    E: Send + Sync + 'static,
{
    /// Subscribe to the configured triggers.
    pub fn new(
        registry: &ListenerRegistry<A>,
        config: PendingConfig<A, E>,
    ) -> Result<Self, InvalidEventError> {
        let spec = TransitionSpec::builder::<A>()
            .transition(states::PENDING, config.pending)
            .transition(states::SUCCESS, config.success)
            .transition(states::FAILURE, config.failure)
            .build_with(registry.resolver())?;

        let handler = config.failure_handler;
        let machine = TransitionMachine::new(registry, spec, move |transition, event| {
            match transition {
                Some(states::PENDING) => (true, None),
                Some(states::FAILURE) => (false, event.map(|event| handler(event))),
                _ => (false, None),
            }
        });
        Ok(Self { machine })
    }
}

impl<A, E> PendingState<A, E> {
    /// Whether the operation is in flight.
    pub fn is_pending(&self) -> bool {
        self.machine.with_state(|(pending, _)| *pending)
    }

    /// `(is_pending, error)`.
    pub fn get(&self) -> (bool, Option<E>)
    where
        E: Clone,
    {
        self.machine.state()
    }

    /// The last failure, cleared by the next pending or success trigger.
    pub fn error(&self) -> Option<E>
    where
        E: Clone,
    {
        self.machine.with_state(|(_, error)| error.clone())
    }

    /// The underlying machine.
    pub fn machine(&self) -> &TransitionMachine<A, (bool, Option<E>)> {
        &self.machine
    }

    /// Stop tracking; the state is frozen.
    pub fn deactivate(&mut self) -> bool {
        self.machine.deactivate()
    }
}

impl<A, E: fmt::Debug> fmt::Debug for PendingState<A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingState")
            .field("machine", &self.machine)
            .finish()
    }
}

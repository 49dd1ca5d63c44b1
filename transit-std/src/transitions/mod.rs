//! Derived transition state.
//!
//! A [`TransitionMachine`] subscribes to the keys of a [`TransitionSpec`] and
//! recomputes its state with a reducer each time one of them is dispatched:
//!
//! ```text
//! initial  = reducer(None, None)
//! on event = reducer(Some(transition name), Some(&event))
//! ```
//!
//! A key declared by several transitions belongs to the first one, both here
//! and in [`MockTransition`].

mod mock;
mod pending;

pub use mock::{MockTransition, mock_transition};
pub use pending::{PendingConfig, PendingState};

use crate::{
    registry::{Callback, ListenerRegistry},
    subscription::{ListenerGroup, Subscription},
};
use parking_lot::RwLock;
use std::{
    collections::HashSet,
    fmt,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};
use transit_core::{Action, BoxError, Event, HookResult, Thunk, TransitionSpec, states};

/// A transition reducer: `(transition name, triggering event) -> state`.
pub type Reducer<A, S> = Arc<dyn Fn(Option<&str>, Option<&Event<A>>) -> S + Send + Sync>;

/// State of the default thunk reducer: whether the generator is pending, and
/// the failing event if it failed.
pub type ThunkStatus<A> = (bool, Option<Event<A>>);

/// Shared state with a change counter.
///
/// The machine writes, observers read. A host scheduler can poll
/// [`generation`](StateCell::generation) to decide when to re-render.
pub struct StateCell<S> {
    inner: Arc<CellInner<S>>,
}

struct CellInner<S> {
    value: RwLock<S>,
    generation: AtomicU64,
}

impl<S> StateCell<S> {
    /// Create a cell holding `value` at generation 0.
    pub fn new(value: S) -> Self {
        Self {
            inner: Arc::new(CellInner {
                value: RwLock::new(value),
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// Replace the value and bump the generation.
    pub fn set(&self, value: S) {
        *self.inner.value.write() = value;
        self.inner.generation.fetch_add(1, Ordering::AcqRel);
    }

    /// Run `f` against the current value.
    pub fn with<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.inner.value.read())
    }

    /// Number of times the value was replaced.
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::Acquire)
    }
}

impl<S: Clone> StateCell<S> {
    /// A copy of the current value.
    pub fn get(&self) -> S {
        self.inner.value.read().clone()
    }
}

impl<S> Clone for StateCell<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for StateCell<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateCell")
            .field("value", &*self.inner.value.read())
            .field("generation", &self.generation())
            .finish()
    }
}

/// Derived state driven by named transitions.
///
/// The machine is active from construction until it is dropped (or
/// [`deactivate`](TransitionMachine::deactivate)d).
///
/// # Example
///
/// ```rust
/// use transit_std::{ActionListener, ListenerRegistry, TransitionMachine};
/// use transit_core::{Event, Tagged, TransitionSpec};
///
/// let registry = ListenerRegistry::<Tagged>::new();
/// let middleware = ActionListener::with_registry(&registry);
///
/// let spec = TransitionSpec::builder::<Tagged>()
///     .transition("loading", ["LOAD"])
///     .transition("idle", ["LOADED"])
///     .build()
///     .unwrap();
/// let machine = TransitionMachine::new(&registry, spec, |name, _event| {
///     name == Some("loading")
/// });
///
/// assert!(!machine.state());
/// middleware.dispatch(Event::from(Tagged::new("LOAD")), |_| ()).unwrap();
/// assert!(machine.state());
/// ```
pub struct TransitionMachine<A, S> {
    spec: Arc<TransitionSpec>,
    state: StateCell<S>,
    subscription: Subscription<A>,
}

impl<A, S> TransitionMachine<A, S>
where
    A: Action,
    S: Send + Sync + 'static,
{
    /// Build the machine and subscribe it to `registry`.
    ///
    /// The initial state is `reducer(None, None)`, computed once. Dispatched
    /// events resolve with the registry's resolver, so `spec` should be built
    /// with the same one.
    pub fn new<R>(registry: &ListenerRegistry<A>, spec: TransitionSpec, reducer: R) -> Self
    where
        R: Fn(Option<&str>, Option<&Event<A>>) -> S + Send + Sync + 'static,
    {
        Self::with_reducer(registry, spec, Arc::new(reducer))
    }

    /// Like [`TransitionMachine::new`] with an already shared reducer.
    pub fn with_reducer(
        registry: &ListenerRegistry<A>,
        spec: TransitionSpec,
        reducer: Reducer<A, S>,
    ) -> Self {
        let spec = Arc::new(spec);
        let state = StateCell::new(reducer(None, None));
        let groups = build_groups(registry, &spec, &reducer, &state);

        Self {
            spec,
            state,
            subscription: Subscription::subscribe(registry, groups),
        }
    }

    /// Build a machine from the transitions attached to `thunk`.
    ///
    /// A generator without attached transitions yields a machine that never
    /// leaves its initial state.
    pub fn for_thunk<R>(registry: &ListenerRegistry<A>, thunk: &Thunk<A>, reducer: R) -> Self
    where
        R: Fn(Option<&str>, Option<&Event<A>>) -> S + Send + Sync + 'static,
    {
        let spec = thunk.transitions().cloned().unwrap_or_default();
        Self::new(registry, spec, reducer)
    }
}

impl<A, S> TransitionMachine<A, S> {
    /// A copy of the current state.
    pub fn state(&self) -> S
    where
        S: Clone,
    {
        self.state.get()
    }

    /// Run `f` against the current state.
    pub fn with_state<T>(&self, f: impl FnOnce(&S) -> T) -> T {
        self.state.with(f)
    }

    /// Number of state updates so far.
    pub fn generation(&self) -> u64 {
        self.state.generation()
    }

    /// A handle to the state, for observers outliving a borrow of the machine.
    pub fn cell(&self) -> StateCell<S> {
        self.state.clone()
    }

    /// The transitions this machine follows.
    pub fn spec(&self) -> &TransitionSpec {
        &self.spec
    }

    /// Re-register the machine's listeners after a deactivation.
    pub fn activate(&mut self) -> bool {
        self.subscription.activate()
    }

    /// Remove the machine's listeners; the state stops changing.
    pub fn deactivate(&mut self) -> bool {
        self.subscription.deactivate()
    }

    /// Whether the machine's listeners are registered.
    pub fn is_active(&self) -> bool {
        self.subscription.is_active()
    }
}

impl<A: Action + Clone> TransitionMachine<A, ThunkStatus<A>> {
    /// Build a machine from `thunk`'s transitions with [`default_reducer`].
    pub fn for_thunk_default(registry: &ListenerRegistry<A>, thunk: &Thunk<A>) -> Self {
        Self::for_thunk(registry, thunk, default_reducer::<A>)
    }
}

impl<A, S: fmt::Debug> fmt::Debug for TransitionMachine<A, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransitionMachine")
            .field("spec", &self.spec)
            .field("state", &self.state)
            .field("active", &self.subscription.is_active())
            .finish()
    }
}

/// Reducer used when none is given for a generator: pending while in
/// [`states::PENDING`], carrying the event while in [`states::FAILURE`].
pub fn default_reducer<A: Clone>(
    transition: Option<&str>,
    event: Option<&Event<A>>,
) -> ThunkStatus<A> {
    let pending = transition == Some(states::PENDING);
    let failure = if transition == Some(states::FAILURE) {
        event.cloned()
    } else {
        None
    };
    (pending, failure)
}

fn build_groups<A, S>(
    registry: &ListenerRegistry<A>,
    spec: &Arc<TransitionSpec>,
    reducer: &Reducer<A, S>,
    state: &StateCell<S>,
) -> Vec<ListenerGroup<A>>
where
    A: Action,
    S: Send + Sync + 'static,
{
    let mut claimed = HashSet::new();
    let mut groups = Vec::with_capacity(spec.len());

    for entry in spec.iter() {
        let keys: Vec<_> = entry
            .keys()
            .iter()
            .filter(|key| claimed.insert((*key).clone()))
            .cloned()
            .collect();
        if keys.is_empty() {
            #[cfg(feature = "tracing")]
            tracing::debug!(transition = entry.name(), "transition has no keys of its own, skipping");
            continue;
        }

        let name = entry.name().to_owned();
        let resolver = *registry.resolver();
        let spec = Arc::clone(spec);
        let reducer = Arc::clone(reducer);
        let state = state.clone();
        let handler = Callback::new(move |event: &Event<A>| -> Result<HookResult, BoxError> {
            state.set(reducer(Some(&name), Some(event)));
            let key = resolver.resolve(event)?;
            Ok(if spec.is_consumed(&key) {
                HookResult::Stop
            } else {
                HookResult::Next
            })
        });
        groups.push(ListenerGroup::new(keys, handler));
    }

    groups
}

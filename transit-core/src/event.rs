//! The dispatched event: a record or a generator.

use crate::{action::Action, message::Message, thunk::Thunk};

/// Anything a host can dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Event<A> {
    /// A plain record.
    Action(A),
    /// A generator, run by the next stage of the pipeline.
    Thunk(Thunk<A>),
}

impl<A> Event<A> {
    /// The record, if this is one.
    pub fn as_action(&self) -> Option<&A> {
        match self {
            Event::Action(action) => Some(action),
            Event::Thunk(_) => None,
        }
    }

    /// The generator, if this is one.
    pub fn as_thunk(&self) -> Option<&Thunk<A>> {
        match self {
            Event::Action(_) => None,
            Event::Thunk(thunk) => Some(thunk),
        }
    }

    /// Whether this event is a generator.
    pub fn is_thunk(&self) -> bool {
        matches!(self, Event::Thunk(_))
    }
}

impl<A: Action> Event<A> {
    /// Whether the middleware must swallow this event after listeners ran.
    ///
    /// Generators never carry the marker themselves.
    pub fn stops_propagation(&self) -> bool {
        self.as_action().is_some_and(Action::stops_propagation)
    }
}

impl<A: Message> Message for Event<A> {}

impl<A: Action> From<A> for Event<A> {
    fn from(action: A) -> Self {
        Event::Action(action)
    }
}

impl<A> From<Thunk<A>> for Event<A> {
    fn from(thunk: Thunk<A>) -> Self {
        Event::Thunk(thunk)
    }
}

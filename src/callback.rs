//! Before/Around/After/failure callback shapes and the `Around` chain's
//! one-shot `Next` continuation.
//!
//! Grounded on the Go original's `applyTransitionAroundCallbacks`: each
//! around-callback either invokes `next` to proceed to the remaining chain
//! (and eventually the state mutation) or, if it is the *last* callback in
//! the matched set, may silently veto the mutation by never calling `next`.
//! A non-last callback that returns without calling `next` is a programmer
//! error and panics, matching the original's `calledBackNext` check.

use std::fmt;
use std::sync::Arc;

use crate::error::FireError;
use crate::machine::Machine;
use crate::transition::{Event, Transition};

/// A Before/After callback, arity-tagged over `{Machine, Transition}`.
#[derive(Clone)]
pub enum TransitionCallback {
    /// Takes no capabilities.
    Bare(Arc<dyn Fn() + Send + Sync>),
    /// Takes the machine.
    Machine(Arc<dyn Fn(&Machine) + Send + Sync>),
    /// Takes the transition.
    Transition(Arc<dyn Fn(&Transition) + Send + Sync>),
    /// Takes both the machine and the transition.
    MachineAndTransition(Arc<dyn Fn(&Machine, &Transition) + Send + Sync>),
}

impl fmt::Debug for TransitionCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TransitionCallback(..)")
    }
}

impl TransitionCallback {
    /// A callback taking no capabilities.
    pub fn bare(f: impl Fn() + Send + Sync + 'static) -> Self {
        Self::Bare(Arc::new(f))
    }

    /// A callback taking the machine.
    pub fn machine(f: impl Fn(&Machine) + Send + Sync + 'static) -> Self {
        Self::Machine(Arc::new(f))
    }

    /// A callback taking the transition.
    pub fn transition(f: impl Fn(&Transition) + Send + Sync + 'static) -> Self {
        Self::Transition(Arc::new(f))
    }

    /// A callback taking both the machine and the transition.
    pub fn machine_and_transition(
        f: impl Fn(&Machine, &Transition) + Send + Sync + 'static,
    ) -> Self {
        Self::MachineAndTransition(Arc::new(f))
    }

    pub(crate) fn invoke(&self, machine: &Machine, transition: &Transition) {
        match self {
            Self::Bare(f) => f(),
            Self::Machine(f) => f(machine),
            Self::Transition(f) => f(transition),
            Self::MachineAndTransition(f) => f(machine, transition),
        }
    }
}

/// The one-shot continuation passed to an around-callback. Calling it
/// resumes the chain: either the next around-callback, or, if this was the
/// last one, the state mutation itself.
pub struct Next {
    pub(crate) machine: Machine,
    pub(crate) transition: Transition,
    pub(crate) callbacks: Arc<Vec<AroundCallbackEntry>>,
    pub(crate) idx: usize,
    pub(crate) called: bool,
}

impl Next {
    /// Resume the around chain. Panics if called more than once.
    pub fn call(&mut self) {
        if self.called {
            panic!("around-callback invoked next() more than once");
        }
        self.called = true;
        crate::machine::Machine::run_around_step(
            self.machine.clone(),
            self.transition.clone(),
            self.callbacks.clone(),
            self.idx + 1,
        );
    }

    /// Whether `call` has already run.
    pub fn was_called(&self) -> bool {
        self.called
    }
}

/// An Around callback, arity-tagged over `{Machine, Transition}`, always
/// taking the [`Next`] continuation.
#[derive(Clone)]
pub enum AroundCallback {
    /// Takes only `next`.
    Next(Arc<dyn Fn(&mut Next) + Send + Sync>),
    /// Takes the machine and `next`.
    MachineNext(Arc<dyn Fn(&Machine, &mut Next) + Send + Sync>),
    /// Takes the transition and `next`.
    TransitionNext(Arc<dyn Fn(&Transition, &mut Next) + Send + Sync>),
    /// Takes the machine, the transition, and `next`.
    MachineAndTransitionNext(Arc<dyn Fn(&Machine, &Transition, &mut Next) + Send + Sync>),
}

impl fmt::Debug for AroundCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AroundCallback(..)")
    }
}

impl AroundCallback {
    /// An around-callback taking only `next`.
    pub fn next_only(f: impl Fn(&mut Next) + Send + Sync + 'static) -> Self {
        Self::Next(Arc::new(f))
    }

    /// An around-callback taking the machine and `next`.
    pub fn machine(f: impl Fn(&Machine, &mut Next) + Send + Sync + 'static) -> Self {
        Self::MachineNext(Arc::new(f))
    }

    /// An around-callback taking the transition and `next`.
    pub fn transition(f: impl Fn(&Transition, &mut Next) + Send + Sync + 'static) -> Self {
        Self::TransitionNext(Arc::new(f))
    }

    /// An around-callback taking the machine, the transition, and `next`.
    pub fn machine_and_transition(
        f: impl Fn(&Machine, &Transition, &mut Next) + Send + Sync + 'static,
    ) -> Self {
        Self::MachineAndTransitionNext(Arc::new(f))
    }

    pub(crate) fn invoke(&self, machine: &Machine, transition: &Transition, next: &mut Next) {
        match self {
            Self::Next(f) => f(next),
            Self::MachineNext(f) => f(machine, next),
            Self::TransitionNext(f) => f(transition, next),
            Self::MachineAndTransitionNext(f) => f(machine, transition, next),
        }
    }
}

/// A failure callback, arity-tagged: must accept the error, may also accept
/// the event.
#[derive(Clone)]
pub enum EventCallback {
    /// Takes only the error.
    ErrorOnly(Arc<dyn Fn(&FireError) + Send + Sync>),
    /// Takes the event and the error.
    EventAndError(Arc<dyn Fn(&Event, &FireError) + Send + Sync>),
}

impl fmt::Debug for EventCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EventCallback(..)")
    }
}

impl EventCallback {
    /// A failure callback taking only the error.
    pub fn error_only(f: impl Fn(&FireError) + Send + Sync + 'static) -> Self {
        Self::ErrorOnly(Arc::new(f))
    }

    /// A failure callback taking the event and the error.
    pub fn event_and_error(f: impl Fn(&Event, &FireError) + Send + Sync + 'static) -> Self {
        Self::EventAndError(Arc::new(f))
    }

    pub(crate) fn invoke(&self, event: &Event, error: &FireError) {
        match self {
            Self::ErrorOnly(f) => f(error),
            Self::EventAndError(f) => f(event, error),
        }
    }
}

/// A callback paired with an optional diagnostic label.
#[derive(Clone, Debug)]
pub struct CallbackEntry<C> {
    /// Human-readable name surfaced in panic messages for around-callbacks.
    pub label: Option<String>,
    /// The callback itself.
    pub callback: C,
}

impl<C> CallbackEntry<C> {
    /// Attach a diagnostic label to a callback.
    pub fn labeled(label: impl Into<String>, callback: C) -> Self {
        Self {
            label: Some(label.into()),
            callback,
        }
    }
}

impl<C> From<C> for CallbackEntry<C> {
    fn from(callback: C) -> Self {
        Self {
            label: None,
            callback,
        }
    }
}

/// A labeled [`TransitionCallback`].
pub type TransitionCallbackEntry = CallbackEntry<TransitionCallback>;
/// A labeled [`AroundCallback`].
pub type AroundCallbackEntry = CallbackEntry<AroundCallback>;
/// A labeled [`EventCallback`].
pub type EventCallbackEntry = CallbackEntry<EventCallback>;

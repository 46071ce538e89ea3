//! Guards: the boolean conditions attached to transitions and choices.
//!
//! A guard is one of a constant, a shared mutable handle, or a predicate
//! closure over some subset of `{Machine, Transition}`. This mirrors the
//! Go original's `TransitionGuard`/`ChoiceCondition` duality (a bare `bool`
//! or a function returning one), generalized into the predicate-arity
//! variants that spec.md's redesign of the original's `reflect`-based
//! `internal/dynafunc` dispatcher calls for: one variant per permitted
//! shape, normalized through a single `eval` entry point instead of runtime
//! argument binding.

use std::fmt;
use std::sync::{Arc, Mutex};

use crate::machine::Machine;
use crate::transition::Transition;

/// A boolean condition evaluated when resolving a transition or choice.
#[derive(Clone)]
pub enum Guard {
    /// Always evaluates to the given value.
    Constant(bool),
    /// Reads a shared, host-mutable boolean at evaluation time.
    Handle(Arc<Mutex<bool>>),
    /// Evaluates a predicate closure over some subset of `{Machine,
    /// Transition}`.
    Predicate(GuardPredicate),
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Guard::Constant(v) => write!(f, "Guard::Constant({v})"),
            Guard::Handle(_) => write!(f, "Guard::Handle(..)"),
            Guard::Predicate(_) => write!(f, "Guard::Predicate(..)"),
        }
    }
}

/// The arity-tagged predicate shapes a [`Guard::Predicate`] may hold.
#[derive(Clone)]
pub enum GuardPredicate {
    /// Takes no capabilities.
    Bare(Arc<dyn Fn() -> bool + Send + Sync>),
    /// Takes the machine being evaluated.
    Machine(Arc<dyn Fn(&Machine) -> bool + Send + Sync>),
    /// Takes the candidate transition.
    Transition(Arc<dyn Fn(&Transition) -> bool + Send + Sync>),
    /// Takes both the machine and the candidate transition.
    MachineAndTransition(Arc<dyn Fn(&Machine, &Transition) -> bool + Send + Sync>),
}

impl Guard {
    /// A guard that always evaluates to `value`.
    pub fn constant(value: bool) -> Self {
        Guard::Constant(value)
    }

    /// A guard that reads a shared, host-mutable cell.
    pub fn handle(cell: Arc<Mutex<bool>>) -> Self {
        Guard::Handle(cell)
    }

    /// A guard evaluated by a zero-argument predicate.
    pub fn predicate(f: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Guard::Predicate(GuardPredicate::Bare(Arc::new(f)))
    }

    /// A guard evaluated by a predicate over the machine.
    pub fn predicate_machine(f: impl Fn(&Machine) -> bool + Send + Sync + 'static) -> Self {
        Guard::Predicate(GuardPredicate::Machine(Arc::new(f)))
    }

    /// A guard evaluated by a predicate over the candidate transition.
    pub fn predicate_transition(f: impl Fn(&Transition) -> bool + Send + Sync + 'static) -> Self {
        Guard::Predicate(GuardPredicate::Transition(Arc::new(f)))
    }

    /// A guard evaluated by a predicate over both the machine and the
    /// candidate transition.
    pub fn predicate_machine_transition(
        f: impl Fn(&Machine, &Transition) -> bool + Send + Sync + 'static,
    ) -> Self {
        Guard::Predicate(GuardPredicate::MachineAndTransition(Arc::new(f)))
    }

    /// Whether this guard's shape requires a `Transition` to be in scope.
    /// Choice conditions and `unless_guard`s are evaluated before any
    /// candidate transition exists, so a guard of this shape used there is
    /// a registration-time programmer error.
    pub(crate) fn requires_transition(&self) -> bool {
        matches!(
            self,
            Guard::Predicate(GuardPredicate::Transition(_))
                | Guard::Predicate(GuardPredicate::MachineAndTransition(_))
        )
    }

    pub(crate) fn eval(&self, machine: &Machine, transition: Option<&Transition>) -> bool {
        match self {
            Guard::Constant(v) => *v,
            Guard::Handle(cell) => *cell.lock().unwrap(),
            Guard::Predicate(GuardPredicate::Bare(f)) => f(),
            Guard::Predicate(GuardPredicate::Machine(f)) => f(machine),
            Guard::Predicate(GuardPredicate::Transition(f)) => {
                let t = transition
                    .expect("guard declares a Transition capability but none is in scope here");
                f(t)
            }
            Guard::Predicate(GuardPredicate::MachineAndTransition(f)) => {
                let t = transition
                    .expect("guard declares a Transition capability but none is in scope here");
                f(machine, t)
            }
        }
    }
}

/// A [`Guard`] paired with an optional diagnostic label.
#[derive(Clone, Debug)]
pub struct LabeledGuard {
    /// Human-readable name surfaced in `tracing` fields and panic messages.
    pub label: Option<String>,
    /// The guard itself.
    pub guard: Guard,
}

impl LabeledGuard {
    /// Attach a diagnostic label to a guard.
    pub fn labeled(label: impl Into<String>, guard: Guard) -> Self {
        Self {
            label: Some(label.into()),
            guard,
        }
    }
}

impl From<Guard> for LabeledGuard {
    fn from(guard: Guard) -> Self {
        Self { label: None, guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::MachineDefinition;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn machine() -> Machine {
        Machine::build(MachineDefinition::new("idle").with_state("idle"))
    }

    #[test]
    fn constant_guard_evaluates_to_its_value() {
        let m = machine();
        assert!(Guard::constant(true).eval(&m, None));
        assert!(!Guard::constant(false).eval(&m, None));
    }

    #[test]
    fn handle_guard_reads_shared_cell() {
        let m = machine();
        let cell = Arc::new(Mutex::new(false));
        let guard = Guard::handle(cell.clone());
        assert!(!guard.eval(&m, None));
        *cell.lock().unwrap() = true;
        assert!(guard.eval(&m, None));
    }

    #[test]
    fn bare_predicate_reads_outer_state() {
        let m = machine();
        let seen = Arc::new(AtomicBool::new(false));
        let seen2 = seen.clone();
        let guard = Guard::predicate(move || {
            seen2.store(true, Ordering::SeqCst);
            true
        });
        assert!(guard.eval(&m, None));
        assert!(seen.load(Ordering::SeqCst));
    }

    #[test]
    fn transition_predicate_sees_candidate() {
        let m = machine();
        let guard = Guard::predicate_transition(|t| t.to() == "done");
        let candidate = Transition::new("idle", "done");
        assert!(guard.eval(&m, Some(&candidate)));
        let other = Transition::new("idle", "other");
        assert!(!guard.eval(&m, Some(&other)));
    }

    #[test]
    #[should_panic(expected = "Transition capability")]
    fn transition_predicate_without_transition_in_scope_panics() {
        let m = machine();
        let guard = Guard::predicate_transition(|_| true);
        guard.eval(&m, None);
    }
}

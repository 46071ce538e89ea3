//! The declarative `MachineDefinition` data model and its `with_*` fluent
//! constructors: the "any equivalent constructor" spec.md permits in place
//! of a staged builder DSL, mirroring the teacher's
//! `StateMachineFactory::with_*` chaining style.

use std::collections::HashMap;
use std::time::Duration;

use crate::callback::{
    AroundCallback, AroundCallbackEntry, EventCallback, EventCallbackEntry, TransitionCallback,
    TransitionCallbackEntry,
};
use crate::guard::LabeledGuard;

/// A single `from -> to` transition, guarded by `if`/`unless` conditions.
#[derive(Clone, Default)]
pub struct TransitionDefinition {
    /// States this transition applies from. Empty means "any".
    pub from: Vec<String>,
    /// States this transition is excluded from, regardless of `from`.
    pub except_from: Vec<String>,
    /// The destination state.
    pub to: String,
    /// All must evaluate `true` for the transition to be allowed.
    pub if_guards: Vec<LabeledGuard>,
    /// Any evaluating `true` rejects the transition.
    pub unless_guards: Vec<LabeledGuard>,
}

impl TransitionDefinition {
    /// A transition to `to`, matching any state by default.
    pub fn new(to: impl Into<String>) -> Self {
        Self {
            to: to.into(),
            ..Default::default()
        }
    }

    /// Restrict this transition to fire only from the given states.
    pub fn with_from(mut self, states: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.from.extend(states.into_iter().map(Into::into));
        self
    }

    /// Exclude the given states from matching, regardless of `from`.
    pub fn with_except_from(
        mut self,
        states: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.except_from.extend(states.into_iter().map(Into::into));
        self
    }

    /// Add a required (`if`) guard.
    pub fn with_if_guard(mut self, guard: impl Into<LabeledGuard>) -> Self {
        self.if_guards.push(guard.into());
        self
    }

    /// Add a rejecting (`unless`) guard.
    pub fn with_unless_guard(mut self, guard: impl Into<LabeledGuard>) -> Self {
        self.unless_guards.push(guard.into());
        self
    }
}

/// An if/then/else branch: evaluate `condition`, pick `on_true` or
/// `on_false`, and recurse if the chosen branch itself holds a nested
/// choice.
#[derive(Clone)]
pub struct ChoiceDefinition {
    /// The branching condition.
    pub condition: LabeledGuard,
    /// An optional guard that, if `true`, rejects the choice outright
    /// (mirrors a transition's `unless_guards`, but at the choice level).
    pub unless_guard: Option<LabeledGuard>,
    /// The branch taken when `condition` evaluates `true`.
    pub on_true: Box<EventDefinition>,
    /// The branch taken when `condition` evaluates `false`.
    pub on_false: Box<EventDefinition>,
}

impl ChoiceDefinition {
    /// A choice between two branches. Panics if `condition` requires a
    /// `Transition` capability, since no candidate transition exists yet
    /// when a choice condition is evaluated.
    pub fn new(
        condition: impl Into<LabeledGuard>,
        on_true: EventDefinition,
        on_false: EventDefinition,
    ) -> Self {
        let condition = condition.into();
        assert!(
            !condition.guard.requires_transition(),
            "choice condition cannot require a Transition capability (InvalidCallbackShape)"
        );
        Self {
            condition,
            unless_guard: None,
            on_true: Box::new(on_true),
            on_false: Box::new(on_false),
        }
    }

    /// Add a rejecting guard evaluated before `condition`.
    pub fn with_unless_guard(mut self, guard: impl Into<LabeledGuard>) -> Self {
        let guard = guard.into();
        assert!(
            !guard.guard.requires_transition(),
            "choice unless_guard cannot require a Transition capability (InvalidCallbackShape)"
        );
        self.unless_guard = Some(guard);
        self
    }
}

/// One event: either a flat list of candidate transitions, a choice, or
/// both (transitions are tried first; the choice is a fallback), and an
/// optional self-firing period.
#[derive(Clone, Default)]
pub struct EventDefinition {
    /// If set, this event fires itself on this period until the machine is
    /// dropped or exits.
    pub timed_every: Option<Duration>,
    /// A fallback if/then/else branch, tried when no transition below
    /// matches and is allowed.
    pub choice: Option<Box<ChoiceDefinition>>,
    /// Transitions tried in declaration order.
    pub transitions: Vec<TransitionDefinition>,
}

impl EventDefinition {
    /// An event with no transitions yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a candidate transition.
    pub fn with_transition(mut self, transition: TransitionDefinition) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Set the fallback choice.
    pub fn with_choice(mut self, choice: ChoiceDefinition) -> Self {
        self.choice = Some(Box::new(choice));
        self
    }

    /// Make this event self-fire on `period` until the machine is dropped
    /// or exits. Panics if `period` is zero.
    pub fn with_timed_every(mut self, period: Duration) -> Self {
        assert!(period > Duration::ZERO, "timed_every period must be positive");
        self.timed_every = Some(period);
        self
    }
}

/// A Before/Around/After callback registration: filters plus a `Do` list,
/// generic over the callback shape (`TransitionCallback` for Before/After,
/// `AroundCallback` for Around).
#[derive(Clone)]
pub struct TransitionCallbackDefinition<C> {
    /// States this registration applies from. Empty means "any".
    pub from: Vec<String>,
    /// States excluded from `from`.
    pub except_from: Vec<String>,
    /// States this registration applies to. Empty means "any".
    pub to: Vec<String>,
    /// States excluded from `to`.
    pub except_to: Vec<String>,
    /// Callbacks run, in order, when this registration matches.
    pub do_: Vec<CallbackEntryFor<C>>,
    /// After-callback only: the state to transition the parent machine into
    /// once this registration's `Do` list has run, making this machine
    /// inert. Ignored for Before/Around registrations.
    pub exit_into: Option<String>,
}

type CallbackEntryFor<C> = crate::callback::CallbackEntry<C>;

impl<C> TransitionCallbackDefinition<C> {
    /// An unfiltered registration with no callbacks yet.
    pub fn new() -> Self {
        Self {
            from: Vec::new(),
            except_from: Vec::new(),
            to: Vec::new(),
            except_to: Vec::new(),
            do_: Vec::new(),
            exit_into: None,
        }
    }

    /// Restrict this registration to the given `from` states.
    pub fn with_from(mut self, states: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.from.extend(states.into_iter().map(Into::into));
        self
    }

    /// Exclude the given states from `from`.
    pub fn with_except_from(
        mut self,
        states: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.except_from.extend(states.into_iter().map(Into::into));
        self
    }

    /// Restrict this registration to the given `to` states.
    pub fn with_to(mut self, states: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.to.extend(states.into_iter().map(Into::into));
        self
    }

    /// Exclude the given states from `to`.
    pub fn with_except_to(mut self, states: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.except_to.extend(states.into_iter().map(Into::into));
        self
    }

    /// Append a callback to the `Do` list.
    pub fn with_do(mut self, entry: impl Into<CallbackEntryFor<C>>) -> Self {
        self.do_.push(entry.into());
        self
    }

    /// After-callbacks only: transition the parent machine into `state`
    /// once this registration's `Do` list has run.
    pub fn with_exit_into(mut self, state: impl Into<String>) -> Self {
        self.exit_into = Some(state.into());
        self
    }
}

impl<C> Default for TransitionCallbackDefinition<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// A Before callback registration.
pub type BeforeCallbackDefinition = TransitionCallbackDefinition<TransitionCallback>;
/// An After callback registration (the only kind honoring `exit_into`).
pub type AfterCallbackDefinition = TransitionCallbackDefinition<TransitionCallback>;
/// An Around callback registration.
pub type AroundCallbackDefinition = TransitionCallbackDefinition<AroundCallback>;

/// A failure callback registration: which events it applies to, plus a `Do`
/// list.
#[derive(Clone, Default)]
pub struct EventCallbackDefinition {
    /// Events this registration applies to. Empty means "any".
    pub on: Vec<String>,
    /// Events excluded from `on`.
    pub except_on: Vec<String>,
    /// Callbacks run, in order, when this registration matches.
    pub do_: Vec<EventCallbackEntry>,
}

impl EventCallbackDefinition {
    /// An unfiltered registration with no callbacks yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict this registration to the given events.
    pub fn with_on(mut self, events: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.on.extend(events.into_iter().map(Into::into));
        self
    }

    /// Exclude the given events from `on`.
    pub fn with_except_on(mut self, events: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.except_on.extend(events.into_iter().map(Into::into));
        self
    }

    /// Append a callback to the `Do` list.
    pub fn with_do(mut self, entry: impl Into<EventCallbackEntry>) -> Self {
        self.do_.push(entry.into());
        self
    }
}

/// The full declarative shape of a machine: its states, events, optional
/// submachines, and callback pipeline.
#[derive(Clone, Default)]
pub struct MachineDefinition {
    /// Identifies this definition among siblings activated under the same
    /// parent state, for `Submachine(path...)` addressing.
    pub id: Option<String>,
    /// The declared state set. Not strictly enforced beyond validating
    /// `initial_state`; transitions may reference states outside this list
    /// ("states may be implied by transitions").
    pub states: Vec<String>,
    /// The state the machine starts in.
    pub initial_state: String,
    /// Named events, each with its own transitions/choice/timed_every.
    pub events: HashMap<String, EventDefinition>,
    /// States that, once entered, simultaneously activate the listed child
    /// machine definitions.
    pub submachines: HashMap<String, Vec<MachineDefinition>>,
    /// Before-callback registrations.
    pub before_callbacks: Vec<BeforeCallbackDefinition>,
    /// Around-callback registrations.
    pub around_callbacks: Vec<AroundCallbackDefinition>,
    /// After-callback registrations.
    pub after_callbacks: Vec<AfterCallbackDefinition>,
    /// Failure-callback registrations.
    pub failure_callbacks: Vec<EventCallbackDefinition>,
}

impl MachineDefinition {
    /// A definition starting in `initial_state`, with nothing else
    /// configured yet.
    pub fn new(initial_state: impl Into<String>) -> Self {
        Self {
            initial_state: initial_state.into(),
            ..Default::default()
        }
    }

    /// Set the submachine id used for `Submachine(path...)` addressing.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Declare a state.
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.states.push(state.into());
        self
    }

    /// Declare several states.
    pub fn with_states(mut self, states: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.states.extend(states.into_iter().map(Into::into));
        self
    }

    /// Register an event definition under `name`.
    pub fn with_event(mut self, name: impl Into<String>, def: EventDefinition) -> Self {
        self.events.insert(name.into(), def);
        self
    }

    /// Activate `children` simultaneously whenever `state` becomes current.
    pub fn with_submachines(
        mut self,
        state: impl Into<String>,
        children: Vec<MachineDefinition>,
    ) -> Self {
        self.submachines.insert(state.into(), children);
        self
    }

    /// Register a before-callback.
    pub fn with_before_callback(mut self, def: BeforeCallbackDefinition) -> Self {
        self.before_callbacks.push(def);
        self
    }

    /// Register an around-callback.
    pub fn with_around_callback(mut self, def: AroundCallbackDefinition) -> Self {
        self.around_callbacks.push(def);
        self
    }

    /// Register an after-callback.
    pub fn with_after_callback(mut self, def: AfterCallbackDefinition) -> Self {
        self.after_callbacks.push(def);
        self
    }

    /// Register a failure-callback.
    pub fn with_failure_callback(mut self, def: EventCallbackDefinition) -> Self {
        self.failure_callbacks.push(def);
        self
    }

    /// Registration-time shape checks run once by [`crate::Machine::build`],
    /// not lazily at fire time.
    pub(crate) fn validate(&self) {
        assert!(
            !self.initial_state.is_empty(),
            "initial_state must be non-empty"
        );
        let declared = self.states.iter().any(|s| s == &self.initial_state);
        let is_submachine_key = self.submachines.contains_key(&self.initial_state);
        assert!(
            declared || is_submachine_key || self.states.is_empty(),
            "initial_state '{}' is not among the declared states",
            self.initial_state
        );
    }
}

//! The machine runtime: `fire`, `send`, `set_current_state`, `submachine`,
//! `get_state_map`, hierarchical child instantiation, and `exit_into`.
//!
//! Grounded on the Go original's `machineImpl.Fire`/`setCurrentState`
//! (`examples/original_source/machine_impl.go`) for the core algorithm.
//! Hierarchical submachine instantiation and `exit_into` have no analog to
//! port from the original: its `Machine` interface declares
//! `Submachine(state string) (Machine, error)`, but `machineImpl` never
//! implements children, so this module builds that part fresh from
//! spec.md §4.5/§4.7, keeping the same "a single serialized entry point
//! drives guard evaluation, callbacks, and mutation" shape the rest of the
//! runtime uses.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock, Weak};

use tracing::{debug, debug_span, info, trace, warn};

use crate::callback::{AroundCallbackEntry, Next};
use crate::definition::{MachineDefinition, TransitionCallbackDefinition};
use crate::error::{FireError, SendError, StateError, SubmachineError};
use crate::matcher::{matches_event, matches_from, matches_to};
use crate::message::Message;
use crate::scheduler::TimedEventScheduler;
use crate::state_value::StateValue;
use crate::resolve;
use crate::transition::{Event, Transition};

thread_local! {
    /// Identities (by `Inner` pointer address) of machines currently
    /// executing a `fire`/`apply_transition_for_exit` call on this thread.
    /// Checked before acquiring the per-machine mutex so that a reentrant
    /// same-thread call surfaces `FireError::Reentrant` instead of
    /// deadlocking on `busy`.
    static FIRING_STACK: RefCell<HashSet<usize>> = RefCell::new(HashSet::new());
}

/// A running instance of a [`MachineDefinition`].
///
/// Cheap to clone: internally an `Arc` handle, the same handle shared by
/// timed-event schedulers (weakly) and parent/child links.
pub struct Machine(Arc<Inner>);

impl Clone for Machine {
    fn clone(&self) -> Self {
        Machine(self.0.clone())
    }
}

impl std::fmt::Debug for Machine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Machine").field("id", &self.0.id).finish()
    }
}

struct Inner {
    id: Option<String>,
    definition: Arc<MachineDefinition>,
    state: RwLock<RuntimeState>,
    busy: Mutex<()>,
    exited: AtomicBool,
    parent: Option<Weak<Inner>>,
    schedulers: Mutex<Vec<TimedEventScheduler>>,
}

struct RuntimeState {
    current: String,
    previous: String,
    children: HashMap<String, Vec<Machine>>,
}

/// A non-owning handle to a [`Machine`], used by timed-event schedulers so
/// they never keep a machine alive on their own.
#[derive(Clone)]
pub(crate) struct WeakMachine(Weak<Inner>);

impl WeakMachine {
    pub(crate) fn upgrade(&self) -> Option<Machine> {
        self.0.upgrade().map(Machine)
    }
}

struct FiringGuard(usize);

impl Drop for FiringGuard {
    fn drop(&mut self) {
        FIRING_STACK.with(|s| {
            s.borrow_mut().remove(&self.0);
        });
    }
}

impl Machine {
    /// Build a root machine instance from `definition`. Panics if the
    /// definition fails its registration-time shape checks.
    pub fn build(definition: MachineDefinition) -> Machine {
        Self::new(definition, None)
    }

    fn new(definition: MachineDefinition, parent: Option<Weak<Inner>>) -> Machine {
        definition.validate();
        let id = definition.id.clone();
        let initial = definition.initial_state.clone();
        let inner = Arc::new(Inner {
            id,
            definition: Arc::new(definition),
            state: RwLock::new(RuntimeState {
                current: initial.clone(),
                previous: String::new(),
                children: HashMap::new(),
            }),
            busy: Mutex::new(()),
            exited: AtomicBool::new(false),
            parent,
            schedulers: Mutex::new(Vec::new()),
        });
        let machine = Machine(inner);
        machine.instantiate_children_for(&initial);
        machine.start_schedulers();
        debug!(state = %initial, "machine instantiated");
        machine
    }

    pub(crate) fn downgrade(&self) -> WeakMachine {
        WeakMachine(Arc::downgrade(&self.0))
    }

    /// This machine's submachine id, if any.
    pub fn id(&self) -> Option<&str> {
        self.0.id.as_deref()
    }

    /// The current state name.
    pub fn get_state(&self) -> String {
        self.0.state.read().unwrap().current.clone()
    }

    /// The state this machine was in immediately before its most recent
    /// transition.
    pub fn get_previous_state(&self) -> String {
        self.0.state.read().unwrap().previous.clone()
    }

    /// Whether the current state equals `state`.
    pub fn is_state(&self, state: &str) -> bool {
        self.get_state() == state
    }

    /// Whether this machine has gone inert via `exit_into`.
    pub fn has_exited(&self) -> bool {
        self.0.exited.load(Ordering::Acquire)
    }

    /// Depth-first snapshot of this machine's state and, recursively, its
    /// active children's states.
    pub fn get_state_map(&self) -> StateValue {
        let guard = self.0.state.read().unwrap();
        match guard.children.get(&guard.current) {
            Some(list) if !list.is_empty() => {
                let mut map = HashMap::new();
                for kid in list {
                    if let Some(id) = kid.id() {
                        map.insert(id.to_string(), kid.get_state_map());
                    }
                }
                StateValue::Tree(guard.current.clone(), map)
            }
            _ => StateValue::Leaf(guard.current.clone()),
        }
    }

    /// Descend through active children, one path segment per level,
    /// matching each by submachine id.
    pub fn submachine(&self, path: &[&str]) -> Result<Machine, SubmachineError> {
        let mut current = self.clone();
        for segment in path {
            let guard = current.0.state.read().unwrap();
            let found = guard
                .children
                .get(&guard.current)
                .and_then(|list| list.iter().find(|m| m.id() == Some(*segment)).cloned());
            drop(guard);
            match found {
                Some(m) => current = m,
                None => {
                    return Err(SubmachineError::SubmachineNotActive((*segment).to_string()))
                }
            }
        }
        Ok(current)
    }

    /// Resolve and apply `event`, running before-, around-, and
    /// after-callbacks, or the failure-callbacks on resolution error.
    ///
    /// Returns [`FireError::Reentrant`] rather than deadlocking if called,
    /// directly or via a callback, from within an in-flight `fire` on the
    /// same machine instance on the same thread.
    pub fn fire(&self, event: &str) -> Result<(), FireError> {
        let _guard = match self.enter_firing() {
            Some(g) => g,
            None => {
                warn!(event, "reentrant fire() rejected");
                return Err(FireError::Reentrant);
            }
        };
        let _lock = self.0.busy.lock().unwrap();
        let from = self.get_state();
        let span = debug_span!("fire", event, from = %from);
        let _enter = span.enter();

        if self.0.exited.load(Ordering::Acquire) {
            return Err(FireError::NotInitialized);
        }
        let event_def = match self.0.definition.events.get(event) {
            Some(e) => e,
            None => return Err(FireError::NoSuchEvent(event.to_string())),
        };

        match resolve::resolve(self, event, event_def, &from) {
            Ok(transition) => {
                debug!(to = transition.to(), "transition resolved");
                self.run_before(&transition);
                let around = self.around_callbacks_for(transition.from(), transition.to());
                Machine::run_around_step(self.clone(), transition.clone(), around, 0);
                self.run_after(&transition)
            }
            Err(err) => {
                warn!(error = %err, "fire failed");
                self.run_failure(event, &err);
                Err(err)
            }
        }
    }

    /// The generic message front door: `TriggerEvent` fires, `OverrideState`
    /// writes the state directly.
    pub fn send(&self, message: Message) -> Result<(), SendError> {
        match message {
            Message::TriggerEvent(event) => self.fire(&event).map_err(SendError::from),
            Message::OverrideState(state) => {
                self.set_current_state(state).map_err(SendError::from)
            }
        }
    }

    /// Write the state directly, bypassing transitions, guards, and
    /// callbacks. Accepts either a plain state name or a recursive state
    /// tree (the shape [`Machine::get_state_map`] produces), so
    /// `set_current_state(get_state_map())` is a no-op.
    pub fn set_current_state(&self, value: StateValue) -> Result<(), StateError> {
        let top = value.state().to_string();
        let known = self.0.definition.states.iter().any(|s| s == &top)
            || self.0.definition.submachines.contains_key(&top);
        if !known && !self.0.definition.states.is_empty() {
            return Err(StateError::StateTypeNotSupported);
        }
        self.set_state_value(&value);
        Ok(())
    }

    fn set_state_value(&self, value: &StateValue) {
        let children_map = match value {
            StateValue::Leaf(_) => None,
            StateValue::Tree(_, map) => Some(map),
        };
        let state_name = value.state().to_string();
        {
            let mut guard = self.0.state.write().unwrap();
            guard.previous = guard.current.clone();
            guard.current = state_name.clone();
            guard.children.retain(|k, _| k == &state_name);
        }
        self.instantiate_children_for_with_values(&state_name, children_map);
    }

    fn enter_firing(&self) -> Option<FiringGuard> {
        let key = Arc::as_ptr(&self.0) as usize;
        let already = FIRING_STACK.with(|s| s.borrow().contains(&key));
        if already {
            return None;
        }
        FIRING_STACK.with(|s| s.borrow_mut().insert(key));
        Some(FiringGuard(key))
    }

    fn run_before(&self, transition: &Transition) {
        for def in &self.0.definition.before_callbacks {
            if matches_transition_callback(def, transition.from(), transition.to()) {
                for entry in &def.do_ {
                    entry.callback.invoke(self, transition);
                }
            }
        }
    }

    fn around_callbacks_for(&self, from: &str, to: &str) -> Arc<Vec<AroundCallbackEntry>> {
        let mut matched = Vec::new();
        for def in &self.0.definition.around_callbacks {
            if matches_transition_callback(def, from, to) {
                matched.extend(def.do_.iter().cloned());
            }
        }
        Arc::new(matched)
    }

    /// Drives the around-callback chain: invokes the callback at `idx`, or,
    /// once past the end, performs the state mutation. Called recursively
    /// by [`Next::call`].
    pub(crate) fn run_around_step(
        machine: Machine,
        transition: Transition,
        callbacks: Arc<Vec<AroundCallbackEntry>>,
        idx: usize,
    ) {
        match callbacks.get(idx) {
            None => machine.apply_transition_mutation(&transition),
            Some(entry) => {
                let mut next = Next {
                    machine: machine.clone(),
                    transition: transition.clone(),
                    callbacks: callbacks.clone(),
                    idx,
                    called: false,
                };
                entry.callback.invoke(&machine, &transition, &mut next);
                let is_last = idx + 1 == callbacks.len();
                if !next.was_called() && !is_last {
                    panic!(
                        "around-callback{} must call next() before returning",
                        entry
                            .label
                            .as_deref()
                            .map(|l| format!(" '{l}'"))
                            .unwrap_or_default()
                    );
                }
            }
        }
    }

    fn apply_transition_mutation(&self, transition: &Transition) {
        let to = transition.to().to_string();
        let old = self.get_state();
        if old != to {
            let removed = self.0.state.write().unwrap().children.remove(&old);
            if let Some(children) = removed {
                for child in children {
                    child.stop_schedulers_blocking();
                }
            }
        }
        {
            let mut guard = self.0.state.write().unwrap();
            guard.previous = guard.current.clone();
            guard.current = to.clone();
        }
        trace!(to = %to, "state mutated");
        self.instantiate_children_for(&to);
    }

    fn instantiate_children_for(&self, state: &str) {
        self.instantiate_children_for_with_values(state, None);
    }

    fn instantiate_children_for_with_values(
        &self,
        state: &str,
        values: Option<&HashMap<String, StateValue>>,
    ) {
        let Some(child_defs) = self.0.definition.submachines.get(state) else {
            return;
        };
        let mut new_children = Vec::new();
        for def in child_defs {
            let child = Machine::new(def.clone(), Some(Arc::downgrade(&self.0)));
            if let Some(values) = values {
                if let Some(id) = def.id.as_deref() {
                    if let Some(sub_value) = values.get(id) {
                        child.set_state_value(sub_value);
                    }
                }
            }
            new_children.push(child);
        }
        self.0
            .state
            .write()
            .unwrap()
            .children
            .insert(state.to_string(), new_children);
    }

    fn run_after(&self, transition: &Transition) -> Result<(), FireError> {
        for def in &self.0.definition.after_callbacks {
            if matches_transition_callback(def, transition.from(), transition.to()) {
                for entry in &def.do_ {
                    entry.callback.invoke(self, transition);
                }
                if let Some(target) = &def.exit_into {
                    return self.exit_into(target);
                }
            }
        }
        Ok(())
    }

    fn exit_into(&self, target: &str) -> Result<(), FireError> {
        let Some(parent) = self.0.parent.as_ref().and_then(Weak::upgrade).map(Machine) else {
            // Not hosted under a parent: exit_into has nothing to act on.
            return Ok(());
        };
        info!(target, "exit_into: transitioning parent machine");
        parent
            .apply_transition_for_exit(target)
            .map_err(|e| FireError::SubmachineExitFailed(Box::new(e)))?;
        self.0.exited.store(true, Ordering::Release);
        self.stop_schedulers_blocking();
        Ok(())
    }

    /// Runs a machine's own before/around/after pipeline for a transition
    /// not driven by an event (used by `exit_into` to transition a parent).
    fn apply_transition_for_exit(&self, to: &str) -> Result<(), FireError> {
        if self.0.exited.load(Ordering::Acquire) {
            return Err(FireError::NotInitialized);
        }
        let _guard = self.enter_firing().ok_or(FireError::Reentrant)?;
        let _lock = self.0.busy.lock().unwrap();

        let from = self.get_state();
        let transition = Transition::new(from.clone(), to.to_string());
        self.run_before(&transition);
        let around = self.around_callbacks_for(&from, to);
        Machine::run_around_step(self.clone(), transition.clone(), around, 0);
        self.run_after(&transition)
    }

    fn run_failure(&self, event: &str, error: &FireError) {
        let info = Event::new(event);
        for def in &self.0.definition.failure_callbacks {
            if matches_event(&def.on, &def.except_on, event) {
                for entry in &def.do_ {
                    entry.callback.invoke(&info, error);
                }
            }
        }
    }

    fn start_schedulers(&self) {
        let mut list = Vec::new();
        for (name, def) in &self.0.definition.events {
            if let Some(period) = def.timed_every {
                list.push(TimedEventScheduler::spawn(self, name.clone(), period));
            }
        }
        *self.0.schedulers.lock().unwrap() = list;
    }

    fn stop_schedulers_blocking(&self) {
        let mut list = self.0.schedulers.lock().unwrap();
        for mut s in list.drain(..) {
            s.stop_blocking();
        }
    }
}

fn matches_transition_callback<C>(
    def: &TransitionCallbackDefinition<C>,
    from: &str,
    to: &str,
) -> bool {
    matches_from(&def.from, &def.except_from, from) && matches_to(&def.to, &def.except_to, to)
}

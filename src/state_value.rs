//! The recursive state-value shape used by [`crate::Machine::get_state_map`]
//! and [`crate::Machine::set_current_state`].

use std::collections::HashMap;

/// Either a plain state name, or a state name paired with one entry per
/// active submachine id, recursively. `GetStateMap` produces this shape;
/// `SetState` accepts it back, so `set_current_state(get_state_map())` is a
/// no-op.
#[derive(Debug, Clone, PartialEq)]
pub enum StateValue {
    /// A state with no active children.
    Leaf(String),
    /// A state with one entry per active submachine id.
    Tree(String, HashMap<String, StateValue>),
}

impl StateValue {
    /// The top-level state name, regardless of shape.
    pub fn state(&self) -> &str {
        match self {
            StateValue::Leaf(s) => s,
            StateValue::Tree(s, _) => s,
        }
    }
}

impl From<&str> for StateValue {
    fn from(value: &str) -> Self {
        StateValue::Leaf(value.to_string())
    }
}

impl From<String> for StateValue {
    fn from(value: String) -> Self {
        StateValue::Leaf(value)
    }
}

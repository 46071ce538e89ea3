//! The front-door message shape accepted by [`crate::Machine::send`].

use crate::state_value::StateValue;

/// A message dispatched to a machine's generic front door.
#[derive(Debug, Clone)]
pub enum Message {
    /// Fire the named event.
    TriggerEvent(String),
    /// Write the machine's state directly, bypassing transitions.
    OverrideState(StateValue),
}

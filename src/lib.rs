//! `statecraft` is an embeddable, hierarchical finite-state machine engine.
//!
//! A [`Machine`] is built once from a [`MachineDefinition`] and then driven
//! by firing named events. Transitions may be guarded, may branch through
//! an if/then/else [`ChoiceDefinition`], may self-fire on a timer, and may
//! activate independent child machines simply by entering a state that
//! lists submachines. A before/around/after/failure callback pipeline
//! surrounds every transition; around-callbacks form a continuation chain
//! via [`Next`], and an after-callback may declare `exit_into` to hand
//! control back up to a parent machine and go inert.
//!
//! ```
//! use statecraft::{EventDefinition, Machine, MachineDefinition, TransitionDefinition};
//!
//! let turnstile = MachineDefinition::new("locked")
//!     .with_states(["locked", "unlocked"])
//!     .with_event(
//!         "coin",
//!         EventDefinition::new()
//!             .with_transition(TransitionDefinition::new("unlocked").with_from(["locked"])),
//!     )
//!     .with_event(
//!         "push",
//!         EventDefinition::new()
//!             .with_transition(TransitionDefinition::new("locked").with_from(["unlocked"])),
//!     );
//!
//! let machine = Machine::build(turnstile);
//! assert!(machine.is_state("locked"));
//! machine.fire("coin").unwrap();
//! assert!(machine.is_state("unlocked"));
//! ```

#![deny(missing_docs)]

mod callback;
mod definition;
mod error;
mod guard;
mod machine;
mod matcher;
mod message;
mod resolve;
mod scheduler;
mod state_value;
mod transition;

pub use callback::{AroundCallback, CallbackEntry, EventCallback, Next, TransitionCallback};
pub use definition::{
    AfterCallbackDefinition, AroundCallbackDefinition, BeforeCallbackDefinition,
    ChoiceDefinition, EventCallbackDefinition, EventDefinition, MachineDefinition,
    TransitionCallbackDefinition, TransitionDefinition,
};
pub use error::{FireError, SendError, StateError, SubmachineError};
pub use guard::{Guard, GuardPredicate, LabeledGuard};
pub use machine::Machine;
pub use message::Message;
pub use state_value::StateValue;
pub use transition::{Event, Transition};

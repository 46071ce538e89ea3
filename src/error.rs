//! Error taxonomy surfaced to callers of the machine runtime.
//!
//! Programmer errors (invalid callback arity, a non-last around-callback
//! that never calls `next()`, an unknown guard kind) are not part of these
//! enums: per the machine's contract they are fatal and `panic!` rather
//! than returning a `Result`, the same way the Go original this crate is
//! modeled on calls `panic(...)` from `assertGuardKind`/`assertCallbackKind`.

use thiserror::Error;

/// Errors returned by [`crate::Machine::fire`].
#[derive(Debug, Clone, Error)]
pub enum FireError {
    /// `fire` was called before a definition was accepted, or after the
    /// machine became inert via `exit_into`.
    #[error("state machine has not been initialized")]
    NotInitialized,

    /// The fired event is not present in the machine's definition.
    #[error("no such event: '{0}'")]
    NoSuchEvent(String),

    /// No transition's `from`-filter matched the current state, and no
    /// choice resolved a branch either.
    #[error("no matching transition for event '{event}' from state '{from}'")]
    NoMatchingTransition {
        /// The event that was fired.
        event: String,
        /// The state it was fired from.
        from: String,
    },

    /// A transition matched the current state but was rejected by its
    /// guards (or a choice's `unless_guard`).
    #[error("transition not allowed for event '{event}' from state '{from}'")]
    TransitionNotAllowed {
        /// The event that was fired.
        event: String,
        /// The state it was fired from.
        from: String,
    },

    /// A callback invoked by this `fire` attempted to synchronously `fire`
    /// on the same machine instance.
    #[error("reentrant fire() call on the same machine")]
    Reentrant,

    /// An `exit_into` after-callback's supermachine transition itself
    /// failed; wraps the inner error.
    #[error("exit_into transition on the parent machine failed: {0}")]
    SubmachineExitFailed(Box<FireError>),
}

/// Errors returned by [`crate::Machine::send`].
#[derive(Debug, Error)]
pub enum SendError {
    /// Reserved for a future open `Message` front door (e.g. a
    /// deserialized-from-config message whose tag doesn't match a known
    /// variant). `Message` is currently a closed enum and `send` handles
    /// both of its variants exhaustively, so this arm is unreachable today.
    #[error("unrecognized message")]
    UnknownMessage,
    /// The wrapped `TriggerEvent` message failed to fire.
    #[error(transparent)]
    Fire(#[from] FireError),
    /// The wrapped `OverrideState` message failed to apply.
    #[error(transparent)]
    SetState(#[from] StateError),
}

/// Errors returned by [`crate::Machine::set_current_state`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// The state value's shape does not name a known state or submachine
    /// key of the machine's definition.
    #[error("state value is not a recognized state or submachine key")]
    StateTypeNotSupported,
}

/// Errors returned by [`crate::Machine::submachine`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmachineError {
    /// No active child machine matches the given path segment.
    #[error("no active submachine matches id '{0}'")]
    SubmachineNotActive(String),
}

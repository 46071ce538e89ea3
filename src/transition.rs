//! Read-only runtime capability values passed into guards and callbacks.

/// The candidate or committed `from -> to` pair a guard or transition
/// callback is being evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    from: String,
    to: String,
}

impl Transition {
    pub(crate) fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    /// The state the transition departs from.
    pub fn from(&self) -> &str {
        &self.from
    }

    /// The state the transition arrives at.
    pub fn to(&self) -> &str {
        &self.to
    }
}

/// The event a failure callback is being run for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    name: String,
}

impl Event {
    pub(crate) fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// The event's name.
    pub fn event(&self) -> &str {
        &self.name
    }
}

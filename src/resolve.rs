//! Transition resolution: scan an event's transitions in declaration order,
//! falling back to its choice if present.
//!
//! Grounded on the Go original's `Fire` selection loop. The one deliberate
//! departure from a literal port is the `TransitionNotAllowed` vs
//! `NoMatchingTransition` priority rule pinned in SPEC_FULL.md §9: a
//! candidate whose `from`-filter matched but whose guards rejected it is
//! remembered and takes priority over a plain "nothing matched" outcome,
//! regardless of which was encountered first.

use crate::definition::{ChoiceDefinition, EventDefinition, TransitionDefinition};
use crate::error::FireError;
use crate::machine::Machine;
use crate::matcher::matches_from;
use crate::transition::Transition;

pub(crate) fn resolve(
    machine: &Machine,
    event: &str,
    event_def: &EventDefinition,
    from: &str,
) -> Result<Transition, FireError> {
    let (found, remembered) = scan(machine, event, &event_def.transitions, from);
    if let Some(found) = found {
        return Ok(found);
    }
    if let Some(choice) = &event_def.choice {
        return resolve_choice(machine, event, choice, from);
    }
    Err(remembered.unwrap_or(FireError::NoMatchingTransition {
        event: event.to_string(),
        from: from.to_string(),
    }))
}

/// Scans `transitions` in order. Returns the first allowed match, plus (if
/// none was found) the highest-priority rejection kind encountered, so the
/// caller can either fall back to a choice or surface that error directly.
fn scan(
    machine: &Machine,
    event: &str,
    transitions: &[TransitionDefinition],
    from: &str,
) -> (Option<Transition>, Option<FireError>) {
    let mut remembered: Option<FireError> = None;
    for t in transitions {
        if !matches_from(&t.from, &t.except_from, from) {
            remembered = remember(
                remembered,
                FireError::NoMatchingTransition {
                    event: event.to_string(),
                    from: from.to_string(),
                },
            );
            continue;
        }
        let candidate = Transition::new(from, t.to.clone());
        let allowed = t
            .if_guards
            .iter()
            .all(|g| g.guard.eval(machine, Some(&candidate)))
            && t.unless_guards
                .iter()
                .all(|g| !g.guard.eval(machine, Some(&candidate)));
        if !allowed {
            remembered = remember(
                remembered,
                FireError::TransitionNotAllowed {
                    event: event.to_string(),
                    from: from.to_string(),
                },
            );
            continue;
        }
        return (Some(candidate), None);
    }
    (None, remembered)
}

fn remember(existing: Option<FireError>, new: FireError) -> Option<FireError> {
    match &existing {
        Some(FireError::TransitionNotAllowed { .. }) => existing,
        _ => Some(new),
    }
}

fn resolve_choice(
    machine: &Machine,
    event: &str,
    choice: &ChoiceDefinition,
    from: &str,
) -> Result<Transition, FireError> {
    if let Some(unless) = &choice.unless_guard {
        if unless.guard.eval(machine, None) {
            return Err(FireError::TransitionNotAllowed {
                event: event.to_string(),
                from: from.to_string(),
            });
        }
    }
    let branch = if choice.condition.guard.eval(machine, None) {
        &choice.on_true
    } else {
        &choice.on_false
    };
    if let Some(nested) = &branch.choice {
        return resolve_choice(machine, event, nested, from);
    }
    let (found, remembered) = scan(machine, event, &branch.transitions, from);
    if let Some(found) = found {
        return Ok(found);
    }
    Err(remembered.unwrap_or(FireError::NoMatchingTransition {
        event: event.to_string(),
        from: from.to_string(),
    }))
}

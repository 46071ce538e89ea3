use statecraft::{EventDefinition, FireError, Machine, MachineDefinition, TransitionDefinition};

fn turnstile() -> MachineDefinition {
    MachineDefinition::new("locked")
        .with_states(["locked", "unlocked"])
        .with_event(
            "coin",
            EventDefinition::new()
                .with_transition(TransitionDefinition::new("unlocked").with_from(["locked"])),
        )
        .with_event(
            "push",
            EventDefinition::new()
                .with_transition(TransitionDefinition::new("locked").with_from(["unlocked"])),
        )
}

#[test]
fn coin_then_push_returns_the_turnstile_to_locked() -> anyhow::Result<()> {
    let machine = Machine::build(turnstile());
    assert!(machine.is_state("locked"));

    machine.fire("coin")?;
    assert!(machine.is_state("unlocked"));

    machine.fire("push")?;
    assert!(machine.is_state("locked"));
    Ok(())
}

#[test]
fn pushing_a_locked_turnstile_is_rejected_and_state_is_unchanged() {
    let machine = Machine::build(turnstile());
    let err = machine.fire("push").unwrap_err();
    assert!(matches!(err, FireError::NoMatchingTransition { ref event, ref from }
        if event == "push" && from == "locked"));
    assert!(machine.is_state("locked"));
}

#[test]
fn coining_an_unlocked_turnstile_has_no_matching_transition_either() -> anyhow::Result<()> {
    let machine = Machine::build(turnstile());
    machine.fire("coin")?;
    let err = machine.fire("coin").unwrap_err();
    assert!(matches!(err, FireError::NoMatchingTransition { .. }));
    assert!(machine.is_state("unlocked"));
    Ok(())
}

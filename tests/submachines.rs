use statecraft::{
    AfterCallbackDefinition, EventDefinition, FireError, Machine, MachineDefinition,
    SubmachineError, TransitionDefinition,
};

fn job() -> MachineDefinition {
    MachineDefinition::new("pending")
        .with_id("job")
        .with_states(["pending", "done"])
        .with_event(
            "complete",
            EventDefinition::new()
                .with_transition(TransitionDefinition::new("done").with_from(["pending"])),
        )
}

#[test]
fn entering_a_state_activates_its_submachines() -> anyhow::Result<()> {
    let def = MachineDefinition::new("idle")
        .with_states(["idle", "running"])
        .with_submachines("running", vec![job()])
        .with_event(
            "start",
            EventDefinition::new()
                .with_transition(TransitionDefinition::new("running").with_from(["idle"])),
        );

    let machine = Machine::build(def);
    assert!(machine.submachine(&["job"]).is_err());

    machine.fire("start")?;
    let job = machine.submachine(&["job"])?;
    assert!(job.is_state("pending"));

    job.fire("complete")?;
    assert!(job.is_state("done"));
    Ok(())
}

#[test]
fn submachine_lookup_fails_for_an_unknown_id() -> anyhow::Result<()> {
    let def = MachineDefinition::new("idle")
        .with_states(["idle", "running"])
        .with_submachines("running", vec![job()])
        .with_event(
            "start",
            EventDefinition::new()
                .with_transition(TransitionDefinition::new("running").with_from(["idle"])),
        );

    let machine = Machine::build(def);
    machine.fire("start")?;
    let err = machine.submachine(&["nonexistent"]).unwrap_err();
    assert!(matches!(err, SubmachineError::SubmachineNotActive(ref id) if id == "nonexistent"));
    Ok(())
}

#[test]
fn exit_into_hands_control_back_to_the_parent_and_stops_the_child() -> anyhow::Result<()> {
    let job = job().with_after_callback(
        AfterCallbackDefinition::new()
            .with_to(["done"])
            .with_exit_into("finished"),
    );

    let def = MachineDefinition::new("idle")
        .with_states(["idle", "running", "finished"])
        .with_submachines("running", vec![job])
        .with_event(
            "start",
            EventDefinition::new()
                .with_transition(TransitionDefinition::new("running").with_from(["idle"])),
        );

    let machine = Machine::build(def);
    machine.fire("start")?;
    let child = machine.submachine(&["job"])?;

    child.fire("complete")?;

    assert!(child.has_exited());
    assert!(machine.is_state("finished"));

    let err = child.fire("complete").unwrap_err();
    assert!(matches!(err, FireError::NotInitialized));
    Ok(())
}

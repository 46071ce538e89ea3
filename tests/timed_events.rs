use std::sync::atomic::{AtomicUsize, Ordering::SeqCst};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use statecraft::{
    AfterCallbackDefinition, EventCallback, EventCallbackDefinition, EventDefinition, Machine,
    MachineDefinition, TransitionCallback, TransitionDefinition,
};

#[test]
fn timed_every_fires_a_tolerant_count_within_the_sleep_window() -> anyhow::Result<()> {
    // Every scheduler tick calls `fire("tick")` regardless of outcome: the
    // first successful call lands on `done`, every call after that misses
    // the `from=pending` filter and is counted via the failure callback
    // instead. Summing both gives the total number of `Fire` attempts the
    // scheduler made, which is what spec.md's S6 scenario measures.
    let fires = Arc::new(AtomicUsize::new(0));

    let count_success = {
        let fires = fires.clone();
        TransitionCallback::bare(move || {
            fires.fetch_add(1, SeqCst);
        })
    };
    let count_miss = {
        let fires = fires.clone();
        EventCallback::error_only(move |_err| {
            fires.fetch_add(1, SeqCst);
        })
    };

    let def = MachineDefinition::new("pending")
        .with_states(["pending", "done"])
        .with_event(
            "tick",
            EventDefinition::new()
                .with_transition(TransitionDefinition::new("done").with_from(["pending"]))
                .with_timed_every(Duration::from_millis(50)),
        )
        .with_after_callback(
            AfterCallbackDefinition::new()
                .with_to(["done"])
                .with_do(count_success),
        )
        .with_failure_callback(EventCallbackDefinition::new().with_do(count_miss));

    let machine = Machine::build(def);

    sleep(Duration::from_millis(220));

    assert!(machine.is_state("done"));
    let count = fires.load(SeqCst);
    assert!(
        (3..=5).contains(&count),
        "expected a fire count in [3, 5] after 220ms at a 50ms period, got {count}"
    );

    Ok(())
}

//! The `timed_every` self-firing scheduler: one `std::thread` per timed
//! event, cancelled via the standard "drop the sender to unblock
//! `recv_timeout`" idiom.
//!
//! Grounded on spec.md §9's own prescription for this concern ("a per-event
//! task in the host's concurrency primitive... with a per-machine
//! cancellation signal observed on every tick"); the `Every(duration)`
//! naming is grounded on `examples/original_source/timed_event_builder.go`.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tracing::{debug, trace};

use crate::machine::{Machine, WeakMachine};

pub(crate) struct TimedEventScheduler {
    cancel: Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl TimedEventScheduler {
    /// Spawns a background thread that fires `event` on `machine` every
    /// `period`, until cancelled or until `machine` is dropped. Holds only
    /// a [`WeakMachine`] so the thread never keeps the machine alive on its
    /// own.
    pub(crate) fn spawn(machine: &Machine, event: String, period: Duration) -> Self {
        let (cancel, rx) = mpsc::channel::<()>();
        let weak: WeakMachine = machine.downgrade();
        let handle = thread::spawn(move || {
            debug!(event = %event, period_ms = period.as_millis() as u64, "timed-event scheduler started");
            loop {
                match rx.recv_timeout(period) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    Err(RecvTimeoutError::Timeout) => {
                        let Some(machine) = weak.upgrade() else {
                            break;
                        };
                        trace!(event = %event, "timed-event tick");
                        let _ = machine.fire(&event);
                    }
                }
            }
            debug!(event = %event, "timed-event scheduler stopped");
        });
        TimedEventScheduler {
            cancel,
            handle: Some(handle),
        }
    }

    /// Signals cancellation and blocks until the scheduler thread has
    /// observed it and exited.
    pub(crate) fn stop_blocking(&mut self) {
        let _ = self.cancel.send(());
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TimedEventScheduler {
    fn drop(&mut self) {
        self.stop_blocking();
    }
}

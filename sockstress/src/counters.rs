use sockstress_core::{ConnectionOutcome, PhaseKind, PhaseResult};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

#[derive(Debug, Default)]
struct Tally {
    success: u64,
    failure: u64,
    latencies: Vec<Duration>,
}

/// Counters written by every attempt of a single phase.
///
/// One lock guards both counts and the latency samples so that an attempt's
/// updates land together. A fresh value is created per phase.
#[derive(Debug, Default)]
pub struct SharedPhaseCounters {
    tally: Mutex<Tally>,
}

impl SharedPhaseCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: ConnectionOutcome) {
        let mut tally = self.tally.lock().unwrap_or_else(PoisonError::into_inner);
        match outcome {
            ConnectionOutcome::Success { elapsed } => {
                tally.success += 1;
                tally.latencies.push(elapsed);
            }
            ConnectionOutcome::Failure(_) => tally.failure += 1,
        }
    }

    pub fn total(&self) -> u64 {
        let tally = self.tally.lock().unwrap_or_else(PoisonError::into_inner);
        tally.success + tally.failure
    }

    /// Move the collected data out into a [`PhaseResult`], leaving the
    /// counters empty.
    pub fn freeze(&self, kind: PhaseKind, elapsed: Duration) -> PhaseResult {
        let tally = std::mem::take(&mut *self.tally.lock().unwrap_or_else(PoisonError::into_inner));
        PhaseResult::new(kind, tally.success, tally.failure, elapsed, tally.latencies)
    }
}

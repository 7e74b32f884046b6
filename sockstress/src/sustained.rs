//! Sustained throughput: a fixed pool of workers issuing attempts back to back
//! until the phase duration runs out.
use crate::attempt::{attempt, AttemptSettings};
use crate::counters::SharedPhaseCounters;
use sockstress_core::{ConnectionOutcome, FailureKind, PhaseKind, PhaseResult};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Run `workers` looping workers for `duration`, then signal them to stop and
/// wait for each to finish its in-flight attempt.
///
/// Throughput of the result is successes divided by `duration`; the phase's
/// wall clock includes the drain after the stop signal.
#[instrument(name = "sustained", skip(settings, duration), fields(duration = %humantime::format_duration(duration)))]
pub async fn run_sustained_phase(
    workers: usize,
    duration: Duration,
    settings: Arc<AttemptSettings>,
) -> PhaseResult {
    let counters = Arc::new(SharedPhaseCounters::new());
    let stop = Arc::new(AtomicBool::new(false));
    let start = Instant::now();

    let tasks: Vec<_> = (0..workers)
        .map(|id| {
            let settings = settings.clone();
            let counters = counters.clone();
            let stop = stop.clone();
            tokio::spawn(
                async move {
                    let mut attempts = 0u64;
                    // NOTE: Checked between attempts only; an attempt in flight runs to completion.
                    while !stop.load(Ordering::Relaxed) {
                        let outcome = attempt(&settings).await;
                        counters.record(outcome);
                        attempts += 1;
                    }
                    trace!("Worker {id} stopping after {attempts} attempts.");
                }
                .in_current_span(),
            )
        })
        .collect();

    tokio::time::sleep(duration).await;
    stop.store(true, Ordering::Relaxed);
    debug!("Stop signalled, waiting on {workers} workers.");

    for task in tasks {
        if let Err(err) = task.await {
            error!("Sustained worker failed: {err}");
            counters.record(ConnectionOutcome::Failure(FailureKind::Protocol));
        }
    }

    let result = counters.freeze(PhaseKind::SustainedThroughput(duration), start.elapsed());
    debug!(
        "{} attempts, {} succeeded, {:.2} conn/s",
        result.total(),
        result.success(),
        result.throughput()
    );
    result
}

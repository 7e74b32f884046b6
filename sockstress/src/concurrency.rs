//! Concurrency phases: N simultaneous attempts, and the ascending ladder of
//! phases that stops once the target saturates.
use crate::attempt::{attempt, AttemptSettings};
use crate::counters::SharedPhaseCounters;
use crate::runner::PhaseObserver;
use sockstress_core::{ConnectionOutcome, FailureKind, PhaseKind, PhaseResult};
use std::sync::Arc;
use std::time::{Duration, Instant};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

/// Launch `connections` attempts at once and wait for every one of them.
#[instrument(name = "concurrency", skip(settings))]
pub async fn run_concurrency_phase(
    connections: usize,
    settings: Arc<AttemptSettings>,
) -> PhaseResult {
    let counters = Arc::new(SharedPhaseCounters::new());
    let start = Instant::now();

    let mut tasks = Vec::with_capacity(connections);
    for _ in 0..connections {
        let settings = settings.clone();
        let counters = counters.clone();
        tasks.push(tokio::spawn(
            async move {
                let outcome = attempt(&settings).await;
                counters.record(outcome);
            }
            .in_current_span(),
        ));
    }

    for task in tasks {
        if let Err(err) = task.await {
            // The task never reached `record`, so count it here to keep the
            // totals equal to `connections`.
            error!("Connection attempt task failed: {err}");
            counters.record(ConnectionOutcome::Failure(FailureKind::Protocol));
        }
    }

    let result = counters.freeze(PhaseKind::Concurrency(connections), start.elapsed());
    debug!(
        "{}: {} succeeded, {} failed in {}",
        result.kind(),
        result.success(),
        result.failure(),
        humantime::format_duration(result.elapsed())
    );
    if let Some(stats) = result.latency_stats() {
        debug!("Latency {stats}");
    }
    result
}

/// Run a phase per level in order. Stops after the first phase with more
/// failures than successes; a pause separates phases otherwise.
pub async fn run_ladder(
    levels: &[usize],
    pause: Duration,
    settings: Arc<AttemptSettings>,
    observer: &mut dyn PhaseObserver,
) -> Vec<PhaseResult> {
    let mut results = Vec::with_capacity(levels.len());

    for &connections in levels {
        let kind = PhaseKind::Concurrency(connections);
        info!("Starting {kind}");
        observer.phase_started(kind);
        let result = run_concurrency_phase(connections, settings.clone()).await;
        observer.phase_finished(&result);

        let saturated = result.saturated();
        results.push(result);

        if saturated {
            warn!("More failures than successes at {connections} connections. Stopping.");
            observer.saturated(kind);
            break;
        }

        if !pause.is_zero() {
            tokio::time::sleep(pause).await;
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use sockstress_core::{Credentials, Target};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Answers every handshake with the given auth status until `accept_ok`
    /// connections have been accepted, then rejects the rest.
    async fn handshake_server(accept_ok: usize) -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            let mut accepted = 0;
            loop {
                let Ok((mut socket, _)) = listener.accept().await else {
                    break;
                };
                let status = if accepted < accept_ok { 0x00 } else { 0x01 };
                accepted += 1;
                tokio::spawn(async move {
                    let mut buf = [0u8; 3];
                    socket.read_exact(&mut buf).await?;
                    socket.write_all(&[0x05, 0x02]).await?;
                    let mut buf = [0u8; 64];
                    let _ = socket.read(&mut buf).await?;
                    socket.write_all(&[0x01, status]).await?;
                    let mut rest = Vec::new();
                    socket.read_to_end(&mut rest).await?;
                    Ok::<_, std::io::Error>(())
                });
            }
        });
        port
    }

    fn settings(port: u16) -> Arc<AttemptSettings> {
        Arc::new(AttemptSettings {
            target: Target::new("127.0.0.1", port),
            credentials: Credentials::default(),
            connect_timeout: Duration::from_secs(5),
            dwell: Duration::from_millis(10),
        })
    }

    #[derive(Default)]
    struct Recorder {
        started: Vec<PhaseKind>,
        finished: usize,
        saturated: Option<PhaseKind>,
    }

    impl PhaseObserver for Recorder {
        fn phase_started(&mut self, kind: PhaseKind) {
            self.started.push(kind);
        }

        fn phase_finished(&mut self, _result: &PhaseResult) {
            self.finished += 1;
        }

        fn saturated(&mut self, kind: PhaseKind) {
            self.saturated = Some(kind);
        }
    }

    #[tracing_test::traced_test]
    #[tokio::test(flavor = "multi_thread")]
    async fn totals_match_requested() {
        let port = handshake_server(usize::MAX).await;

        let result = run_concurrency_phase(25, settings(port)).await;

        assert_eq!(result.kind(), PhaseKind::Concurrency(25));
        assert_eq!(result.total(), 25);
        assert_eq!(result.success(), 25);
        assert_eq!(result.latencies().len(), 25);
        let stats = result.latency_stats().unwrap();
        assert!(stats.min <= stats.mean && stats.mean <= stats.max);
        assert!(logs_contain("25 concurrent connections: 25 succeeded, 0 failed"));
        assert!(logs_contain("Latency mean="));
    }

    #[tokio::test]
    async fn zero_connections() {
        let result = run_concurrency_phase(0, settings(1)).await;
        assert_eq!(result.total(), 0);
        assert!(result.rate().is_finite());
        assert!(!result.saturated());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ladder_stops_after_saturation() {
        // 5 + 10 succeed, then the 20 phase sees only rejections.
        let port = handshake_server(15).await;
        let mut recorder = Recorder::default();

        let results = run_ladder(
            &[5, 10, 20, 40],
            Duration::from_millis(10),
            settings(port),
            &mut recorder,
        )
        .await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].success(), 5);
        assert_eq!(results[1].success(), 10);
        assert_eq!(results[2].failure(), 20);
        assert_eq!(recorder.started.len(), 3);
        assert_eq!(recorder.finished, 3);
        assert_eq!(recorder.saturated, Some(PhaseKind::Concurrency(20)));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn ladder_runs_every_level_when_healthy() {
        let port = handshake_server(usize::MAX).await;
        let mut recorder = Recorder::default();

        let results = run_ladder(&[1, 2, 3], Duration::ZERO, settings(port), &mut recorder).await;

        assert_eq!(results.len(), 3);
        assert!(results.iter().all(|r| !r.saturated()));
        assert_eq!(recorder.saturated, None);
    }
}

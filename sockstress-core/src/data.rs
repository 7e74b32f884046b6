use crate::stats::LatencyStats;
use std::fmt;
use std::time::Duration;

/// Why a single attempt failed. Only used for tracing; phase counters treat
/// every failure the same.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Connect,
    Timeout,
    Protocol,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FailureKind::Connect => "connect",
            FailureKind::Timeout => "timeout",
            FailureKind::Protocol => "protocol",
        };
        f.write_str(s)
    }
}

/// Result of one connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionOutcome {
    /// Handshake completed. `elapsed` spans connect through the auth reply.
    Success { elapsed: Duration },
    Failure(FailureKind),
}

impl ConnectionOutcome {
    pub fn succeeded(&self) -> bool {
        matches!(self, ConnectionOutcome::Success { .. })
    }

    pub fn elapsed(&self) -> Option<Duration> {
        match self {
            ConnectionOutcome::Success { elapsed } => Some(*elapsed),
            ConnectionOutcome::Failure(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseKind {
    /// N simultaneous attempts.
    Concurrency(usize),
    /// Back-to-back attempts from a worker pool for a fixed duration.
    SustainedThroughput(Duration),
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PhaseKind::Concurrency(n) => write!(f, "{n} concurrent connections"),
            PhaseKind::SustainedThroughput(d) => {
                write!(f, "sustained throughput for {}", humantime::format_duration(*d))
            }
        }
    }
}

/// Summary of one completed load phase.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseResult {
    kind: PhaseKind,
    success: u64,
    failure: u64,
    elapsed: Duration,
    latencies: Vec<Duration>,
}

impl PhaseResult {
    pub fn new(
        kind: PhaseKind,
        success: u64,
        failure: u64,
        elapsed: Duration,
        latencies: Vec<Duration>,
    ) -> Self {
        Self {
            kind,
            success,
            failure,
            elapsed,
            latencies,
        }
    }

    pub fn kind(&self) -> PhaseKind {
        self.kind
    }

    pub fn success(&self) -> u64 {
        self.success
    }

    pub fn failure(&self) -> u64 {
        self.failure
    }

    pub fn total(&self) -> u64 {
        self.success + self.failure
    }

    /// Wall clock time of the whole phase.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn latencies(&self) -> &[Duration] {
        &self.latencies
    }

    /// Successful handshakes per second of wall clock time. Zero when no time
    /// elapsed.
    pub fn rate(&self) -> f64 {
        per_second(self.success, self.elapsed)
    }

    /// Successes divided by the configured duration for sustained phases, or
    /// the wall clock rate for concurrency phases.
    pub fn throughput(&self) -> f64 {
        match self.kind {
            PhaseKind::SustainedThroughput(duration) => per_second(self.success, duration),
            PhaseKind::Concurrency(_) => self.rate(),
        }
    }

    /// More failures than successes. Strictly greater: an even split does not
    /// count.
    pub fn saturated(&self) -> bool {
        self.failure > self.success
    }

    pub fn latency_stats(&self) -> Option<LatencyStats> {
        LatencyStats::from_samples(&self.latencies)
    }
}

fn per_second(count: u64, over: Duration) -> f64 {
    let secs = over.as_secs_f64();
    if secs > 0. {
        count as f64 / secs
    } else {
        0.
    }
}

/// Every phase of a run, in the order it completed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunSummary {
    phases: Vec<PhaseResult>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, phase: PhaseResult) {
        self.phases.push(phase);
    }

    pub fn concurrency_phases(&self) -> impl Iterator<Item = &PhaseResult> {
        self.phases
            .iter()
            .filter(|p| matches!(p.kind, PhaseKind::Concurrency(_)))
    }

    pub fn sustained(&self) -> Option<&PhaseResult> {
        self.phases
            .iter()
            .rev()
            .find(|p| matches!(p.kind, PhaseKind::SustainedThroughput(_)))
    }

    /// Zero when no sustained phase ran.
    pub fn sustained_throughput(&self) -> f64 {
        self.sustained().map_or(0., PhaseResult::throughput)
    }

    /// The concurrency phase with the most successes. The earliest wins a tie.
    pub fn best_concurrency_phase(&self) -> Option<&PhaseResult> {
        self.concurrency_phases()
            .fold(None, |best: Option<&PhaseResult>, p| match best {
                Some(b) if b.success >= p.success => Some(b),
                _ => Some(p),
            })
    }

    pub fn max_concurrent_success(&self) -> u64 {
        self.best_concurrency_phase().map_or(0, PhaseResult::success)
    }
}

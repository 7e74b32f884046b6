//! Drives a complete stress run.
//!
//! A run probes the target once, walks the ascending concurrency ladder, then
//! runs the sustained throughput phase. Results are collected into a
//! [`RunSummary`] for reporting.
use crate::attempt::AttemptSettings;
use crate::cli::Cli;
use crate::concurrency::run_ladder;
use crate::error::StressError;
use crate::probe::probe;
use crate::sustained::run_sustained_phase;
use clap::Parser;
use sockstress_core::{PhaseKind, PhaseResult, RunSummary, StressConfig};
use std::sync::Arc;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};

/// Hooks called as phases progress. All methods default to doing nothing.
pub trait PhaseObserver: Send {
    fn probe_succeeded(&mut self, _config: &StressConfig) {}
    fn phase_started(&mut self, _kind: PhaseKind) {}
    fn phase_finished(&mut self, _result: &PhaseResult) {}
    fn saturated(&mut self, _kind: PhaseKind) {}
}

impl PhaseObserver for () {}

/// Stress harness for a SOCKS5 server.
///
/// # Example
///
/// ```no_run
/// use sockstress::Harness;
///
/// #[tokio::main]
/// async fn main() {
///     let harness = Harness::new().with_args().expect("invalid arguments");
///     let summary = harness.run(&mut ()).await.expect("server unavailable");
///     println!("{}", sockstress::report::render_report(&summary));
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Harness {
    config: StressConfig,
}

impl Harness {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: StressConfig) -> Self {
        Self { config }
    }

    /// Replace the configuration with one built from the process arguments.
    /// See [`Cli`] for the accepted flags.
    pub fn with_args(mut self) -> Result<Self, StressError> {
        self.config = Cli::parse().into_config()?;
        Ok(self)
    }

    pub fn config(&self) -> &StressConfig {
        &self.config
    }

    #[instrument(name = "sockstress", skip_all, fields(target = %self.config.target))]
    pub async fn run(&self, observer: &mut dyn PhaseObserver) -> Result<RunSummary, StressError> {
        self.config.validate()?;
        info!("Running with config {}", self.config);

        probe(&self.config.target, self.config.probe_timeout).await?;
        observer.probe_succeeded(&self.config);

        let settings = Arc::new(AttemptSettings::from_config(&self.config));
        let mut summary = RunSummary::new();

        for result in run_ladder(
            &self.config.concurrency_levels,
            self.config.phase_pause,
            settings.clone(),
            observer,
        )
        .await
        {
            summary.push(result);
        }

        let kind = PhaseKind::SustainedThroughput(self.config.sustained_duration);
        info!("Starting {kind}");
        observer.phase_started(kind);
        let sustained = run_sustained_phase(
            self.config.sustained_workers,
            self.config.sustained_duration,
            settings,
        )
        .await;
        observer.phase_finished(&sustained);
        summary.push(sustained);

        info!(
            "Run complete: max {} simultaneous, {:.1} conn/s sustained",
            summary.max_concurrent_success(),
            summary.sustained_throughput()
        );

        Ok(summary)
    }
}

#![doc = include_str!("../README.md")]

pub mod attempt;
pub mod cli;
pub mod concurrency;
pub mod counters;
pub mod handshake;
pub mod probe;
pub mod report;
pub mod runner;
pub mod sustained;

mod error;

pub use error::{HandshakeError, StressError};
pub use runner::{Harness, PhaseObserver};

pub mod prelude {
    pub use crate::attempt::{attempt, AttemptSettings};
    pub use crate::concurrency::{run_concurrency_phase, run_ladder};
    pub use crate::report::ConsoleObserver;
    pub use crate::runner::{Harness, PhaseObserver};
    pub use crate::sustained::run_sustained_phase;
    pub use crate::StressError;

    pub use sockstress_core::{
        ConnectionOutcome, Credentials, LatencyStats, PhaseKind, PhaseResult, RunSummary,
        StressConfig, Target,
    };
}

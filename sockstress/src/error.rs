use sockstress_core::{ConfigError, FailureKind, Target};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a stress run.
#[derive(Debug, Error)]
pub enum StressError {
    #[error("Service not available at {target}: {source}")]
    ServiceUnavailable {
        target: Target,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Unable to write report to {path}: {source}")]
    Report {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a handshake did not complete. Never leaves the attempt unit.
#[derive(Debug, Error)]
pub enum HandshakeError {
    #[error("Socket error during handshake: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unexpected method reply {0:#04x} {1:#04x}")]
    MethodRejected(u8, u8),

    #[error("Authentication rejected with status {0:#04x}")]
    AuthRejected(u8),

    #[error("Handshake timed out")]
    Timeout,
}

impl HandshakeError {
    pub fn kind(&self) -> FailureKind {
        match self {
            HandshakeError::Timeout => FailureKind::Timeout,
            _ => FailureKind::Protocol,
        }
    }
}

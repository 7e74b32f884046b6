//! A single connection attempt: connect, handshake, dwell, close.
use crate::error::HandshakeError;
use crate::handshake::negotiate;
use sockstress_core::{ConnectionOutcome, Credentials, FailureKind, StressConfig, Target};
use std::time::{Duration, Instant};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::time::timeout;
#[allow(unused)]
use tracing::{debug, trace};

/// Read-only settings shared by every attempt of a run.
#[derive(Clone, Debug)]
pub struct AttemptSettings {
    pub target: Target,
    pub credentials: Credentials,
    /// Applies to the TCP connect and, separately, to the handshake.
    pub connect_timeout: Duration,
    pub dwell: Duration,
}

impl AttemptSettings {
    pub fn from_config(config: &StressConfig) -> Self {
        Self {
            target: config.target.clone(),
            credentials: config.credentials.clone(),
            connect_timeout: config.connect_timeout,
            dwell: config.dwell,
        }
    }
}

/// Run one attempt against the target and classify it.
///
/// Never returns an error: every socket or protocol problem becomes
/// [`ConnectionOutcome::Failure`]. The reported latency runs from just before
/// the connect to just after the auth reply, so the dwell is not included.
pub async fn attempt(settings: &AttemptSettings) -> ConnectionOutcome {
    let outcome = run_attempt(settings).await;
    record_metrics(&outcome);
    outcome
}

async fn run_attempt(settings: &AttemptSettings) -> ConnectionOutcome {
    let start = Instant::now();
    let target = &settings.target;

    let connect = TcpStream::connect((target.host.as_str(), target.port));
    let mut stream = match timeout(settings.connect_timeout, connect).await {
        Ok(Ok(stream)) => stream,
        Ok(Err(err)) => {
            let kind = FailureKind::Connect;
            trace!(%kind, "Connect to {target} failed: {err}");
            return ConnectionOutcome::Failure(kind);
        }
        Err(_) => {
            let kind = FailureKind::Timeout;
            trace!(%kind, "Connect to {target} timed out");
            return ConnectionOutcome::Failure(kind);
        }
    };

    let handshake = timeout(
        settings.connect_timeout,
        negotiate(&mut stream, &settings.credentials),
    )
    .await
    .unwrap_or(Err(HandshakeError::Timeout));

    let outcome = match handshake {
        Ok(()) => {
            let elapsed = start.elapsed();
            tokio::time::sleep(settings.dwell).await;
            ConnectionOutcome::Success { elapsed }
        }
        Err(err) => {
            let kind = err.kind();
            trace!(%kind, "Handshake with {target} failed: {err}");
            ConnectionOutcome::Failure(kind)
        }
    };

    // The only close for a connected socket. Errors here do not change the outcome.
    let _ = stream.shutdown().await;
    drop(stream);

    outcome
}

#[cfg(feature = "metrics")]
fn record_metrics(outcome: &ConnectionOutcome) {
    match outcome {
        ConnectionOutcome::Success { elapsed } => {
            metrics::counter!("sockstress.handshake.success").increment(1);
            metrics::histogram!("sockstress.handshake.latency").record(elapsed.as_nanos() as f64);
        }
        ConnectionOutcome::Failure(kind) => {
            metrics::counter!("sockstress.handshake.failure", "kind" => kind.to_string()).increment(1);
        }
    }
}

#[cfg(not(feature = "metrics"))]
fn record_metrics(_outcome: &ConnectionOutcome) {}

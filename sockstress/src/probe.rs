//! One-shot reachability check run before any load phase.
use crate::error::StressError;
use sockstress_core::Target;
use std::io;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument};

/// Open and immediately close one TCP connection. No handshake is attempted.
#[instrument(skip_all, fields(target = %target))]
pub async fn probe(target: &Target, probe_timeout: Duration) -> Result<(), StressError> {
    let connect = TcpStream::connect((target.host.as_str(), target.port));
    let source = match timeout(probe_timeout, connect).await {
        Ok(Ok(stream)) => {
            drop(stream);
            debug!("Target is reachable");
            return Ok(());
        }
        Ok(Err(err)) => err,
        Err(_) => io::Error::new(
            io::ErrorKind::TimedOut,
            format!(
                "no connection within {}",
                humantime::format_duration(probe_timeout)
            ),
        ),
    };

    Err(StressError::ServiceUnavailable {
        target: target.clone(),
        source,
    })
}

//! Shared helpers for the integration tests.
use mock_service::prelude::*;
use sockstress::attempt::AttemptSettings;
use sockstress_core::{Credentials, StressConfig, Target};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Start a mock server on an ephemeral port.
pub async fn spawn_mock(config: MockConfig) -> anyhow::Result<(SocketAddr, Arc<MockStats>)> {
    let service = MockService::bind("127.0.0.1:0".parse()?, config).await?;
    let addr = service.local_addr()?;
    let stats = service.stats();
    tokio::spawn(service.serve());
    Ok((addr, stats))
}

/// A port nothing listens on.
pub fn closed_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Configuration pointed at `addr` with short pauses and timeouts.
pub fn config_for(addr: SocketAddr) -> StressConfig {
    StressConfig {
        target: Target::new(addr.ip().to_string(), addr.port()),
        credentials: Credentials::default(),
        connect_timeout: Duration::from_secs(5),
        probe_timeout: Duration::from_secs(1),
        phase_pause: Duration::from_millis(20),
        ..Default::default()
    }
}

pub fn settings_for(addr: SocketAddr) -> Arc<AttemptSettings> {
    Arc::new(AttemptSettings::from_config(&config_for(addr)))
}

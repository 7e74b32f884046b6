use std::time::Duration;

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 1080;

pub const DEFAULT_USERNAME: &str = "testuser";
pub const DEFAULT_PASSWORD: &str = "testpass123";

/// Bounds both the TCP connect and the handshake reads of a single attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout used by the one-shot availability probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// How long an authenticated connection is held open before closing.
pub const DEFAULT_DWELL: Duration = Duration::from_millis(100);

pub const DEFAULT_CONCURRENCY_LEVELS: [usize; 7] = [10, 50, 100, 200, 500, 750, 1000];

pub const DEFAULT_SUSTAINED_WORKERS: usize = 50;
pub const DEFAULT_SUSTAINED_DURATION: Duration = Duration::from_secs(5);

/// Pause between concurrency phases.
pub const DEFAULT_PHASE_PAUSE: Duration = Duration::from_secs(1);

pub const DEFAULT_REPORT_PATH: &str = "stress_results.txt";

/// Username and password lengths are encoded as a single byte on the wire.
pub const MAX_CREDENTIAL_LEN: usize = u8::MAX as usize;

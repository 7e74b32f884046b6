use clap::Parser;
use sockstress_core::{
    ConfigError, Credentials, StressConfig, Target, DEFAULT_CONCURRENCY_LEVELS, DEFAULT_HOST,
    DEFAULT_PASSWORD, DEFAULT_PORT, DEFAULT_REPORT_PATH, DEFAULT_SUSTAINED_WORKERS,
    DEFAULT_USERNAME,
};
use std::path::PathBuf;
use std::time::Duration;

/// Command line flags of the `sockstress` binary.
///
/// Durations accept human readable values such as `100ms`, `2s` or `1m`.
///
/// ```ignore
/// $ sockstress -p 1080 -U testuser -P testpass123
/// $ sockstress --levels 10,100,1000 --workers 20 --duration 30s
/// ```
#[derive(Parser, Debug)]
#[command(name = "sockstress", version, about = "Stress test a SOCKS5 server's username/password handshake")]
pub struct Cli {
    /// Host of the SOCKS5 server
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    #[arg(short, long, default_value_t = DEFAULT_PORT)]
    port: u16,

    #[arg(short = 'U', long, default_value = DEFAULT_USERNAME)]
    username: String,

    #[arg(short = 'P', long, default_value = DEFAULT_PASSWORD)]
    password: String,

    /// Timeout for each connect and, separately, each handshake
    #[arg(long, value_parser = humantime::parse_duration, default_value = "10s")]
    connect_timeout: Duration,

    /// Timeout of the availability probe
    #[arg(long, value_parser = humantime::parse_duration, default_value = "2s")]
    probe_timeout: Duration,

    /// How long to hold each authenticated connection open
    #[arg(long, value_parser = humantime::parse_duration, default_value = "100ms")]
    dwell: Duration,

    /// Ascending concurrency levels, comma separated
    #[arg(short = 'c', long, value_delimiter = ',', default_values_t = DEFAULT_CONCURRENCY_LEVELS)]
    levels: Vec<usize>,

    /// Workers in the sustained throughput phase
    #[arg(short, long, default_value_t = DEFAULT_SUSTAINED_WORKERS)]
    workers: usize,

    /// Length of the sustained throughput phase
    #[arg(short, long, value_parser = humantime::parse_duration, default_value = "5s")]
    duration: Duration,

    /// Pause between concurrency phases
    #[arg(long, value_parser = humantime::parse_duration, default_value = "1s")]
    pause: Duration,

    /// Where to write the plain text report
    #[arg(short, long, default_value = DEFAULT_REPORT_PATH)]
    output: PathBuf,
}

impl Cli {
    pub fn into_config(self) -> Result<StressConfig, ConfigError> {
        let config = StressConfig {
            target: Target::new(self.host, self.port),
            credentials: Credentials::new(self.username, self.password)?,
            connect_timeout: self.connect_timeout,
            probe_timeout: self.probe_timeout,
            dwell: self.dwell,
            concurrency_levels: self.levels,
            sustained_workers: self.workers,
            sustained_duration: self.duration,
            phase_pause: self.pause,
            report_path: self.output,
        };
        config.validate()?;
        Ok(config)
    }
}

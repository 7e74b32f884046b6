use crate::constants::*;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{field} is {len} bytes long; at most 255 bytes fit in the handshake")]
    CredentialTooLong { field: &'static str, len: usize },

    #[error("{0} must not be empty")]
    EmptyCredential(&'static str),

    #[error("Concurrency levels must be strictly ascending and non-zero, found {0:?}")]
    LevelsNotAscending(Vec<usize>),

    #[error("Sustained throughput phase needs at least one worker")]
    NoWorkers,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),
}

/// Address of the proxy under test.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_PORT)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Username/password pair for the RFC 1929 sub-negotiation.
///
/// Each field is sent with a one byte length prefix, so construction fails for
/// values longer than 255 bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self, ConfigError> {
        let username = username.into();
        let password = password.into();
        check_field("username", &username)?;
        check_field("password", &password)?;
        Ok(Self { username, password })
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }
}

impl Default for Credentials {
    fn default() -> Self {
        Self {
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
        }
    }
}

// Keep the password out of logs.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

fn check_field(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        Err(ConfigError::EmptyCredential(field))
    } else if value.len() > MAX_CREDENTIAL_LEN {
        Err(ConfigError::CredentialTooLong {
            field,
            len: value.len(),
        })
    } else {
        Ok(())
    }
}

/// Full configuration of a stress run. Fixed at startup.
#[derive(Clone, Debug)]
pub struct StressConfig {
    pub target: Target,
    pub credentials: Credentials,
    pub connect_timeout: Duration,
    pub probe_timeout: Duration,
    pub dwell: Duration,
    pub concurrency_levels: Vec<usize>,
    pub sustained_workers: usize,
    pub sustained_duration: Duration,
    pub phase_pause: Duration,
    pub report_path: PathBuf,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            target: Target::default(),
            credentials: Credentials::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            dwell: DEFAULT_DWELL,
            concurrency_levels: DEFAULT_CONCURRENCY_LEVELS.to_vec(),
            sustained_workers: DEFAULT_SUSTAINED_WORKERS,
            sustained_duration: DEFAULT_SUSTAINED_DURATION,
            phase_pause: DEFAULT_PHASE_PAUSE,
            report_path: PathBuf::from(DEFAULT_REPORT_PATH),
        }
    }
}

impl StressConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ascending = self.concurrency_levels.first().map_or(true, |l| *l > 0)
            && self.concurrency_levels.windows(2).all(|w| w[0] < w[1]);
        if !ascending {
            return Err(ConfigError::LevelsNotAscending(
                self.concurrency_levels.clone(),
            ));
        }

        if self.sustained_workers == 0 {
            return Err(ConfigError::NoWorkers);
        }

        if self.sustained_duration.is_zero() {
            return Err(ConfigError::ZeroDuration("sustained duration"));
        }

        if self.connect_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("connect timeout"));
        }

        if self.probe_timeout.is_zero() {
            return Err(ConfigError::ZeroDuration("probe timeout"));
        }

        Ok(())
    }
}

impl fmt::Display for StressConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "target={} user={} levels={:?} workers={} duration={} dwell={} timeout={}",
            self.target,
            self.credentials.username(),
            self.concurrency_levels,
            self.sustained_workers,
            humantime::format_duration(self.sustained_duration),
            humantime::format_duration(self.dwell),
            humantime::format_duration(self.connect_timeout),
        )
    }
}

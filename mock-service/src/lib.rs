//! A mock SOCKS5 server that only speaks the method negotiation and the
//! username/password sub-negotiation.
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use rand::Rng;
use std::collections::HashMap;
use std::io;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
#[allow(unused)]
use tracing::{debug, info, trace};

pub mod prelude {
    pub use crate::{Behavior, MockConfig, MockService, MockStats};
}

const SOCKS_VERSION: u8 = 0x05;
const METHOD_USERNAME_PASSWORD: u8 = 0x02;
const METHOD_NO_ACCEPTABLE: u8 = 0xFF;
const AUTH_VERSION: u8 = 0x01;
const AUTH_SUCCESS: u8 = 0x00;
const AUTH_FAILURE: u8 = 0x01;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Known credentials authenticate.
    Accept,
    /// Every authentication attempt fails.
    RejectAuth,
    /// Replies `05 FF` to the method negotiation.
    RejectMethod,
    /// Known credentials authenticate while the rate limiter has capacity.
    Limited(NonZeroU32),
    /// Accepts the connection and never answers.
    Silent,
}

#[derive(Debug, Clone)]
pub struct MockConfig {
    pub behavior: Behavior,
    pub users: HashMap<String, String>,
    /// Delay before answering the method negotiation.
    pub delay: Duration,
    /// Uniform random extra delay on top of `delay`.
    pub jitter: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self::new(Behavior::Accept)
    }
}

impl MockConfig {
    pub fn new(behavior: Behavior) -> Self {
        Self {
            behavior,
            users: HashMap::from([("testuser".to_string(), "testpass123".to_string())]),
            delay: Duration::ZERO,
            jitter: Duration::ZERO,
        }
    }

    pub fn user(mut self, username: &str, password: &str) -> Self {
        self.users.insert(username.to_string(), password.to_string());
        self
    }

    pub fn delay(mut self, delay: Duration, jitter: Duration) -> Self {
        self.delay = delay;
        self.jitter = jitter;
        self
    }
}

/// Counts of what the server has seen since it started.
#[derive(Debug, Default)]
pub struct MockStats {
    connections: AtomicU64,
    authenticated: AtomicU64,
    rejected: AtomicU64,
}

impl MockStats {
    pub fn connections(&self) -> u64 {
        self.connections.load(Ordering::Relaxed)
    }

    pub fn authenticated(&self) -> u64 {
        self.authenticated.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }
}

struct State {
    config: MockConfig,
    limiter: Option<DefaultDirectRateLimiter>,
    stats: Arc<MockStats>,
}

pub struct MockService {
    listener: TcpListener,
    state: Arc<State>,
}

impl MockService {
    pub async fn bind(addr: SocketAddr, config: MockConfig) -> io::Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let limiter = match config.behavior {
            Behavior::Limited(tps) => Some(RateLimiter::direct(Quota::per_second(tps))),
            _ => None,
        };
        Ok(Self {
            listener,
            state: Arc::new(State {
                config,
                limiter,
                stats: Arc::new(MockStats::default()),
            }),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn stats(&self) -> Arc<MockStats> {
        self.state.stats.clone()
    }

    pub async fn serve(self) -> io::Result<()> {
        info!(
            "Mock SOCKS5 server listening on {} ({:?})",
            self.listener.local_addr()?,
            self.state.config.behavior
        );
        loop {
            let (stream, peer) = self.listener.accept().await?;
            let state = self.state.clone();
            tokio::spawn(async move {
                if let Err(err) = handle(stream, &state).await {
                    trace!("Connection from {peer} ended with error: {err}");
                }
            });
        }
    }
}

/// Bind `addr` and serve until the listener fails.
pub async fn run(addr: SocketAddr, config: MockConfig) -> io::Result<()> {
    MockService::bind(addr, config).await?.serve().await
}

async fn handle(mut stream: TcpStream, state: &State) -> io::Result<()> {
    state.stats.connections.fetch_add(1, Ordering::Relaxed);
    CPS_MEASURE.fetch_add(1, Ordering::Relaxed);
    let config = &state.config;

    if config.behavior == Behavior::Silent {
        return hold(&mut stream).await;
    }

    let mut header = [0u8; 2];
    stream.read_exact(&mut header).await?;
    if header[0] != SOCKS_VERSION {
        debug!("Invalid SOCKS version {:#04x}", header[0]);
        return Ok(());
    }
    let mut methods = vec![0u8; header[1] as usize];
    stream.read_exact(&mut methods).await?;

    let delay = handshake_delay(config);
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    if config.behavior == Behavior::RejectMethod || !methods.contains(&METHOD_USERNAME_PASSWORD) {
        state.stats.rejected.fetch_add(1, Ordering::Relaxed);
        stream
            .write_all(&[SOCKS_VERSION, METHOD_NO_ACCEPTABLE])
            .await?;
        return Ok(());
    }
    stream
        .write_all(&[SOCKS_VERSION, METHOD_USERNAME_PASSWORD])
        .await?;

    let mut ver_ulen = [0u8; 2];
    stream.read_exact(&mut ver_ulen).await?;
    let mut username = vec![0u8; ver_ulen[1] as usize];
    stream.read_exact(&mut username).await?;
    let mut plen = [0u8; 1];
    stream.read_exact(&mut plen).await?;
    let mut password = vec![0u8; plen[0] as usize];
    stream.read_exact(&mut password).await?;

    let known = ver_ulen[0] == AUTH_VERSION
        && config
            .users
            .get(&*String::from_utf8_lossy(&username))
            .is_some_and(|p| p.as_bytes() == password.as_slice());

    let authenticated = match config.behavior {
        Behavior::Accept => known,
        Behavior::Limited(_) => known && state.limiter.as_ref().map_or(true, |l| l.check().is_ok()),
        _ => false,
    };

    if authenticated {
        // Counted before replying so the client never observes a stale count.
        state.stats.authenticated.fetch_add(1, Ordering::Relaxed);
        stream.write_all(&[AUTH_VERSION, AUTH_SUCCESS]).await?;
        hold(&mut stream).await
    } else {
        state.stats.rejected.fetch_add(1, Ordering::Relaxed);
        stream.write_all(&[AUTH_VERSION, AUTH_FAILURE]).await?;
        Ok(())
    }
}

fn handshake_delay(config: &MockConfig) -> Duration {
    if config.jitter.is_zero() {
        config.delay
    } else {
        let extra = rand::thread_rng().gen_range(0..=config.jitter.as_micros() as u64);
        config.delay + Duration::from_micros(extra)
    }
}

/// Keep the connection until the client closes it.
async fn hold(stream: &mut TcpStream) -> io::Result<()> {
    let mut buf = [0u8; 512];
    while stream.read(&mut buf).await? != 0 {}
    Ok(())
}

/** Connections per second printer **/

static CPS_MEASURE: AtomicU64 = AtomicU64::new(0);

pub async fn cps_measure_task() {
    loop {
        tokio::time::sleep(Duration::from_millis(1000)).await;
        let connections = CPS_MEASURE.swap(0, Ordering::Relaxed);
        info!("{connections} connections/s");
    }
}

use clap::{Parser, ValueEnum};
use mock_service::prelude::*;
use std::net::SocketAddr;
use std::num::NonZeroU32;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Accept,
    RejectAuth,
    RejectMethod,
    Limited,
    Silent,
}

#[derive(Parser, Debug)]
#[command(name = "mock-service", about = "Mock SOCKS5 username/password endpoint")]
struct Args {
    #[arg(short, long, default_value = "127.0.0.1:1080")]
    listen: SocketAddr,

    #[arg(short, long, value_enum, default_value_t = Mode::Accept)]
    mode: Mode,

    /// Successful authentications per second in `limited` mode
    #[arg(long, default_value_t = NonZeroU32::new(500).unwrap())]
    max_tps: NonZeroU32,

    /// Extra accepted users as `name:password`
    #[arg(short, long = "user")]
    users: Vec<String>,

    #[arg(long, value_parser = humantime::parse_duration, default_value = "0ms")]
    delay: Duration,

    #[arg(long, value_parser = humantime::parse_duration, default_value = "0ms")]
    jitter: Duration,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("mock_service=info"));
    FmtSubscriber::builder().with_env_filter(filter).init();

    let args = Args::parse();
    let behavior = match args.mode {
        Mode::Accept => Behavior::Accept,
        Mode::RejectAuth => Behavior::RejectAuth,
        Mode::RejectMethod => Behavior::RejectMethod,
        Mode::Limited => Behavior::Limited(args.max_tps),
        Mode::Silent => Behavior::Silent,
    };

    let mut config = MockConfig::new(behavior).delay(args.delay, args.jitter);
    for user in &args.users {
        let (name, password) = user
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("expected name:password, got {user}"))?;
        config = config.user(name, password);
    }

    tokio::task::spawn(async { mock_service::cps_measure_task().await });

    mock_service::run(args.listen, config).await?;
    Ok(())
}

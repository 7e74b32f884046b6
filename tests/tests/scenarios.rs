mod utils;
#[allow(unused)]
use utils::*;

use mock_service::prelude::*;
use sockstress::prelude::*;
use sockstress::probe::probe;
use sockstress_tests::{closed_port, config_for, settings_for, spawn_mock};
use std::num::NonZeroU32;
use std::time::Duration;

#[tokio::test(flavor = "multi_thread")]
async fn always_succeeding_server() {
    init();
    let (addr, stats) = spawn_mock(MockConfig::new(Behavior::Accept)).await.unwrap();

    let result = run_concurrency_phase(10, settings_for(addr)).await;

    assert_eq!(result.success(), 10);
    assert_eq!(result.failure(), 0);
    assert_eq!(result.latencies().len(), 10);
    assert_eq!(stats.authenticated(), 10);

    let latency = result.latency_stats().unwrap();
    assert!(latency.min <= latency.mean && latency.mean <= latency.max);
    assert!(latency.std_dev.is_some());
}

#[tokio::test(flavor = "multi_thread")]
async fn rejecting_server_stops_the_ladder() {
    init();
    let (addr, stats) = spawn_mock(MockConfig::new(Behavior::RejectAuth)).await.unwrap();

    let results = run_ladder(
        &[10, 50, 100],
        Duration::from_millis(20),
        settings_for(addr),
        &mut (),
    )
    .await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].success(), 0);
    assert_eq!(results[0].failure(), 10);
    assert!(results[0].saturated());
    assert!(results[0].latency_stats().is_none());
    assert_eq!(stats.connections(), 10);
}

#[tokio::test(flavor = "multi_thread")]
async fn method_rejection_counts_as_failure() {
    init();
    let (addr, _) = spawn_mock(MockConfig::new(Behavior::RejectMethod)).await.unwrap();

    let result = run_concurrency_phase(5, settings_for(addr)).await;

    assert_eq!(result.success(), 0);
    assert_eq!(result.failure(), 5);
}

#[tokio::test(flavor = "multi_thread")]
async fn wrong_password_counts_as_failure() {
    init();
    let (addr, _) = spawn_mock(MockConfig::new(Behavior::Accept)).await.unwrap();
    let mut config = config_for(addr);
    config.credentials = Credentials::new("testuser", "nope").unwrap();
    let settings = std::sync::Arc::new(AttemptSettings::from_config(&config));

    let result = run_concurrency_phase(4, settings).await;

    assert_eq!(result.failure(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn silent_server_times_out() {
    init();
    let (addr, _) = spawn_mock(MockConfig::new(Behavior::Silent)).await.unwrap();
    let mut config = config_for(addr);
    config.connect_timeout = Duration::from_millis(200);
    let settings = std::sync::Arc::new(AttemptSettings::from_config(&config));

    let result = run_concurrency_phase(3, settings).await;

    assert_eq!(result.success(), 0);
    assert_eq!(result.failure(), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_runs_no_phase() {
    init();
    let port = closed_port().unwrap();
    let config = config_for(format!("127.0.0.1:{port}").parse().unwrap());

    let err = probe(&config.target, config.probe_timeout).await.unwrap_err();
    assert!(matches!(err, StressError::ServiceUnavailable { .. }));

    let res = Harness::from_config(config).run(&mut ()).await;
    assert!(matches!(res, Err(StressError::ServiceUnavailable { .. })));
}

#[tokio::test(flavor = "multi_thread")]
async fn rate_limited_server_saturates() {
    init();
    let tps = NonZeroU32::new(20).unwrap();
    let (addr, _) = spawn_mock(MockConfig::new(Behavior::Limited(tps))).await.unwrap();

    let results = run_ladder(&[5, 200, 400], Duration::ZERO, settings_for(addr), &mut ()).await;

    // The first burst fits in the quota, the second cannot.
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].success(), 5);
    assert!(results[1].saturated());
    assert_eq!(results[1].total(), 200);
}

#[test]
#[ntest::timeout(60_000)]
fn sustained_throughput_against_fast_server() {
    init();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .unwrap();

    runtime.block_on(async {
        let (addr, _) = spawn_mock(MockConfig::new(Behavior::Accept)).await.unwrap();
        let duration = Duration::from_secs(5);

        let result = run_sustained_phase(50, duration, settings_for(addr)).await;

        assert!(result.success() > 0);
        assert_eq!(result.total(), result.success() + result.failure());
        assert_eq!(result.latencies().len() as u64, result.success());
        let expected = result.success() as f64 / 5.;
        assert!((result.throughput() - expected).abs() < 1e-9);
        // Every worker finishes its in-flight attempt, nothing is cut short.
        assert!(result.elapsed() >= duration);
    });
}

use mock_service::prelude::*;
use sockstress::prelude::*;
use sockstress::report::{render_report, render_summary, write_report};
use sockstress_tests::{config_for, spawn_mock};
use std::time::Duration;

#[tracing_test::traced_test]
#[tokio::test(flavor = "multi_thread")]
async fn healthy_server_end_to_end() {
    let (addr, _) = spawn_mock(MockConfig::new(Behavior::Accept)).await.unwrap();
    let report_path = std::env::temp_dir().join(format!("sockstress-e2e-{}.txt", std::process::id()));

    let config = StressConfig {
        concurrency_levels: vec![2, 4, 8],
        sustained_workers: 3,
        sustained_duration: Duration::from_millis(500),
        dwell: Duration::from_millis(10),
        report_path: report_path.clone(),
        ..config_for(addr)
    };
    let harness = Harness::from_config(config);

    let summary = harness.run(&mut ConsoleObserver::default()).await.unwrap();

    assert_eq!(summary.concurrency_phases().count(), 3);
    for phase in summary.concurrency_phases() {
        if let PhaseKind::Concurrency(n) = phase.kind() {
            assert_eq!(phase.total(), n as u64);
            assert_eq!(phase.success(), n as u64);
        }
    }
    assert_eq!(summary.max_concurrent_success(), 8);

    let sustained = summary.sustained().unwrap();
    assert_eq!(
        sustained.kind(),
        PhaseKind::SustainedThroughput(Duration::from_millis(500))
    );
    assert!(sustained.success() > 0);
    assert_eq!(summary.sustained_throughput(), sustained.success() as f64 / 0.5);

    write_report(&harness.config().report_path, &summary).unwrap();
    let written = std::fs::read_to_string(&report_path).unwrap();
    let _ = std::fs::remove_file(&report_path);

    assert_eq!(written, render_report(&summary));
    assert!(written.starts_with("RESULTADOS PRUEBAS DE ESTRÉS\n"));
    assert!(written.contains("   8 conexiones: 8 éxito, 0 fallo, "));
    assert!(written.ends_with("3. MÁXIMO ALCANZADO: 8 conexiones simultáneas\n"));

    let console = render_summary(&summary);
    assert!(console.contains("Máx conexiones simultáneas exitosas: 8"));

    assert!(logs_contain("Run complete"));
    assert!(logs_contain("Starting 8 concurrent connections"));
    assert!(logs_contain("Starting sustained throughput for 500ms"));
}

#[tracing_test::traced_test]
#[tokio::test(flavor = "multi_thread")]
async fn rejecting_server_still_measures_throughput() {
    let (addr, _) = spawn_mock(MockConfig::new(Behavior::RejectAuth)).await.unwrap();

    let config = StressConfig {
        concurrency_levels: vec![10, 50],
        sustained_workers: 2,
        sustained_duration: Duration::from_millis(300),
        ..config_for(addr)
    };

    let summary = Harness::from_config(config).run(&mut ()).await.unwrap();

    // Only the first level ran before saturation.
    assert_eq!(summary.concurrency_phases().count(), 1);
    assert_eq!(summary.max_concurrent_success(), 0);
    assert_eq!(summary.sustained_throughput(), 0.);
    assert!(summary.sustained().unwrap().failure() > 0);

    let report = render_report(&summary);
    assert!(report.contains("   10 conexiones: 0 éxito, 10 fallo, 0.0/s\n"));
    assert!(report.contains("2. THROUGHPUT SOSTENIDO: 0.0 conn/s"));
}

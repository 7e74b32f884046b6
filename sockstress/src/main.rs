use sockstress::prelude::*;
use sockstress::report::{render_summary, write_report};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[tokio::main]
async fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sockstress=info"));
    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let harness = match Harness::new().with_args() {
        Ok(harness) => harness,
        Err(err) => {
            eprintln!("✗ {err}");
            return ExitCode::FAILURE;
        }
    };

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║         PRUEBAS DE ESTRÉS - SERVIDOR SOCKS5                 ║");
    println!("╚══════════════════════════════════════════════════════════════╝");

    let mut console = ConsoleObserver::default();
    let summary = match harness.run(&mut console).await {
        Ok(summary) => summary,
        Err(err @ StressError::ServiceUnavailable { .. }) => {
            let creds = &harness.config().credentials;
            eprintln!("\n✗ ERROR: {err}");
            eprintln!("  Ejecuta: ./socks5d -u {}:<password>", creds.username());
            return ExitCode::FAILURE;
        }
        Err(err) => {
            eprintln!("\n✗ ERROR: {err}");
            return ExitCode::FAILURE;
        }
    };

    print!("{}", render_summary(&summary));

    let path = &harness.config().report_path;
    if let Err(err) = write_report(path, &summary) {
        eprintln!("\n✗ ERROR: {err}");
        return ExitCode::FAILURE;
    }
    println!("\n✓ Resultados guardados en {}", path.display());

    ExitCode::SUCCESS
}

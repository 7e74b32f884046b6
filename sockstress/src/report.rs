//! Rendering of phase results: console output while the run progresses, the
//! final summary table, and the persisted plain text report.
//!
//! Everything here is a pure function of its inputs except [`write_report`]
//! and the printing done by [`ConsoleObserver`].
use crate::error::StressError;
use crate::runner::PhaseObserver;
use sockstress_core::{PhaseKind, PhaseResult, RunSummary, StressConfig};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

const RULE: &str = "══════════════════════════════════════════════════════════";

fn ms(dur: std::time::Duration) -> f64 {
    dur.as_secs_f64() * 1_000.
}

/// The persisted report.
pub fn render_report(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("RESULTADOS PRUEBAS DE ESTRÉS\n");
    out.push_str(&"=".repeat(50));
    out.push_str("\n\n");

    out.push_str("1. CONEXIONES SIMULTÁNEAS\n");
    for phase in summary.concurrency_phases() {
        if let PhaseKind::Concurrency(n) = phase.kind() {
            let _ = writeln!(
                out,
                "   {} conexiones: {} éxito, {} fallo, {:.1}/s",
                n,
                phase.success(),
                phase.failure(),
                phase.rate()
            );
        }
    }

    let _ = writeln!(
        out,
        "\n2. THROUGHPUT SOSTENIDO: {:.1} conn/s",
        summary.sustained_throughput()
    );
    let _ = writeln!(
        out,
        "\n3. MÁXIMO ALCANZADO: {} conexiones simultáneas",
        summary.max_concurrent_success()
    );
    out
}

pub fn write_report(path: &Path, summary: &RunSummary) -> Result<(), StressError> {
    std::fs::write(path, render_report(summary)).map_err(|source| StressError::Report {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Report written to {}", path.display());
    Ok(())
}

/// One row per concurrency phase.
pub fn render_table(summary: &RunSummary) -> String {
    let mut out = String::new();
    out.push_str("┌─────────────┬─────────┬─────────┬──────────┬────────────┐\n");
    out.push_str("│ Conexiones  │ Éxito   │ Fallo   │ Tiempo   │ Rate       │\n");
    out.push_str("├─────────────┼─────────┼─────────┼──────────┼────────────┤\n");
    for phase in summary.concurrency_phases() {
        if let PhaseKind::Concurrency(n) = phase.kind() {
            let _ = writeln!(
                out,
                "│ {:>11} │ {:>7} │ {:>7} │ {:>7.2}s │ {:>8.1}/s │",
                n,
                phase.success(),
                phase.failure(),
                phase.elapsed().as_secs_f64(),
                phase.rate()
            );
        }
    }
    out.push_str("└─────────────┴─────────┴─────────┴──────────┴────────────┘\n");
    out
}

/// Table plus conclusions, printed at the end of a run.
pub fn render_summary(summary: &RunSummary) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\n{RULE}\nRESUMEN DE RESULTADOS\n{RULE}\n");
    out.push_str(&render_table(summary));
    let _ = writeln!(out, "\nCONCLUSIONES:");
    let _ = writeln!(
        out,
        "   • Máx conexiones simultáneas exitosas: {}",
        summary.max_concurrent_success()
    );
    let _ = writeln!(
        out,
        "   • Throughput sostenido: {:.1} conexiones/segundo",
        summary.sustained_throughput()
    );
    out
}

/// Detailed block for a single finished phase.
pub fn render_phase(result: &PhaseResult) -> String {
    let mut out = String::new();
    match result.kind() {
        PhaseKind::Concurrency(n) => {
            let _ = writeln!(out, "  Conexiones exitosas:  {}/{}", result.success(), n);
            let _ = writeln!(out, "  Conexiones fallidas:  {}", result.failure());
            let _ = writeln!(out, "  Tiempo total:         {:.2}s", result.elapsed().as_secs_f64());
            let _ = writeln!(out, "  Conexiones/segundo:   {:.2}", result.rate());

            if let Some(stats) = result.latency_stats() {
                let _ = writeln!(out, "  Tiempo promedio:      {:.2}ms", ms(stats.mean));
                let _ = writeln!(out, "  Tiempo mínimo:        {:.2}ms", ms(stats.min));
                let _ = writeln!(out, "  Tiempo máximo:        {:.2}ms", ms(stats.max));
                if let Some(std) = stats.std_dev {
                    let _ = writeln!(out, "  Desviación estándar:  {:.2}ms", ms(std));
                }
            }
        }
        PhaseKind::SustainedThroughput(_) => {
            let _ = writeln!(out, "  Total conexiones:     {}", result.total());
            let _ = writeln!(out, "  Exitosas:             {}", result.success());
            let _ = writeln!(out, "  Fallidas:             {}", result.failure());
            let _ = writeln!(out, "  Throughput:           {:.2} conn/s", result.throughput());
        }
    }
    out
}

fn phase_header(kind: PhaseKind) -> String {
    let rule = "=".repeat(60);
    match kind {
        PhaseKind::Concurrency(n) => format!("\n{rule}\nTEST: {n} conexiones concurrentes\n{rule}"),
        PhaseKind::SustainedThroughput(d) => format!(
            "\n{rule}\nTEST: Throughput (duración: {})\n{rule}",
            humantime::format_duration(d)
        ),
    }
}

/// Prints progress to stdout as the run advances.
#[derive(Debug, Default)]
pub struct ConsoleObserver {
    in_ladder: bool,
}

impl PhaseObserver for ConsoleObserver {
    fn probe_succeeded(&mut self, config: &StressConfig) {
        println!("\n✓ Servidor detectado en {}", config.target);
    }

    fn phase_started(&mut self, kind: PhaseKind) {
        match kind {
            PhaseKind::Concurrency(_) if !self.in_ladder => {
                self.in_ladder = true;
                println!("\n{RULE}\nFASE 1: MÁXIMAS CONEXIONES SIMULTÁNEAS\n{RULE}");
            }
            PhaseKind::SustainedThroughput(_) => {
                println!("\n{RULE}\nFASE 2: THROUGHPUT SOSTENIDO\n{RULE}");
            }
            _ => {}
        }
        println!("{}", phase_header(kind));
    }

    fn phase_finished(&mut self, result: &PhaseResult) {
        print!("{}", render_phase(result));
    }

    fn saturated(&mut self, _kind: PhaseKind) {
        println!("\n⚠ Más del 50% de conexiones fallaron. Deteniendo.");
    }
}

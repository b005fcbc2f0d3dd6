//! Text rendering of experiment results. Nothing in the core depends on it.

use std::fmt::Write;
use std::time::Duration;

use crate::crash::CrashDistribution;
use crate::experiment::ExperimentAggregate;
use crate::monitor::MonitorReport;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Bytes → MiB, for display only.
pub fn to_megabytes(bytes: f64) -> f64 {
    bytes / BYTES_PER_MB
}

fn millis(d: Option<Duration>) -> String {
    d.map_or_else(|| "-".to_string(), |d| format!("{:.3}", d.as_secs_f64() * 1000.0))
}

/// Fsync latency per frequency.
pub fn render_latency(aggregate: &ExperimentAggregate) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>8} {:>10} {:>8} {:>14} {:>18} {:>14}",
        "fsync%", "interval", "flushes", "mean fsync ms", "fsync ms/session", "session ms"
    );
    for stats in aggregate.iter() {
        let _ = writeln!(
            out,
            "{:>8.1} {:>10} {:>8} {:>14} {:>18} {:>14}",
            stats.flush_frequency.as_percent(),
            stats.flush_interval.bytes(),
            stats.flush_count,
            millis(stats.mean_flush_duration),
            millis(stats.mean_flush_time_per_session),
            millis(stats.mean_total_duration),
        );
    }
    out
}

/// Expected data loss per frequency, in MB.
pub fn render_loss(title: &str, aggregate: &ExperimentAggregate) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title}");
    let _ = writeln!(
        out,
        "{:>8} {:>10} {:>8} {:>16}",
        "fsync%", "interval", "crashes", "mean loss MB"
    );
    for stats in aggregate.iter() {
        let loss = stats
            .mean_data_loss_bytes
            .map_or_else(|| "-".to_string(), |b| format!("{:.6}", to_megabytes(b)));
        let _ = writeln!(
            out,
            "{:>8.1} {:>10} {:>8} {:>16}",
            stats.flush_frequency.as_percent(),
            stats.flush_interval.bytes(),
            stats.crash_samples,
            loss,
        );
    }
    out
}

/// Loss tables for several distributions, one after another.
pub fn render_distributions(results: &[(CrashDistribution, ExperimentAggregate)]) -> String {
    results
        .iter()
        .map(|(kind, aggregate)| render_loss(&format!("{kind} distribution"), aggregate))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_monitor(report: &MonitorReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "writes: {} ({} bytes), fsyncs: {}",
        report.writes,
        report.bytes_written,
        report.flush_durations.len()
    );
    for d in &report.flush_durations {
        let _ = writeln!(out, "fsync() duration: {:.5} seconds", d.as_secs_f64());
    }
    if let Some(mean) = report.mean_flush_duration() {
        let _ = writeln!(out, "mean fsync() duration: {:.5} seconds", mean.as_secs_f64());
    }
    out
}

//! Console rendering of benchmark records. Formatting only.

use std::fmt::Write;
use std::time::Duration;

use crate::bench::BenchmarkRecord;
use crate::config::BenchConfig;
use crate::device::DeviceContext;
use crate::timing::{Stage, TimingBreakdown};

const RULE: &str = "========================================";
const TABLE_RULE: &str =
    "--------------------------------------------------------------------------------";

/// Picks the largest unit that keeps the value at or above one: integer
/// nanoseconds below 1µs, then µs, ms and s with two decimals.
pub fn format_duration(d: Duration) -> String {
    if d < Duration::from_micros(1) {
        format!("{} ns", d.as_nanos())
    } else if d < Duration::from_millis(1) {
        format!("{:.2} μs", d.as_secs_f64() * 1e6)
    } else if d < Duration::from_secs(1) {
        format!("{:.2} ms", d.as_secs_f64() * 1e3)
    } else {
        format!("{:.2} s", d.as_secs_f64())
    }
}

pub fn render_banner(config: &BenchConfig, device: &DeviceContext) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "MSM Performance Comparison: CPU vs GPU");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Degree range: 2^{} to 2^{}", config.min_degree, config.max_degree);
    let _ = writeln!(out, "Runs per test: {}", config.runs);
    let _ = writeln!(out, "Device: {device}");
    if config.detailed {
        let _ = writeln!(out, "Mode: Detailed timing breakdown");
    }
    if config.verify {
        let _ = writeln!(out, "Verification: CPU and GPU results compared once per size");
    }
    let _ = writeln!(out, "{RULE}");
    out
}

pub fn render_table_header() -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(out, "Results");
    let _ = writeln!(out, "{RULE}");
    let _ = writeln!(
        out,
        "{:<10} {:<15} {:<15} {:<15} {:<15}",
        "Degree", "Size", "CPU Time", "GPU Time", "Speedup"
    );
    let _ = writeln!(out, "{TABLE_RULE}");
    out
}

/// One table row; a failed correctness check is flagged at the end of it.
pub fn render_row(record: &BenchmarkRecord) -> String {
    let mut out = format!(
        "{:<10} {:<15} {:<15} {:<15} {:<15}",
        record.size.to_string(),
        record.size.size(),
        format_duration(record.cpu_avg),
        format_duration(record.gpu_avg),
        record.directed_speedup().to_string(),
    );
    if record.results_match == Some(false) {
        out.push_str(" RESULT MISMATCH");
    }
    out.push('\n');
    out
}

/// Stage-by-stage share of the total GPU time.
pub fn render_breakdown(breakdown: &TimingBreakdown) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "  GPU Timing Breakdown:");
    for stage in Stage::TIMED {
        let label = format!("{}:", stage.label());
        let _ = writeln!(
            out,
            "    {:<20}{} ({:.1}%)",
            label,
            format_duration(breakdown.get(stage)),
            breakdown.percent(stage)
        );
    }
    let _ = writeln!(out, "    {:<20}{}", "Total:", format_duration(breakdown.total));
    out
}

/// Row plus, when present, its breakdown.
pub fn render_record(record: &BenchmarkRecord, detailed: bool) -> String {
    let mut out = render_row(record);
    if let Some(breakdown) = record.breakdown.as_ref().filter(|_| detailed) {
        out.push_str(&render_breakdown(breakdown));
        out.push('\n');
    }
    out
}

pub fn render_footer() -> String {
    format!("{RULE}\n\nMSM comparison complete!\n")
}

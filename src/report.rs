//! Rendering of scan reports for the command line.

use std::fmt::Write;

use crate::types::ScanReport;

/// Human-readable result: one line per match, or a not-found notice.
pub fn render_text(report: &ScanReport) -> String {
    let mut out = String::new();

    if report.is_empty() {
        out.push_str("Nothing found.\n");
    } else {
        let _ = writeln!(
            out,
            "Found {} symbol(s) with pattern '{}' on {}:",
            report.match_count(),
            report.request.pattern,
            report.request.timeframe,
        );
        for m in &report.matches {
            let _ = writeln!(out, "- {m}");
        }
    }

    let _ = writeln!(out, "{}", summary_line(report));
    out
}

/// Counts line printed under the results.
pub fn summary_line(report: &ScanReport) -> String {
    let secs = (report.finished_at - report.started_at).num_milliseconds() as f64 / 1000.0;
    format!(
        "Scanned {} symbols in {secs:.1}s ({} evaluated, {} skipped, {} failed)",
        report.symbols_total, report.symbols_evaluated, report.symbols_skipped, report.symbols_failed,
    )
}

/// Pretty-printed JSON of the full report.
pub fn render_json(report: &ScanReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

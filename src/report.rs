//! Console rendering for send progress and results

use crate::sender::{BulkReport, Delivery, Progress};
use std::fmt::Write;

/// One progress line, e.g. `[2/4] Sent to 1555 (50%)`
pub fn progress_line(progress: &Progress<'_>) -> String {
    format!(
        "[{}/{}] {} {} ({:.0}%)",
        progress.completed,
        progress.total,
        if progress.success { "Sent to" } else { "Failed for" },
        progress.phone_number,
        progress.fraction() * 100.0
    )
}

/// Summary plus details for every failed recipient
pub fn render(report: &BulkReport) -> String {
    let mut out = String::new();
    let total = report.total();

    let _ = writeln!(out, "Sending complete: Results");
    let _ = writeln!(
        out,
        "Successfully sent messages: {}/{}",
        report.success_count(),
        total
    );

    if report.failure_count() > 0 {
        let _ = writeln!(
            out,
            "Failed to send messages: {}/{}",
            report.failure_count(),
            total
        );
        for failed in report.failures() {
            let _ = writeln!(out, "\nPhone: {}", failed.phone_number);
            let detail = match &failed.delivery {
                Delivery::Failed { error, details } => serde_json::json!({
                    "success": false,
                    "error": error,
                    "details": details,
                }),
                Delivery::Sent { response } => response.clone(),
            };
            let pretty = serde_json::to_string_pretty(&detail).unwrap_or_else(|_| detail.to_string());
            let _ = writeln!(out, "{}", pretty);
        }
    }

    out
}

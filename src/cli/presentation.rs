//! CLI presentation: plain-text and JSON renderings of run results.

use crate::autopilot::{GapOutcome, RunOutcome, ScanReport};
use crate::error::ApiError;
use crate::interaction::InteractionEntry;
use chrono::{TimeZone, Utc};

pub fn format_run_outcome(outcome: &RunOutcome) -> String {
    match outcome {
        RunOutcome::Busy => "Autopilot is busy with a previous run.".to_string(),
        RunOutcome::Disabled => {
            "Autopilot is disabled. Enable it in config or pass --force.".to_string()
        }
        RunOutcome::NotConfigured => {
            "Autopilot is not configured: set autopilot.config.target_boards and target_classes."
                .to_string()
        }
        RunOutcome::Aborted { error } => format!("Autopilot run aborted: {}", error),
        RunOutcome::Completed(report) => {
            let mut out = format!(
                "Scanned {} attempt(s), found {} gap(s).",
                report.attempts, report.gaps_found
            );
            if report.gaps_found > 0 {
                out.push_str(&format!(
                    "\nPublished: {}  Drafted: {}  No content: {}  Failed: {}",
                    report.batch.published,
                    report.batch.drafted,
                    report.batch.no_content,
                    report.batch.failed
                ));
                for outcome in &report.batch.outcomes {
                    out.push_str("\n  ");
                    out.push_str(&format_gap_outcome(outcome));
                }
            }
            out
        }
    }
}

fn format_gap_outcome(outcome: &GapOutcome) -> String {
    match outcome {
        GapOutcome::Published {
            content_key,
            quantity,
        } => format!("published {} ({})", content_key, quantity),
        GapOutcome::Drafted {
            content_key,
            quantity,
        } => format!("drafted   {} ({})", content_key, quantity),
        GapOutcome::NoContent { content_key } => format!("empty     {}", content_key),
        GapOutcome::Failed { content_key, error } => {
            format!("failed    {}: {}", content_key, error)
        }
    }
}

pub fn format_scan_text(report: &ScanReport) -> String {
    if report.gaps.is_empty() {
        return format!("No gaps found after {} attempt(s).", report.attempts);
    }
    let mut out = format!(
        "{} gap(s) found after {} attempt(s):",
        report.gaps.len(),
        report.attempts
    );
    for gap in &report.gaps {
        out.push_str(&format!("\n  {}\n    key: {}", gap, gap.content_key));
    }
    out
}

pub fn format_scan_json(report: &ScanReport) -> Result<String, ApiError> {
    serde_json::to_string_pretty(report)
        .map_err(|e| ApiError::ConfigError(format!("Failed to serialize scan: {}", e)))
}

pub fn format_history(entries: &[InteractionEntry]) -> String {
    if entries.is_empty() {
        return "No automated fills recorded.".to_string();
    }
    entries
        .iter()
        .map(|entry| {
            let when = Utc
                .timestamp_millis_opt(entry.timestamp_ms as i64)
                .single()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| entry.timestamp_ms.to_string());
            format!("{}  {}  {}", when, entry.response, entry.query)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

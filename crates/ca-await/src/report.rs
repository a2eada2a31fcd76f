//! Poll results as printed by the CLI

use anyhow::{Result, bail};
use availability::{Error, PollOutcome};
use clap::ValueEnum;
use comfy_table::{Cell, Color, Table};
use serde::Serialize;

/// Report format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON array
    Json,
}

/// Final state of one target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetStatus {
    /// Answered with a success status
    Ready,
    /// Failed, timed out or answered with an error status
    Unavailable,
    /// Interrupted before finishing
    Cancelled,
    /// Rejected before any request was issued
    Invalid,
}

/// Poll result for one target
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    /// Target name
    pub name: String,
    /// URL probed
    pub url: String,
    /// Final state
    pub status: TargetStatus,
    /// Time spent polling
    pub elapsed_ms: u64,
    /// Requests issued
    pub attempts: u32,
    /// Failure, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TargetReport {
    /// Build a report from a finished poll
    pub fn from_outcome(
        name: impl Into<String>,
        url: impl Into<String>,
        outcome: PollOutcome,
    ) -> Self {
        let status = match &outcome.last_error {
            None if outcome.succeeded => TargetStatus::Ready,
            Some(Error::Cancelled) => TargetStatus::Cancelled,
            Some(Error::Configuration(_)) => TargetStatus::Invalid,
            _ => TargetStatus::Unavailable,
        };

        Self {
            name: name.into(),
            url: url.into(),
            status,
            elapsed_ms: u64::try_from(outcome.elapsed.as_millis()).unwrap_or(u64::MAX),
            attempts: outcome.attempts,
            error: outcome.last_error.map(|e| e.to_string()),
        }
    }

    /// Report for a target whose probe could not be built
    pub fn from_error(name: impl Into<String>, url: impl Into<String>, error: &Error) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            status: TargetStatus::Invalid,
            elapsed_ms: 0,
            attempts: 0,
            error: Some(error.to_string()),
        }
    }

    /// Whether the target came online
    pub fn is_ready(&self) -> bool {
        self.status == TargetStatus::Ready
    }
}

/// Render reports as a table
pub fn render_table(reports: &[TargetReport]) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["TARGET", "STATUS", "ELAPSED", "ATTEMPTS", "URL", "ERROR"]);

    for report in reports {
        let (status_str, status_color) = match report.status {
            TargetStatus::Ready => ("ready", Color::Green),
            TargetStatus::Unavailable => ("unavailable", Color::Red),
            TargetStatus::Cancelled => ("cancelled", Color::Yellow),
            TargetStatus::Invalid => ("invalid", Color::Red),
        };

        table.add_row(vec![
            Cell::new(&report.name),
            Cell::new(status_str).fg(status_color),
            Cell::new(format!("{:.1}s", report.elapsed_ms as f64 / 1000.0)),
            Cell::new(report.attempts),
            Cell::new(&report.url),
            Cell::new(report.error.as_deref().unwrap_or("-")),
        ]);
    }

    table
}

/// Print reports in the requested format
pub fn print(reports: &[TargetReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_table(reports)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(reports)?),
    }
    Ok(())
}

/// Fail unless every target is ready
pub fn ensure_all_ready(reports: &[TargetReport]) -> Result<()> {
    let not_ready: Vec<&str> = reports
        .iter()
        .filter(|r| !r.is_ready())
        .map(|r| r.name.as_str())
        .collect();

    if !not_ready.is_empty() {
        bail!(
            "{} of {} target(s) not available: {}",
            not_ready.len(),
            reports.len(),
            not_ready.join(", ")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn outcome(succeeded: bool, error: Option<Error>) -> PollOutcome {
        PollOutcome {
            succeeded,
            elapsed: Duration::from_millis(1500),
            attempts: 2,
            last_error: error,
        }
    }

    #[test]
    fn test_status_from_outcome() {
        let ready =
            TargetReport::from_outcome("ca", "http://localhost/cainfo", outcome(true, None));
        assert_eq!(ready.status, TargetStatus::Ready);
        assert_eq!(ready.elapsed_ms, 1500);
        assert!(ready.error.is_none());

        let down = TargetReport::from_outcome(
            "ca",
            "http://localhost/cainfo",
            outcome(false, Some(Error::transport("connection refused"))),
        );
        assert_eq!(down.status, TargetStatus::Unavailable);
        assert_eq!(down.error.as_deref(), Some("Transport error: connection refused"));

        let cancelled = TargetReport::from_outcome(
            "ca",
            "http://localhost/cainfo",
            outcome(false, Some(Error::Cancelled)),
        );
        assert_eq!(cancelled.status, TargetStatus::Cancelled);
    }

    #[test]
    fn test_json_report() {
        let report =
            TargetReport::from_outcome("org1-ca", "http://localhost/cainfo", outcome(true, None));
        let json = serde_json::to_value(vec![report]).unwrap();
        assert_eq!(json[0]["name"], "org1-ca");
        assert_eq!(json[0]["status"], "ready");
        assert_eq!(json[0]["attempts"], 2);
        assert!(json[0].get("error").is_none());
    }

    #[test]
    fn test_ensure_all_ready() {
        let ready = TargetReport::from_outcome("a", "http://a/cainfo", outcome(true, None));
        assert!(ensure_all_ready(&[ready.clone()]).is_ok());

        let invalid =
            TargetReport::from_error("b", "not a url", &Error::configuration("Invalid endpoint"));
        let err = ensure_all_ready(&[ready, invalid]).unwrap_err();
        assert_eq!(err.to_string(), "1 of 2 target(s) not available: b");
    }

    #[test]
    fn test_table_lists_every_target() {
        let reports = vec![
            TargetReport::from_outcome("org1-ca", "http://a/cainfo", outcome(true, None)),
            TargetReport::from_outcome(
                "org2-ca",
                "http://b/cainfo",
                outcome(
                    false,
                    Some(Error::DeadlineExceeded {
                        deadline: Duration::from_secs(3),
                        attempts: 2,
                    }),
                ),
            ),
        ];
        let rendered = render_table(&reports).to_string();
        assert!(rendered.contains("org1-ca"));
        assert!(rendered.contains("ready"));
        assert!(rendered.contains("unavailable"));
    }
}

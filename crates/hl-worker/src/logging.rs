//! Per-run log.
//!
//! Every entry is kept in memory for the archived run log and mirrored to
//! `tracing` with the run's correlation fields, so the diagnostic stream
//! and the archived copy never diverge.

use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{error, info, warn, Span};

use hl_models::RunContext;

/// Severity of a run log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Info,
    Warn,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the run log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: DateTime<Utc>,
    pub severity: Severity,
    pub message: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.severity,
            self.message
        )
    }
}

/// Append-only, time-ordered log of one run.
#[derive(Debug, Clone)]
pub struct RunLog {
    run_id: String,
    league: String,
    date: String,
    records: Vec<LogRecord>,
}

impl RunLog {
    pub fn new(ctx: &RunContext) -> Self {
        Self {
            run_id: ctx.run_id.to_string(),
            league: ctx.league.clone(),
            date: ctx.date_str(),
            records: Vec::new(),
        }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        info!(run_id = %self.run_id, league = %self.league, date = %self.date, "{}", message);
        self.push(Severity::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        warn!(run_id = %self.run_id, league = %self.league, date = %self.date, "{}", message);
        self.push(Severity::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        error!(run_id = %self.run_id, league = %self.league, date = %self.date, "{}", message);
        self.push(Severity::Error, message);
    }

    fn push(&mut self, severity: Severity, message: String) {
        // Timestamps never go backwards, even if the wall clock does.
        let now = Utc::now();
        let timestamp = match self.records.last() {
            Some(last) if last.timestamp > now => last.timestamp,
            _ => now,
        };
        self.records.push(LogRecord {
            timestamp,
            severity,
            message,
        });
    }

    #[cfg(test)]
    pub fn records(&self) -> &[LogRecord] {
        &self.records
    }

    #[cfg(test)]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether any entry has the given message text.
    #[cfg(test)]
    pub fn contains(&self, needle: &str) -> bool {
        self.records.iter().any(|r| r.message.contains(needle))
    }

    /// The archived form: one `{timestamp} {LEVEL}: {message}` line per entry.
    pub fn render(&self) -> String {
        self.records.iter().map(|r| format!("{}\n", r)).collect()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.render().into_bytes()
    }

    /// Span carrying the run's correlation fields.
    pub fn create_span(&self) -> Span {
        tracing::info_span!(
            "pipeline_run",
            run_id = %self.run_id,
            league = %self.league,
            date = %self.date
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use hl_models::BucketSet;

    fn context() -> RunContext {
        RunContext::new(
            "Superettan",
            NaiveDate::from_ymd_opt(2024, 9, 1).unwrap(),
            "ap-south-1",
            BucketSet::default(),
        )
    }

    #[test]
    fn test_records_in_order_with_severity() {
        let mut log = RunLog::new(&context());
        log.info("Highlights fetched successfully");
        log.warn("METADATA_BUCKET not configured");
        log.error("Download failed");

        let severities: Vec<_> = log.records().iter().map(|r| r.severity).collect();
        assert_eq!(severities, vec![Severity::Info, Severity::Warn, Severity::Error]);
        assert!(log
            .records()
            .windows(2)
            .all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[test]
    fn test_render_line_format() {
        let mut log = RunLog::new(&context());
        log.info("Starting pipeline");
        log.error("HTTP error 503");

        let rendered = log.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(" INFO: Starting pipeline"));
        assert!(lines[1].ends_with(" ERROR: HTTP error 503"));
        // "YYYY-MM-DD HH:MM:SS" prefix
        assert_eq!(lines[0].find(" INFO"), Some(19));
        assert!(rendered.ends_with('\n'));
        assert_eq!(log.to_bytes(), rendered.into_bytes());
    }

    #[test]
    fn test_empty_log_renders_nothing() {
        let log = RunLog::new(&context());
        assert!(log.is_empty());
        assert_eq!(log.render(), "");
    }

    #[test]
    fn test_carries_run_id() {
        let ctx = context();
        let mut log = RunLog::new(&ctx);
        log.info("x");
        assert_eq!(log.run_id(), ctx.run_id.to_string());
        assert!(log.contains("x"));
        assert!(!log.contains("y"));
    }
}

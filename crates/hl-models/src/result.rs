//! Pipeline run results.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::transcode::TerminalStatus;

/// Overall outcome of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineStatus {
    Success,
    Failure { reason: String },
}

impl PipelineStatus {
    pub fn failure(reason: impl Into<String>) -> Self {
        PipelineStatus::Failure {
            reason: reason.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, PipelineStatus::Success)
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineStatus::Success => f.write_str("SUCCESS"),
            PipelineStatus::Failure { reason } => write!(f, "FAILURE({})", reason),
        }
    }
}

/// Transcode job id plus the terminal status the poller observed.
///
/// `status` is `None` when the job was submitted but polling failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeOutcome {
    pub job_id: String,
    pub status: Option<TerminalStatus>,
}

/// Final status of a run plus whatever it actually produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineResult {
    pub status: PipelineStatus,
    /// Key of the archived highlights document
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata_key: Option<String>,
    /// Key of the archived video
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_key: Option<String>,
    /// Transcode job, if one was submitted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transcode: Option<TranscodeOutcome>,
    /// Key of the archived run log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_key: Option<String>,
}

impl PipelineResult {
    pub fn new(status: PipelineStatus) -> Self {
        Self {
            status,
            metadata_key: None,
            video_key: None,
            transcode: None,
            log_key: None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// The transcode job id, if a job was submitted.
    pub fn transcode_job_id(&self) -> Option<&str> {
        self.transcode.as_ref().map(|t| t.job_id.as_str())
    }

    /// One-line summary for the run log.
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("status={}", self.status)];
        if let Some(key) = &self.metadata_key {
            parts.push(format!("metadata_key={}", key));
        }
        if let Some(key) = &self.video_key {
            parts.push(format!("video_key={}", key));
        }
        if let Some(t) = &self.transcode {
            let status = t.status.map_or("UNKNOWN", |s| s.as_str());
            parts.push(format!("transcode_job={} ({})", t.job_id, status));
        }
        parts.join(" ")
    }
}

//! Transcode provider abstraction.

use async_trait::async_trait;
use serde_json::Value;

use hl_models::TranscodeStatus;

use crate::error::TranscodeResult;
use crate::settings::JobSettings;

/// Point-in-time view of a remote job.
#[derive(Debug, Clone, PartialEq)]
pub struct JobSnapshot {
    pub status: TranscodeStatus,
    /// Provider fields worth keeping for diagnostics (error code, progress, ...)
    pub raw: Value,
}

impl JobSnapshot {
    pub fn new(status: TranscodeStatus) -> Self {
        Self {
            status,
            raw: Value::Null,
        }
    }
}

/// An asynchronous transcode job service.
#[async_trait]
pub trait TranscodeProvider: Send + Sync {
    /// Create a job running as `role_arn`; returns the provider job id.
    async fn create_job(&self, role_arn: &str, settings: &JobSettings) -> TranscodeResult<String>;

    /// Current state of `job_id`.
    async fn get_job(&self, job_id: &str) -> TranscodeResult<JobSnapshot>;
}

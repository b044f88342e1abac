//! Transcode error types.

use thiserror::Error;

/// Result type for transcode operations.
pub type TranscodeResult<T> = Result<T, TranscodeError>;

/// Errors that can occur while submitting or polling a transcode job.
#[derive(Debug, Error)]
pub enum TranscodeError {
    /// The job could not be created (bad request, endpoint lookup, provider rejection)
    #[error("Job submission failed: {0}")]
    Submission(String),

    /// A status query failed; the remote job may still be running
    #[error("Job status query failed for {job_id}: {message}")]
    Query { job_id: String, message: String },

    #[error("Endpoint discovery failed: {0}")]
    Endpoint(String),
}

impl TranscodeError {
    pub fn submission(msg: impl Into<String>) -> Self {
        Self::Submission(msg.into())
    }

    pub fn query(job_id: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Query {
            job_id: job_id.into(),
            message: msg.into(),
        }
    }

    pub fn endpoint(msg: impl Into<String>) -> Self {
        Self::Endpoint(msg.into())
    }
}

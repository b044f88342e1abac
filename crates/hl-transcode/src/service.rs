//! Transcode job lifecycle: submit, then poll to a terminal status.
//!
//! Observed state machine:
//!
//! ```text
//! SUBMITTED -> PROGRESSING* -> COMPLETE | ERROR | CANCELED
//!                  \
//!                   `-> TIMEOUT (poller gives up; remote job untouched)
//! ```

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use hl_models::{Rendition, TerminalStatus, TranscodeJob};

use crate::error::{TranscodeError, TranscodeResult};
use crate::provider::{JobSnapshot, TranscodeProvider};
use crate::retry::{retry_async, RetryConfig};
use crate::settings::JobSettings;

/// How a poll ended.
#[derive(Debug, Clone, PartialEq)]
pub struct PollOutcome {
    pub status: TerminalStatus,
    /// The last status query result
    pub last: JobSnapshot,
    /// Number of successful status queries made
    pub queries: u32,
    pub elapsed: Duration,
}

/// Submits transcode jobs and waits for them to finish.
#[derive(Clone)]
pub struct TranscodeJobService {
    provider: Arc<dyn TranscodeProvider>,
    query_retry: RetryConfig,
}

impl TranscodeJobService {
    pub fn new(provider: Arc<dyn TranscodeProvider>) -> Self {
        Self {
            provider,
            query_retry: RetryConfig::new("transcode_status_query"),
        }
    }

    /// Retry failing status queries up to `max_retries` times.
    ///
    /// With the default of zero, a failed query ends the poll immediately.
    pub fn with_query_retries(mut self, max_retries: u32) -> Self {
        self.query_retry = self.query_retry.with_max_retries(max_retries);
        self
    }

    /// Submit a job transcoding `input` into one output per rendition under `output_prefix`.
    pub async fn submit(
        &self,
        role_arn: &str,
        input: &str,
        output_prefix: &str,
        renditions: &[Rendition],
    ) -> TranscodeResult<TranscodeJob> {
        if role_arn.is_empty() {
            return Err(TranscodeError::submission("role ARN is empty"));
        }
        if renditions.is_empty() {
            return Err(TranscodeError::submission("no output renditions requested"));
        }

        let settings = JobSettings::file_group(input, output_prefix, renditions);
        debug!(
            settings = %serde_json::to_string(&settings).unwrap_or_default(),
            "Submitting transcode job"
        );

        let id = self.provider.create_job(role_arn, &settings).await?;
        info!(job_id = %id, input, output_prefix, "Transcode job submitted");

        Ok(TranscodeJob {
            id,
            input: input.to_string(),
            output_prefix: output_prefix.to_string(),
            role_arn: role_arn.to_string(),
            renditions: renditions.to_vec(),
        })
    }

    /// Query `job_id` every `interval` until it reaches a terminal status or
    /// `timeout` has elapsed.
    ///
    /// Timing out yields [`TerminalStatus::Timeout`] and does not cancel the
    /// remote job. A status query that still fails after the configured
    /// retries ends the poll with [`TranscodeError::Query`].
    pub async fn poll(
        &self,
        job_id: &str,
        interval: Duration,
        timeout: Duration,
    ) -> TranscodeResult<PollOutcome> {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut queries = 0u32;

        loop {
            let snapshot = self.query(job_id, deadline).await?;
            queries += 1;
            let elapsed = started.elapsed();

            if let Some(status) = snapshot.status.terminal() {
                info!(job_id, status = %status, queries, "Transcode job finished");
                return Ok(PollOutcome {
                    status,
                    last: snapshot,
                    queries,
                    elapsed,
                });
            }

            if elapsed >= timeout {
                warn!(
                    job_id,
                    last_status = %snapshot.status,
                    "Transcode job still running after {:?}, giving up",
                    timeout
                );
                return Ok(PollOutcome {
                    status: TerminalStatus::Timeout,
                    last: snapshot,
                    queries,
                    elapsed,
                });
            }

            debug!(job_id, status = %snapshot.status, "Transcode job not finished, waiting {:?}", interval);
            tokio::time::sleep(interval).await;
        }
    }

    async fn query(&self, job_id: &str, deadline: Instant) -> TranscodeResult<JobSnapshot> {
        retry_async(&self.query_retry, Some(deadline), || self.provider.get_job(job_id))
            .await
            .into_result()
    }
}

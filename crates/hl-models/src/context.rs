//! Per-run configuration snapshot.

use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::transcode::Rendition;

/// Destination buckets for one run.
///
/// A `None` bucket means the matching persistence step is skipped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketSet {
    /// Bucket for the raw highlights document
    pub metadata: Option<String>,
    /// Bucket for downloaded videos (and transcode outputs)
    pub video: Option<String>,
    /// Bucket for the archived run log
    pub log: Option<String>,
}

/// Settings for the optional transcode step.
///
/// Present on a [`RunContext`] only when transcoding was explicitly enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeOptions {
    /// Role the transcode provider assumes to read inputs and write outputs
    pub role_arn: String,
    /// Output renditions, one output per entry
    pub renditions: Vec<Rendition>,
    /// Spacing between status queries
    pub poll_interval: Duration,
    /// Ceiling on the total polling time
    pub poll_timeout: Duration,
    /// Retries of a failing status query before giving up
    pub query_retries: u32,
}

impl TranscodeOptions {
    /// Create options with the default renditions and polling schedule.
    pub fn new(role_arn: impl Into<String>) -> Self {
        Self {
            role_arn: role_arn.into(),
            renditions: Rendition::defaults(),
            poll_interval: Duration::from_secs(10),
            poll_timeout: Duration::from_secs(1800),
            query_retries: 0,
        }
    }
}

/// Immutable configuration for one pipeline execution.
///
/// Built once at run start and only ever borrowed by the orchestrator and
/// the components it drives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunContext {
    /// Correlation id for logs
    pub run_id: Uuid,
    /// League identifier passed to the highlights API
    pub league: String,
    /// Target calendar date
    pub date: NaiveDate,
    /// Cloud region for storage and transcoding
    pub region: String,
    /// Destination buckets
    pub buckets: BucketSet,
    /// Transcode settings; `None` skips the step
    pub transcode: Option<TranscodeOptions>,
}

impl RunContext {
    /// Create a context with a fresh run id.
    pub fn new(
        league: impl Into<String>,
        date: NaiveDate,
        region: impl Into<String>,
        buckets: BucketSet,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            league: league.into(),
            date,
            region: region.into(),
            buckets,
            transcode: None,
        }
    }

    /// Enable the transcode step.
    pub fn with_transcode(mut self, options: TranscodeOptions) -> Self {
        self.transcode = Some(options);
        self
    }

    /// Date formatted as `YYYY-MM-DD`, as used in API queries and keys.
    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

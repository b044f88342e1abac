//! Pipeline orchestration.
//!
//! Runs the steps in order against one [`RunContext`]:
//!
//! ```text
//! fetch -> persist metadata -> select -> download -> persist video -> transcode
//! ```
//!
//! Each step's failure is handled according to [`PipelineStep::policy`].
//! Whatever happens, the run log is written exactly once at the end (when a
//! log bucket is configured) and a [`PipelineResult`] is returned.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use futures::FutureExt;
use tempfile::TempDir;
use tracing::{error, info, warn, Instrument};

use hl_media::{select, HighlightsClient, HighlightsSource, HttpDownloader, VideoDownloader};
use hl_models::keys::{log_key, metadata_key, s3_uri, transcode_output_key_prefix, video_key};
use hl_models::{HighlightsDocument, PipelineResult, PipelineStatus, RunContext, TerminalStatus, TranscodeOutcome};
use hl_storage::BlobStore;
use hl_transcode::{MediaConvertProvider, TranscodeJobService};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineErrorResult, PipelineStep, StepPolicy};
use crate::logging::{LogRecord, RunLog, Severity};

const JSON_CONTENT_TYPE: &str = "application/json";
const VIDEO_CONTENT_TYPE: &str = "video/mp4";
const LOG_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// Drives one pipeline run over injected components.
#[derive(Clone)]
pub struct PipelineOrchestrator {
    source: Arc<dyn HighlightsSource>,
    downloader: Arc<dyn VideoDownloader>,
    store: Arc<dyn BlobStore>,
    transcoder: Option<TranscodeJobService>,
    work_dir: Option<PathBuf>,
}

impl PipelineOrchestrator {
    pub fn new(
        source: Arc<dyn HighlightsSource>,
        downloader: Arc<dyn VideoDownloader>,
        store: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            source,
            downloader,
            store,
            transcoder: None,
            work_dir: None,
        }
    }

    /// Build the production components described by `config`.
    pub async fn from_config(config: &PipelineConfig) -> PipelineErrorResult<Self> {
        let source = HighlightsClient::new(config.api.clone())?;
        let downloader = HttpDownloader::new(config.download_timeout)?;

        let store = config.storage.open(&config.region).await;

        let mut pipeline = Self::new(Arc::new(source), Arc::new(downloader), store);
        if let Some(options) = &config.transcode {
            let provider = Arc::new(MediaConvertProvider::new(config.region.clone()));
            pipeline = pipeline.with_transcoder(
                TranscodeJobService::new(provider).with_query_retries(options.query_retries),
            );
        }
        if let Some(dir) = &config.work_dir {
            pipeline = pipeline.with_work_dir(dir.clone());
        }
        Ok(pipeline)
    }

    /// Enable the transcode step for contexts that carry transcode options.
    pub fn with_transcoder(mut self, transcoder: TranscodeJobService) -> Self {
        self.transcoder = Some(transcoder);
        self
    }

    /// Create per-run temp dirs under `dir` instead of the system temp dir.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    /// Execute one run. Never fails: every outcome is reported in the result.
    pub async fn run(&self, ctx: &RunContext) -> PipelineResult {
        let mut log = RunLog::new(ctx);
        let span = log.create_span();

        async move {
            log.info(format!(
                "Starting highlights pipeline for {} on {}",
                ctx.league,
                ctx.date_str()
            ));

            let mut result = PipelineResult::new(PipelineStatus::Success);
            let outcome = AssertUnwindSafe(self.execute(ctx, &mut log, &mut result))
                .catch_unwind()
                .await;

            result.status = match outcome {
                Ok(Ok(())) => {
                    log.info("Pipeline completed successfully");
                    PipelineStatus::Success
                }
                Ok(Err(e)) => {
                    log.error(format!("Pipeline failed: {}", e));
                    PipelineStatus::failure(e.to_string())
                }
                Err(panic) => {
                    let reason = format!("step panicked: {}", panic_message(panic.as_ref()));
                    log.error(format!("Pipeline failed: {}", reason));
                    PipelineStatus::failure(reason)
                }
            };

            log.info(format!("Run result: {}", result.summary()));
            let finalized = AssertUnwindSafe(self.finalize(ctx, &log)).catch_unwind().await;
            result.log_key = match finalized {
                Ok(key) => key,
                Err(panic) => {
                    error!("Run log upload panicked: {}", panic_message(panic.as_ref()));
                    None
                }
            };
            result
        }
        .instrument(span)
        .await
    }

    async fn execute(
        &self,
        ctx: &RunContext,
        log: &mut RunLog,
        result: &mut PipelineResult,
    ) -> PipelineErrorResult<()> {
        let document = match self.fetch(ctx).await {
            Ok(document) => document,
            Err(e) => {
                record_failure(log, PipelineStep::FetchMetadata, &e);
                return Err(e);
            }
        };
        log.info("Highlights fetched successfully");

        self.persist_metadata(ctx, &document, log, result).await;

        let Some(candidate) = select(&document) else {
            let e = PipelineError::SelectionEmpty;
            record_failure(log, PipelineStep::SelectVideo, &e);
            return Err(e);
        };
        log.info(format!("Selected video {}", candidate.url));

        // Dropped on return, which removes the downloaded file.
        let workspace = match self.temp_dir() {
            Ok(dir) => dir,
            Err(e) => {
                record_failure(log, PipelineStep::DownloadVideo, &e);
                return Err(e);
            }
        };
        let destination = workspace.path().join(&candidate.filename);

        let download_error = match self.downloader.download(&candidate.url, &destination).await {
            Ok(video) => {
                log.info(format!("Downloaded {} ({} bytes)", candidate.filename, video.bytes));
                let key = video_key(&ctx.league, ctx.date, &candidate.filename);
                self.persist_video(ctx, &video.path, key, log, result).await;
                None
            }
            Err(e) => {
                let e = PipelineError::from(e);
                record_failure(log, PipelineStep::DownloadVideo, &e);
                log.warn("No video downloaded, skipping video upload");
                Some(e)
            }
        };

        self.transcode(ctx, log, result).await;

        match download_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// An empty document (`null`, `{}` or `[]`) counts as a failed fetch.
    async fn fetch(&self, ctx: &RunContext) -> PipelineErrorResult<HighlightsDocument> {
        let document = self.source.fetch(&ctx.league, ctx.date).await?;
        if document.is_empty() {
            return Err(PipelineError::NoHighlights);
        }
        Ok(document)
    }

    async fn persist_metadata(
        &self,
        ctx: &RunContext,
        document: &HighlightsDocument,
        log: &mut RunLog,
        result: &mut PipelineResult,
    ) {
        let Some(bucket) = ctx.buckets.metadata.as_deref() else {
            log.warn("METADATA_BUCKET not configured, skipping highlights upload");
            return;
        };

        let key = metadata_key(&ctx.league, ctx.date);
        let body = match document.to_pretty_json() {
            Ok(body) => body,
            Err(e) => {
                let e = PipelineError::Decode(e.to_string());
                record_failure(log, PipelineStep::PersistMetadata, &e);
                return;
            }
        };

        match self.store.put(bucket, &key, body, JSON_CONTENT_TYPE).await {
            Ok(()) => {
                log.info(format!("Uploaded highlights to {}", s3_uri(bucket, &key)));
                result.metadata_key = Some(key);
            }
            Err(e) => record_failure(log, PipelineStep::PersistMetadata, &e.into()),
        }
    }

    async fn persist_video(
        &self,
        ctx: &RunContext,
        path: &Path,
        key: String,
        log: &mut RunLog,
        result: &mut PipelineResult,
    ) {
        let Some(bucket) = ctx.buckets.video.as_deref() else {
            log.warn("VIDEOS_BUCKET not configured, skipping video upload");
            return;
        };

        match self.store.put_file(bucket, &key, path, VIDEO_CONTENT_TYPE).await {
            Ok(()) => {
                log.info(format!("Uploaded video to {}", s3_uri(bucket, &key)));
                result.video_key = Some(key);
            }
            Err(e) => record_failure(log, PipelineStep::PersistVideo, &e.into()),
        }
    }

    async fn transcode(&self, ctx: &RunContext, log: &mut RunLog, result: &mut PipelineResult) {
        let Some(options) = ctx.transcode.as_ref() else {
            return;
        };
        let Some(service) = self.transcoder.as_ref() else {
            log.warn("Transcoding requested but no transcode provider is available, skipping");
            return;
        };
        let (Some(bucket), Some(key)) = (ctx.buckets.video.as_deref(), result.video_key.as_deref())
        else {
            log.warn("No uploaded video to transcode, skipping transcode");
            return;
        };

        let input = s3_uri(bucket, key);
        let output_prefix = s3_uri(bucket, &transcode_output_key_prefix(&ctx.league, ctx.date));

        let job = match service
            .submit(&options.role_arn, &input, &output_prefix, &options.renditions)
            .await
        {
            Ok(job) => job,
            Err(e) => {
                record_failure(log, PipelineStep::Transcode, &e.into());
                return;
            }
        };
        log.info(format!("Submitted transcode job {}", job.id));
        result.transcode = Some(TranscodeOutcome {
            job_id: job.id.clone(),
            status: None,
        });

        let poll = service
            .poll(&job.id, options.poll_interval, options.poll_timeout)
            .await;
        match poll {
            Ok(outcome) => {
                match outcome.status {
                    TerminalStatus::Complete => {
                        log.info(format!("Transcode job {} completed", job.id))
                    }
                    TerminalStatus::Timeout => log.warn(format!(
                        "Transcode job {} still running after {:?}, last status {}",
                        job.id, options.poll_timeout, outcome.last.status
                    )),
                    status => log.error(format!("Transcode job {} ended with {}", job.id, status)),
                }
                result.transcode = Some(TranscodeOutcome {
                    job_id: job.id,
                    status: Some(outcome.status),
                });
            }
            Err(e) => record_failure(log, PipelineStep::Transcode, &e.into()),
        }
    }

    fn temp_dir(&self) -> PipelineErrorResult<TempDir> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("hl-run-");
        let dir = match &self.work_dir {
            Some(parent) => {
                std::fs::create_dir_all(parent)?;
                builder.tempdir_in(parent)?
            }
            None => builder.tempdir()?,
        };
        Ok(dir)
    }

    /// Write the run log. Failures are reported to tracing only.
    async fn finalize(&self, ctx: &RunContext, log: &RunLog) -> Option<String> {
        let Some(bucket) = ctx.buckets.log.as_deref() else {
            warn!("LOGS_BUCKET not configured, run log not archived");
            return None;
        };

        let key = log_key(Utc::now());
        match self.store.put(bucket, &key, log.to_bytes(), LOG_CONTENT_TYPE).await {
            Ok(()) => {
                info!("Run log uploaded to {}", s3_uri(bucket, &key));
                Some(key)
            }
            Err(e) => {
                error!(error = %e, "Failed to upload run log");
                None
            }
        }
    }
}

fn record_failure(log: &mut RunLog, step: PipelineStep, e: &PipelineError) {
    match step.policy() {
        StepPolicy::Fatal => log.error(format!("{} failed, aborting run: {}", step, e)),
        StepPolicy::Advisory { fails_run: true } => log.error(format!("{} failed: {}", step, e)),
        StepPolicy::Advisory { fails_run: false } => {
            log.error(format!("{} failed, continuing: {}", step, e))
        }
    }
}

/// Archive a one-line failure log for a run that never started because its
/// configuration was rejected. Upload failures are reported to tracing only.
pub async fn archive_config_failure(
    store: &dyn BlobStore,
    bucket: &str,
    e: &PipelineError,
) -> Option<String> {
    let now = Utc::now();
    let record = LogRecord {
        timestamp: now,
        severity: Severity::Error,
        message: format!("Pipeline failed: {}", e),
    };
    let key = log_key(now);
    match store
        .put(bucket, &key, format!("{}\n", record).into_bytes(), LOG_CONTENT_TYPE)
        .await
    {
        Ok(()) => {
            info!("Run log uploaded to {}", s3_uri(bucket, &key));
            Some(key)
        }
        Err(err) => {
            error!(error = %err, "Failed to upload run log");
            None
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    panic
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| panic.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

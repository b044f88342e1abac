//! Highlights ingestion pipeline runner.
//!
//! This crate wires the media, storage and transcode crates into a single
//! run: fetch highlights, archive them, pick and download a video, archive
//! it, optionally transcode it, and archive the run log.

pub mod config;
pub mod error;
pub mod logging;
pub mod orchestrator;

pub use config::{LogTarget, PipelineConfig, StorageBackend};
pub use error::{PipelineError, PipelineErrorResult, PipelineStep, StepPolicy};
pub use logging::{LogRecord, RunLog, Severity};
pub use orchestrator::{archive_config_failure, PipelineOrchestrator};

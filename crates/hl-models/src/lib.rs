//! Shared data models for the highlights ingestion pipeline.
//!
//! This crate provides:
//! - The immutable per-run context (league, date, region, buckets)
//! - The highlights document tree returned by the metadata API
//! - Video candidates and their derived filenames
//! - Transcode job descriptions, renditions and status types
//! - Pipeline results
//! - The object key layout shared by every run

pub mod candidate;
pub mod context;
pub mod document;
pub mod keys;
pub mod result;
pub mod transcode;

pub use candidate::VideoCandidate;
pub use context::{BucketSet, RunContext, TranscodeOptions};
pub use document::HighlightsDocument;
pub use result::{PipelineResult, PipelineStatus, TranscodeOutcome};
pub use transcode::{Rendition, RenditionParseError, TerminalStatus, TranscodeJob, TranscodeStatus};

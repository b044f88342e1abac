//! Media acquisition for the highlights pipeline.
//!
//! This crate provides:
//! - The highlights API client (`HighlightsSource`)
//! - Candidate video selection over arbitrary highlights documents
//! - Streaming video download (`VideoDownloader`)

pub mod download;
pub mod error;
pub mod fetch;
pub mod select;

pub use download::{DownloadedVideo, HttpDownloader, VideoDownloader};
pub use error::{MediaError, MediaResult};
pub use fetch::{HighlightsApiConfig, HighlightsClient, HighlightsSource, DEFAULT_HOST};
pub use select::{collect_candidates, is_qualifying, select, select_with};

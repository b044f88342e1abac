//! Transcode job management.
//!
//! This crate provides:
//! - The `TranscodeProvider` trait (create job, get job)
//! - An AWS MediaConvert provider with endpoint discovery
//! - Job settings for a single file output group
//! - `TranscodeJobService`: submission and deadline-bounded polling

pub mod error;
pub mod mediaconvert;
pub mod provider;
pub mod retry;
pub mod service;
pub mod settings;

pub use error::{TranscodeError, TranscodeResult};
pub use mediaconvert::{describe_endpoint, MediaConvertProvider};
pub use provider::{JobSnapshot, TranscodeProvider};
pub use retry::RetryConfig;
pub use service::{PollOutcome, TranscodeJobService};
pub use settings::JobSettings;

//! Pipeline error types and step policy.

use thiserror::Error;

use hl_media::MediaError;
use hl_storage::StorageError;
use hl_transcode::TranscodeError;

pub type PipelineErrorResult<T> = Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("HTTP error {0}")]
    Http(u16),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Transcode submission failed: {0}")]
    Submission(String),

    #[error("Transcode status query failed: {0}")]
    Query(String),

    #[error("No highlights fetched from API")]
    NoHighlights,

    #[error("No video URL found in highlights")]
    SelectionEmpty,

    #[error("Persistence failed: {0}")]
    Persistence(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

impl From<MediaError> for PipelineError {
    fn from(e: MediaError) -> Self {
        match e {
            MediaError::Transport(msg) | MediaError::Client(msg) => Self::Transport(msg),
            MediaError::Http { status } => Self::Http(status),
            MediaError::Decode(msg) => Self::Decode(msg),
            MediaError::Io(e) => Self::Io(e),
        }
    }
}

impl From<TranscodeError> for PipelineError {
    fn from(e: TranscodeError) -> Self {
        match e {
            TranscodeError::Submission(msg) | TranscodeError::Endpoint(msg) => Self::Submission(msg),
            err @ TranscodeError::Query { .. } => Self::Query(err.to_string()),
        }
    }
}

/// How a step's failure affects the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPolicy {
    /// Abort the remaining steps; the run fails.
    Fatal,
    /// Log and continue. With `fails_run` the run still ends as a failure.
    Advisory { fails_run: bool },
}

/// The ordered steps of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStep {
    FetchMetadata,
    PersistMetadata,
    SelectVideo,
    DownloadVideo,
    PersistVideo,
    Transcode,
}

impl PipelineStep {
    pub fn policy(self) -> StepPolicy {
        match self {
            PipelineStep::FetchMetadata | PipelineStep::SelectVideo => StepPolicy::Fatal,
            PipelineStep::DownloadVideo => StepPolicy::Advisory { fails_run: true },
            PipelineStep::PersistMetadata | PipelineStep::PersistVideo | PipelineStep::Transcode => {
                StepPolicy::Advisory { fails_run: false }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PipelineStep::FetchMetadata => "fetch_metadata",
            PipelineStep::PersistMetadata => "persist_metadata",
            PipelineStep::SelectVideo => "select_video",
            PipelineStep::DownloadVideo => "download_video",
            PipelineStep::PersistVideo => "persist_video",
            PipelineStep::Transcode => "transcode",
        }
    }
}

impl std::fmt::Display for PipelineStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Transcode job models.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rendition {
    pub width: u32,
    pub height: u32,
}

impl Rendition {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// 720p and 480p MP4 outputs.
    pub fn defaults() -> Vec<Rendition> {
        vec![Rendition::new(1280, 720), Rendition::new(854, 480)]
    }

    /// Parse a comma-separated list such as `1280x720,854x480`.
    pub fn parse_list(s: &str) -> Result<Vec<Rendition>, RenditionParseError> {
        let renditions = s
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(Rendition::from_str)
            .collect::<Result<Vec<_>, _>>()?;

        if renditions.is_empty() {
            return Err(RenditionParseError(s.to_string()));
        }
        Ok(renditions)
    }
}

impl fmt::Display for Rendition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Error returned for a malformed `WIDTHxHEIGHT` string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid rendition '{0}', expected WIDTHxHEIGHT")]
pub struct RenditionParseError(pub String);

impl FromStr for Rendition {
    type Err = RenditionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || RenditionParseError(s.to_string());
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(err)?;
        let width: u32 = w.trim().parse().map_err(|_| err())?;
        let height: u32 = h.trim().parse().map_err(|_| err())?;
        if width == 0 || height == 0 {
            return Err(err());
        }
        Ok(Self { width, height })
    }
}

/// A submitted transcode job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscodeJob {
    /// Provider-assigned job id
    pub id: String,
    /// Input object location (`s3://bucket/key`)
    pub input: String,
    /// Output location prefix (`s3://bucket/prefix/`)
    pub output_prefix: String,
    /// Role the provider runs the job as
    pub role_arn: String,
    /// Requested renditions
    pub renditions: Vec<Rendition>,
}

/// Job status as reported by the provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TranscodeStatus {
    Submitted,
    Progressing,
    Complete,
    Error,
    Canceled,
    /// A status this client does not know; treated as non-terminal
    Unknown(String),
}

impl TranscodeStatus {
    /// Map a provider status string (`COMPLETE`, `PROGRESSING`, ...).
    pub fn from_provider(status: &str) -> Self {
        match status.to_ascii_uppercase().as_str() {
            "SUBMITTED" => TranscodeStatus::Submitted,
            "PROGRESSING" => TranscodeStatus::Progressing,
            "COMPLETE" => TranscodeStatus::Complete,
            "ERROR" => TranscodeStatus::Error,
            "CANCELED" | "CANCELLED" => TranscodeStatus::Canceled,
            _ => TranscodeStatus::Unknown(status.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            TranscodeStatus::Submitted => "SUBMITTED",
            TranscodeStatus::Progressing => "PROGRESSING",
            TranscodeStatus::Complete => "COMPLETE",
            TranscodeStatus::Error => "ERROR",
            TranscodeStatus::Canceled => "CANCELED",
            TranscodeStatus::Unknown(s) => s,
        }
    }

    /// Terminal status for this state, if the job can no longer change.
    pub fn terminal(&self) -> Option<TerminalStatus> {
        match self {
            TranscodeStatus::Complete => Some(TerminalStatus::Complete),
            TranscodeStatus::Error => Some(TerminalStatus::Error),
            TranscodeStatus::Canceled => Some(TerminalStatus::Canceled),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal().is_some()
    }
}

impl fmt::Display for TranscodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Final status observed by the poller.
///
/// `Timeout` is synthetic: the poller gave up, the remote job may still finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TerminalStatus {
    Complete,
    Error,
    Canceled,
    Timeout,
}

impl TerminalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TerminalStatus::Complete => "COMPLETE",
            TerminalStatus::Error => "ERROR",
            TerminalStatus::Canceled => "CANCELED",
            TerminalStatus::Timeout => "TIMEOUT",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, TerminalStatus::Complete)
    }
}

impl fmt::Display for TerminalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rendition() {
        assert_eq!("1280x720".parse::<Rendition>().unwrap(), Rendition::new(1280, 720));
        assert_eq!(" 854X480 ".parse::<Rendition>().unwrap(), Rendition::new(854, 480));
        assert!("1280".parse::<Rendition>().is_err());
        assert!("0x720".parse::<Rendition>().is_err());
        assert!("axb".parse::<Rendition>().is_err());
    }

    #[test]
    fn test_parse_rendition_list() {
        let list = Rendition::parse_list("1920x1080, 1280x720,").unwrap();
        assert_eq!(list, vec![Rendition::new(1920, 1080), Rendition::new(1280, 720)]);
        assert!(Rendition::parse_list("").is_err());
        assert!(Rendition::parse_list("1280x720,bad").is_err());
    }

    #[test]
    fn test_rendition_display() {
        assert_eq!(Rendition::new(854, 480).to_string(), "854x480");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(TranscodeStatus::from_provider("COMPLETE"), TranscodeStatus::Complete);
        assert_eq!(TranscodeStatus::from_provider("progressing"), TranscodeStatus::Progressing);
        assert_eq!(
            TranscodeStatus::from_provider("PAUSED"),
            TranscodeStatus::Unknown("PAUSED".into())
        );
    }

    #[test]
    fn test_terminal_states() {
        assert_eq!(TranscodeStatus::Complete.terminal(), Some(TerminalStatus::Complete));
        assert_eq!(TranscodeStatus::Error.terminal(), Some(TerminalStatus::Error));
        assert_eq!(TranscodeStatus::Canceled.terminal(), Some(TerminalStatus::Canceled));
        assert!(!TranscodeStatus::Submitted.is_terminal());
        assert!(!TranscodeStatus::Progressing.is_terminal());
        assert!(!TranscodeStatus::Unknown("X".into()).is_terminal());
    }

    #[test]
    fn test_only_complete_is_success() {
        assert!(TerminalStatus::Complete.is_success());
        assert!(!TerminalStatus::Timeout.is_success());
        assert!(!TerminalStatus::Error.is_success());
    }
}

//! Error types for fetch and download operations.

use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while talking to the highlights API or a video host.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Network failure or timeout before a complete response arrived
    #[error("Transport error: {0}")]
    Transport(String),

    /// Server answered with a non-2xx status
    #[error("HTTP error {status}")]
    Http { status: u16 },

    /// Response body is not the expected structured format
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP client configuration error: {0}")]
    Client(String),
}

impl MediaError {
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    pub fn http(status: u16) -> Self {
        Self::Http { status }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Status code for `Http` errors.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            MediaError::Http { status } => Some(*status),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_status_getter() {
        assert_eq!(MediaError::http(503).http_status(), Some(503));
        assert_eq!(MediaError::transport("reset").http_status(), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(MediaError::http(404).to_string(), "HTTP error 404");
        assert_eq!(MediaError::decode("eof").to_string(), "Decode error: eof");
    }
}

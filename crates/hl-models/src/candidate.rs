//! Selected video candidate.

use serde::{Deserialize, Serialize};
use url::Url;

/// Filename used when a URL has no usable path segment.
pub const FALLBACK_FILENAME: &str = "video.mp4";

/// A single video URL picked from a highlights document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoCandidate {
    /// Source URL
    pub url: String,
    /// Local and object-key filename derived from the URL
    pub filename: String,
}

impl VideoCandidate {
    /// Build a candidate, deriving the filename from the URL.
    pub fn from_url(url: impl Into<String>) -> Self {
        let url = url.into();
        let filename = derive_filename(&url);
        Self { url, filename }
    }
}

/// Last non-empty path segment of `url`, or [`FALLBACK_FILENAME`].
///
/// Query strings and fragments never contribute to the filename.
pub fn derive_filename(url: &str) -> String {
    let segment = match Url::parse(url) {
        Ok(parsed) => parsed
            .path_segments()
            .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
            .map(str::to_string),
        // Bare paths like "clips/goal.mp4" are not absolute URLs.
        Err(_) => url
            .split(['?', '#'])
            .next()
            .and_then(|path| path.rsplit('/').find(|s| !s.is_empty()))
            .map(str::to_string),
    };

    match segment {
        Some(name) if name != "." && name != ".." => name,
        _ => FALLBACK_FILENAME.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filename_from_url_path() {
        let c = VideoCandidate::from_url("https://cdn.example.com/2024/05/goal.mp4");
        assert_eq!(c.filename, "goal.mp4");
        assert_eq!(c.url, "https://cdn.example.com/2024/05/goal.mp4");
    }

    #[test]
    fn test_filename_ignores_query_and_fragment() {
        assert_eq!(derive_filename("https://x/a/clip.mp4?token=abc#t=10"), "clip.mp4");
        assert_eq!(derive_filename("clips/clip.mp4?sig=1"), "clip.mp4");
    }

    #[test]
    fn test_filename_trailing_slash_uses_last_segment() {
        assert_eq!(derive_filename("https://x/embed/12345/"), "12345");
    }

    #[test]
    fn test_filename_fallback_without_path() {
        assert_eq!(derive_filename("https://x.com"), FALLBACK_FILENAME);
        assert_eq!(derive_filename("https://x.com/"), FALLBACK_FILENAME);
        assert_eq!(derive_filename(""), FALLBACK_FILENAME);
    }

    #[test]
    fn test_bare_filename() {
        assert_eq!(derive_filename("goal.mp4"), "goal.mp4");
    }
}

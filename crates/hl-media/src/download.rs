//! Streaming video download.
//!
//! The response body is written to disk chunk by chunk, so memory use does
//! not grow with the size of the video. A failed download may leave a
//! partial file at the destination; removing it is up to the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::error::{MediaError, MediaResult};

/// A video written to local storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedVideo {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Downloads a remote URL to a local path.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    async fn download(&self, url: &str, destination: &Path) -> MediaResult<DownloadedVideo>;
}

/// HTTP downloader with connect and per-chunk read timeouts.
#[derive(Clone)]
pub struct HttpDownloader {
    http: Client,
    read_timeout: Duration,
}

impl HttpDownloader {
    /// Create a downloader. `timeout` bounds connecting and each wait for
    /// the next body chunk, not the whole transfer.
    pub fn new(timeout: Duration) -> MediaResult<Self> {
        let http = Client::builder()
            .connect_timeout(timeout)
            .user_agent(concat!("hl-media/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MediaError::Client(e.to_string()))?;

        Ok(Self {
            http,
            read_timeout: timeout,
        })
    }
}

#[async_trait]
impl VideoDownloader for HttpDownloader {
    async fn download(&self, url: &str, destination: &Path) -> MediaResult<DownloadedVideo> {
        info!("Downloading video {}", url);

        let response = tokio::time::timeout(self.read_timeout, self.http.get(url).send())
            .await
            .map_err(|_| {
                MediaError::transport(format!("no response after {:?}", self.read_timeout))
            })?
            .map_err(|e| MediaError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::http(status.as_u16()));
        }

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let mut file = tokio::fs::File::create(destination).await?;

        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;

        loop {
            let next = tokio::time::timeout(self.read_timeout, stream.next())
                .await
                .map_err(|_| {
                    MediaError::transport(format!(
                        "read timed out after {:?} ({} bytes received)",
                        self.read_timeout, written
                    ))
                })?;

            let Some(chunk) = next else { break };
            let chunk = chunk.map_err(|e| MediaError::transport(e.to_string()))?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        file.flush().await?;
        debug!("Wrote {} bytes", written);
        info!("Video downloaded to {}", destination.display());

        Ok(DownloadedVideo {
            path: destination.to_path_buf(),
            bytes: written,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_download_streams_body_to_file() {
        let server = MockServer::start().await;
        let body: Vec<u8> = (0..512 * 1024).map(|i| (i % 251) as u8).collect();
        Mock::given(method("GET"))
            .and(path("/clips/goal.mp4"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("nested").join("goal.mp4");
        let downloader = HttpDownloader::new(Duration::from_secs(5)).unwrap();

        let video = downloader
            .download(&format!("{}/clips/goal.mp4", server.uri()), &dest)
            .await
            .unwrap();

        assert_eq!(video.path, dest);
        assert_eq!(video.bytes, body.len() as u64);
        assert_eq!(tokio::fs::read(&dest).await.unwrap(), body);
    }

    #[tokio::test]
    async fn test_download_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("missing.mp4");
        let downloader = HttpDownloader::new(Duration::from_secs(5)).unwrap();

        let err = downloader
            .download(&format!("{}/missing.mp4", server.uri()), &dest)
            .await
            .unwrap_err();

        assert_eq!(err.http_status(), Some(404));
        assert!(!dest.exists());
    }

    #[tokio::test]
    async fn test_download_unreachable_host() {
        let dir = tempfile::tempdir().unwrap();
        let downloader = HttpDownloader::new(Duration::from_secs(2)).unwrap();

        let err = downloader
            .download("http://127.0.0.1:1/a.mp4", &dir.path().join("a.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Transport(_)));
    }

    #[tokio::test]
    async fn test_download_slow_response_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let downloader = HttpDownloader::new(Duration::from_millis(200)).unwrap();

        let err = downloader
            .download(&format!("{}/slow.mp4", server.uri()), &dir.path().join("slow.mp4"))
            .await
            .unwrap_err();

        assert!(matches!(err, MediaError::Transport(_)));
    }
}

//! Highlights API client.
//!
//! One GET per call, no retries. Whether a failed fetch is retried is the
//! caller's decision.

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::header::ACCEPT;
use reqwest::Client;
use tracing::{debug, info};

use hl_models::HighlightsDocument;

use crate::error::{MediaError, MediaResult};

/// Host identifier of the public highlights API.
pub const DEFAULT_HOST: &str = "sport-highlights-api.p.rapidapi.com";

/// Source of highlights documents for a league and date.
#[async_trait]
pub trait HighlightsSource: Send + Sync {
    async fn fetch(&self, league: &str, date: NaiveDate) -> MediaResult<HighlightsDocument>;
}

/// Highlights API configuration.
#[derive(Debug, Clone)]
pub struct HighlightsApiConfig {
    /// Scheme and host, e.g. `https://sport-highlights-api.p.rapidapi.com`
    pub base_url: String,
    /// Endpoint path
    pub path: String,
    /// Value of the host identifier header
    pub host: String,
    /// Value of the API key header
    pub api_key: String,
    /// Request timeout
    pub timeout: Duration,
}

impl HighlightsApiConfig {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        let host = host.into();
        Self {
            base_url: format!("https://{}", host),
            path: "/highlights".to_string(),
            host,
            api_key: api_key.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Full endpoint URL without query parameters.
    pub fn endpoint(&self) -> String {
        let path = self.path.trim_start_matches('/');
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

/// HTTP client for the highlights API.
#[derive(Clone)]
pub struct HighlightsClient {
    http: Client,
    config: HighlightsApiConfig,
}

impl HighlightsClient {
    pub fn new(config: HighlightsApiConfig) -> MediaResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("hl-media/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| MediaError::Client(e.to_string()))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl HighlightsSource for HighlightsClient {
    async fn fetch(&self, league: &str, date: NaiveDate) -> MediaResult<HighlightsDocument> {
        let url = self.config.endpoint();
        let date = date.format("%Y-%m-%d").to_string();
        info!(league, date = %date, "Fetching highlights from {}", url);

        let response = self
            .http
            .get(&url)
            .query(&[("league", league), ("date", date.as_str())])
            .header("x-rapidapi-host", &self.config.host)
            .header("x-rapidapi-key", &self.config.api_key)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| MediaError::transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(MediaError::http(status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| MediaError::transport(e.to_string()))?;
        debug!("Highlights response: {} bytes", body.len());

        HighlightsDocument::from_slice(&body).map_err(|e| MediaError::decode(e.to_string()))
    }
}

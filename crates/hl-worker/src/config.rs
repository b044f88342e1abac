//! Pipeline configuration.
//!
//! All environment access happens here, once, before a run starts. The
//! rest of the pipeline only sees the values captured in [`PipelineConfig`].

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};

use hl_media::{HighlightsApiConfig, DEFAULT_HOST};
use hl_models::{BucketSet, Rendition, RunContext, TranscodeOptions};
use hl_storage::{BlobStore, LocalBlobStore, S3Client, S3Config};

use crate::error::{PipelineError, PipelineErrorResult};

const DEFAULT_LEAGUE: &str = "Superettan";
const DEFAULT_REGION: &str = "ap-south-1";
const DEFAULT_LOCAL_ROOT: &str = "./blob-store";

/// Where blobs are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// S3 (or an S3-compatible endpoint)
    S3 { endpoint_url: Option<String> },
    /// A directory tree, one subdirectory per bucket
    Local { root: PathBuf },
}

/// Pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub league: String,
    pub date: NaiveDate,
    pub region: String,
    pub buckets: BucketSet,
    pub api: HighlightsApiConfig,
    /// Connect and per-chunk read timeout for video downloads
    pub download_timeout: Duration,
    /// Transcode settings; `None` unless transcoding was opted into
    pub transcode: Option<TranscodeOptions>,
    /// Parent directory for the per-run temp dir; `None` uses the system temp dir
    pub work_dir: Option<PathBuf>,
    pub storage: StorageBackend,
    /// Non-fatal problems found while reading the configuration
    pub warnings: Vec<String>,
}

impl PipelineConfig {
    /// Create config from environment variables.
    pub fn from_env() -> PipelineErrorResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary key lookup.
    ///
    /// Empty values are treated the same as unset ones.
    pub fn from_lookup<F>(lookup: F) -> PipelineErrorResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut warnings = Vec::new();

        let league = get("DEFAULT_LEAGUE").unwrap_or_else(|| DEFAULT_LEAGUE.to_string());
        let date = match get("DEFAULT_DATE") {
            Some(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| {
                PipelineError::config(format!("DEFAULT_DATE '{}' is not YYYY-MM-DD: {}", raw, e))
            })?,
            None => Utc::now().date_naive(),
        };
        let region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());

        let buckets = BucketSet {
            metadata: get("METADATA_BUCKET"),
            video: get("VIDEOS_BUCKET"),
            log: get("LOGS_BUCKET"),
        };

        let api_key = get("RAPIDAPI_KEY").unwrap_or_else(|| {
            warnings.push("RAPIDAPI_KEY is not set, highlights requests will be unauthenticated".to_string());
            String::new()
        });
        let mut api = HighlightsApiConfig::new(
            get("RAPIDAPI_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string()),
            api_key,
        );
        if let Some(base_url) = get("HIGHLIGHTS_BASE_URL") {
            api.base_url = base_url;
        }
        if let Some(path) = get("HIGHLIGHTS_PATH") {
            api.path = path;
        }
        api.timeout = secs(&get, "FETCH_TIMEOUT_SECS", 30)?;

        let download_timeout = secs(&get, "DOWNLOAD_TIMEOUT_SECS", 60)?;

        let transcode = if parse_bool(&get, "TRANSCODE_ENABLED")? {
            let renditions = match get("TRANSCODE_RENDITIONS") {
                Some(raw) => Rendition::parse_list(&raw)
                    .map_err(|e| PipelineError::config(format!("TRANSCODE_RENDITIONS: {}", e)))?,
                None => Rendition::defaults(),
            };
            let poll_interval = secs(&get, "TRANSCODE_POLL_INTERVAL_SECS", 10)?;
            let poll_timeout = secs(&get, "TRANSCODE_POLL_TIMEOUT_SECS", 1800)?;
            let query_retries = parse(&get, "TRANSCODE_QUERY_RETRIES", 0u32)?;

            match get("MEDIACONVERT_ROLE_ARN") {
                Some(role_arn) => Some(TranscodeOptions {
                    role_arn,
                    renditions,
                    poll_interval,
                    poll_timeout,
                    query_retries,
                }),
                None => {
                    warnings.push(
                        "TRANSCODE_ENABLED is set but MEDIACONVERT_ROLE_ARN is not, transcoding disabled"
                            .to_string(),
                    );
                    None
                }
            }
        } else {
            None
        };

        let storage = storage_backend(&get)?;

        Ok(Self {
            league,
            date,
            region,
            buckets,
            api,
            download_timeout,
            transcode,
            work_dir: get("PIPELINE_WORK_DIR").map(PathBuf::from),
            storage,
            warnings,
        })
    }

    /// Snapshot this configuration into the context for one run.
    pub fn run_context(&self) -> RunContext {
        let ctx = RunContext::new(
            self.league.clone(),
            self.date,
            self.region.clone(),
            self.buckets.clone(),
        );
        match &self.transcode {
            Some(options) => ctx.with_transcode(options.clone()),
            None => ctx,
        }
    }
}

/// Where to archive a failure log when the full configuration is rejected.
///
/// Only reads the variables needed to reach the log bucket, so a malformed
/// date or rendition list does not prevent the failure from being archived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogTarget {
    pub bucket: String,
    pub region: String,
    pub storage: StorageBackend,
}

impl LogTarget {
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// `None` when no log bucket is set or the storage backend is itself invalid.
    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Some(Self {
            bucket: get("LOGS_BUCKET")?,
            region: get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            storage: storage_backend(&get).ok()?,
        })
    }
}

impl StorageBackend {
    /// Build the blob store for this backend.
    pub async fn open(&self, region: &str) -> Arc<dyn BlobStore> {
        match self {
            StorageBackend::S3 { endpoint_url } => {
                let config = S3Config {
                    region: region.to_string(),
                    endpoint_url: endpoint_url.clone(),
                };
                Arc::new(S3Client::new(config).await)
            }
            StorageBackend::Local { root } => Arc::new(LocalBlobStore::new(root.clone())),
        }
    }
}

fn storage_backend<G>(get: &G) -> PipelineErrorResult<StorageBackend>
where
    G: Fn(&str) -> Option<String>,
{
    match get("STORAGE_BACKEND").map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("s3") => Ok(StorageBackend::S3 {
            endpoint_url: get("S3_ENDPOINT_URL"),
        }),
        Some("local") => Ok(StorageBackend::Local {
            root: get("LOCAL_STORAGE_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_ROOT)),
        }),
        Some(other) => Err(PipelineError::config(format!(
            "STORAGE_BACKEND must be 's3' or 'local', got '{}'",
            other
        ))),
    }
}

fn parse<G, T>(get: &G, key: &str, default: T) -> PipelineErrorResult<T>
where
    G: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match get(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e| PipelineError::config(format!("{} '{}': {}", key, raw, e))),
        None => Ok(default),
    }
}

fn secs<G>(get: &G, key: &str, default: u64) -> PipelineErrorResult<Duration>
where
    G: Fn(&str) -> Option<String>,
{
    parse(get, key, default).map(Duration::from_secs)
}

fn parse_bool<G>(get: &G, key: &str) -> PipelineErrorResult<bool>
where
    G: Fn(&str) -> Option<String>,
{
    match get(key).map(|v| v.trim().to_ascii_lowercase()).as_deref() {
        None | Some("false") | Some("0") | Some("no") | Some("off") => Ok(false),
        Some("true") | Some("1") | Some("yes") | Some("on") => Ok(true),
        Some(other) => Err(PipelineError::config(format!(
            "{} must be true or false, got '{}'",
            key, other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> PipelineErrorResult<PipelineConfig> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        PipelineConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();

        assert_eq!(config.league, "Superettan");
        assert_eq!(config.date, Utc::now().date_naive());
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.buckets, BucketSet::default());
        assert_eq!(config.api.host, "sport-highlights-api.p.rapidapi.com");
        assert_eq!(
            config.api.endpoint(),
            "https://sport-highlights-api.p.rapidapi.com/highlights"
        );
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert_eq!(config.download_timeout, Duration::from_secs(60));
        assert!(config.transcode.is_none());
        assert!(config.work_dir.is_none());
        assert_eq!(config.storage, StorageBackend::S3 { endpoint_url: None });
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("RAPIDAPI_KEY"));
    }

    #[test]
    fn test_explicit_values() {
        let config = config(&[
            ("DEFAULT_LEAGUE", "Allsvenskan"),
            ("DEFAULT_DATE", "2024-09-01"),
            ("RAPIDAPI_KEY", "secret"),
            ("HIGHLIGHTS_BASE_URL", "http://127.0.0.1:9000"),
            ("METADATA_BUCKET", "meta"),
            ("VIDEOS_BUCKET", "videos"),
            ("LOGS_BUCKET", ""),
            ("AWS_REGION", "eu-north-1"),
        ])
        .unwrap();

        assert_eq!(config.league, "Allsvenskan");
        assert_eq!(config.date, NaiveDate::from_ymd_opt(2024, 9, 1).unwrap());
        assert_eq!(config.api.api_key, "secret");
        assert_eq!(config.api.endpoint(), "http://127.0.0.1:9000/highlights");
        assert_eq!(config.buckets.metadata.as_deref(), Some("meta"));
        assert_eq!(config.buckets.video.as_deref(), Some("videos"));
        assert_eq!(config.buckets.log, None);
        assert!(config.warnings.is_empty());

        let ctx = config.run_context();
        assert_eq!(ctx.league, "Allsvenskan");
        assert_eq!(ctx.date_str(), "2024-09-01");
        assert_eq!(ctx.region, "eu-north-1");
        assert!(ctx.transcode.is_none());
    }

    #[test]
    fn test_malformed_values_are_config_errors() {
        for vars in [
            vec![("DEFAULT_DATE", "01/09/2024")],
            vec![("FETCH_TIMEOUT_SECS", "thirty")],
            vec![("TRANSCODE_ENABLED", "maybe")],
            vec![("TRANSCODE_ENABLED", "true"), ("TRANSCODE_RENDITIONS", "720p")],
            vec![("STORAGE_BACKEND", "gcs")],
        ] {
            let err = config(&vars).unwrap_err();
            assert!(matches!(err, PipelineError::Config(_)), "{:?}", vars);
        }
    }

    #[test]
    fn test_transcode_opt_in() {
        let config = config(&[
            ("TRANSCODE_ENABLED", "true"),
            ("MEDIACONVERT_ROLE_ARN", "arn:aws:iam::1:role/mc"),
            ("TRANSCODE_RENDITIONS", "1920x1080"),
            ("TRANSCODE_POLL_INTERVAL_SECS", "5"),
            ("TRANSCODE_QUERY_RETRIES", "2"),
        ])
        .unwrap();

        let options = config.transcode.as_ref().unwrap();
        assert_eq!(options.role_arn, "arn:aws:iam::1:role/mc");
        assert_eq!(options.renditions, vec![Rendition::new(1920, 1080)]);
        assert_eq!(options.poll_interval, Duration::from_secs(5));
        assert_eq!(options.poll_timeout, Duration::from_secs(1800));
        assert_eq!(options.query_retries, 2);
        assert_eq!(config.run_context().transcode.as_ref(), Some(options));
    }

    #[test]
    fn test_transcode_without_role_is_disabled_with_warning() {
        let config = config(&[("TRANSCODE_ENABLED", "true"), ("RAPIDAPI_KEY", "k")]).unwrap();
        assert!(config.transcode.is_none());
        assert_eq!(config.warnings.len(), 1);
        assert!(config.warnings[0].contains("MEDIACONVERT_ROLE_ARN"));
    }

    #[test]
    fn test_log_target_survives_malformed_settings() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("DEFAULT_DATE", "01/09/2024"),
            ("TRANSCODE_RENDITIONS", "720p"),
            ("LOGS_BUCKET", "logs"),
            ("STORAGE_BACKEND", "local"),
            ("LOCAL_STORAGE_ROOT", "/data/blobs"),
        ]);
        let lookup = |key: &str| vars.get(key).map(|v| v.to_string());

        assert!(PipelineConfig::from_lookup(lookup).is_err());
        assert_eq!(
            LogTarget::from_lookup(lookup),
            Some(LogTarget {
                bucket: "logs".to_string(),
                region: "ap-south-1".to_string(),
                storage: StorageBackend::Local {
                    root: PathBuf::from("/data/blobs")
                },
            })
        );
    }

    #[test]
    fn test_log_target_requires_bucket_and_valid_backend() {
        assert_eq!(LogTarget::from_lookup(|_| None), None);
        assert_eq!(
            LogTarget::from_lookup(|key| match key {
                "LOGS_BUCKET" => Some("logs".to_string()),
                "STORAGE_BACKEND" => Some("gcs".to_string()),
                _ => None,
            }),
            None
        );
    }

    #[test]
    fn test_storage_backends() {
        let local = config(&[("STORAGE_BACKEND", "local"), ("LOCAL_STORAGE_ROOT", "/data/blobs")]).unwrap();
        assert_eq!(
            local.storage,
            StorageBackend::Local {
                root: PathBuf::from("/data/blobs")
            }
        );

        let s3 = config(&[("S3_ENDPOINT_URL", "http://minio:9000")]).unwrap();
        assert_eq!(
            s3.storage,
            StorageBackend::S3 {
                endpoint_url: Some("http://minio:9000".to_string())
            }
        );
    }
}

//! Object key layout.
//!
//! Other systems read these locations, so the layout is fixed.

use chrono::{DateTime, NaiveDate, Utc};

/// `highlights/{league}/{date}/highlights.json`
pub fn metadata_key(league: &str, date: NaiveDate) -> String {
    format!("highlights/{}/{}/highlights.json", league, date.format("%Y-%m-%d"))
}

/// `incoming/{league}/{date}/{filename}`
pub fn video_key(league: &str, date: NaiveDate, filename: &str) -> String {
    format!("incoming/{}/{}/{}", league, date.format("%Y-%m-%d"), filename)
}

/// `pipeline_log_{YYYYMMDD_HHMMSS}.txt`
pub fn log_key(at: DateTime<Utc>) -> String {
    format!("pipeline_log_{}.txt", at.format("%Y%m%d_%H%M%S"))
}

/// `processed/{league}/{date}/`
pub fn transcode_output_key_prefix(league: &str, date: NaiveDate) -> String {
    format!("processed/{}/{}/", league, date.format("%Y-%m-%d"))
}

/// `s3://{bucket}/{key}`
pub fn s3_uri(bucket: &str, key: &str) -> String {
    format!("s3://{}/{}", bucket, key)
}

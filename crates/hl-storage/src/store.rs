//! Blob store abstraction.

use std::path::Path;

use async_trait::async_trait;

use crate::error::StorageResult;

/// Key-addressed object storage with bucket namespacing.
///
/// No versioning or conditional writes: a `put` to an existing key replaces it.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Write `data` to `bucket/key`.
    async fn put(&self, bucket: &str, key: &str, data: Vec<u8>, content_type: &str)
        -> StorageResult<()>;

    /// Stream a local file to `bucket/key`.
    async fn put_file(
        &self,
        bucket: &str,
        key: &str,
        path: &Path,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Read `bucket/key` fully into memory.
    async fn get(&self, bucket: &str, key: &str) -> StorageResult<Vec<u8>>;

    /// All keys in `bucket` starting with `prefix`.
    async fn list(&self, bucket: &str, prefix: &str) -> StorageResult<Vec<String>>;

    /// Whether `bucket/key` exists.
    async fn exists(&self, bucket: &str, key: &str) -> StorageResult<bool>;
}

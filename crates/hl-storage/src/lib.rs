//! Blob storage for the highlights pipeline.
//!
//! This crate provides:
//! - The `BlobStore` trait (put/put_file/get/list/exists by bucket and key)
//! - An S3 implementation using the default AWS credential chain
//! - A filesystem implementation for local runs

pub mod client;
pub mod error;
pub mod local;
pub mod store;

pub use client::{S3Client, S3Config};
pub use error::{StorageError, StorageResult};
pub use local::LocalBlobStore;
pub use store::BlobStore;

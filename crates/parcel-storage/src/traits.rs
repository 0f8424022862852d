//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Object already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the archiver
/// works with any of them.
///
/// Keys are relative paths such as `documents/20240301_101500_000000000_listing.pdf`.
/// They must not contain `..` or a leading `/`.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `storage_key` and return its public URL.
    ///
    /// Never overwrites: fails with [`StorageError::AlreadyExists`] if the key is taken.
    async fn create_with_key(
        &self,
        storage_key: &str,
        data: Bytes,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Publicly dereferenceable URL for a key
    fn public_url(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

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

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StorageError {
    /// The referenced object does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, StorageError::NotFound(_))
    }
}

impl From<StorageError> for korekenke_core::AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound(key) => korekenke_core::AppError::NotFound(key),
            StorageError::InvalidKey(msg) => korekenke_core::AppError::InvalidInput(msg),
            other => korekenke_core::AppError::Storage(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Transfer progress observer: `(bytes_transferred, total_bytes)`.
///
/// Called after each chunk reaches the backend, with non-decreasing values.
pub type ProgressFn<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Progress observer that ignores every update.
pub fn no_progress(_transferred: u64, _total: u64) {}

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) implement this trait so the
/// upload and deletion pipelines work against any of them.
///
/// **Key format:** keys are relative object paths such as
/// `reservations/42/contract.pdf`; see [`crate::keys`] for the naming convention
/// of originals and thumbnails.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Upload `data` to `storage_key`, reporting progress, and return the object's public URL.
    async fn put(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        progress: ProgressFn<'_>,
    ) -> StorageResult<String>;

    /// Public URL of an existing object.
    ///
    /// Returns `StorageError::NotFound` when nothing is stored under the key, which
    /// is how callers wait for asynchronously generated objects such as thumbnails.
    async fn download_url(&self, storage_key: &str) -> StorageResult<String>;

    /// Download a file by its storage key
    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Delete a file by its storage key.
    ///
    /// Backends that can tell report a missing object as `StorageError::NotFound`.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Check if a file exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Backend-qualified URI of an object (`s3://bucket/key`, `file:///base/key`), for logs.
    fn object_uri(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

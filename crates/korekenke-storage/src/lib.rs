//! Korekenke Storage Library
//!
//! Storage abstraction plus S3 and local filesystem backends used by the
//! upload and deletion pipelines.
//!
//! # Storage key format
//!
//! - **Original**: `{file_path}/{file_name}.{ext}`
//! - **Thumbnail**: `{file_path}/thumbs/{file_name}_{variant}.webp`
//!
//! Keys must not contain `..` or a leading `/`. Key derivation is centralized in
//! the [`keys`] module so uploads and deletions always agree.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::{FilePathSet, ThumbnailPath};
pub use korekenke_core::StorageBackend;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{no_progress, ProgressFn, Storage, StorageError, StorageResult};

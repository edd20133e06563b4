//! Korekenke Services Library
//!
//! File pipelines built on the storage abstraction: uploads with progress and
//! thumbnail resolution, and best-effort deletion of a file with all of its
//! thumbnails.

pub mod deletion;
pub mod thumbnail;
pub mod upload;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use deletion::{DeletionPipeline, DeletionReport};
pub use thumbnail::{poll_thumbnail_url, RetryPolicy, ThumbnailError};
pub use upload::{UploadError, UploadPipeline, UploadProgressFn};

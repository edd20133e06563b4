//! Waiting for asynchronously generated thumbnails.
//!
//! Thumbnails are produced out of band after the original lands in storage,
//! so the upload pipeline polls for the thumbnail's URL until it appears.

use std::time::Duration;

use korekenke_core::constants::{THUMBNAIL_MAX_RETRIES, THUMBNAIL_RETRY_DELAY_MS};
use korekenke_core::Config;
use korekenke_storage::{Storage, StorageError};
use thiserror::Error;
use tokio::time::sleep;

/// Fixed-delay retry schedule for thumbnail polling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt; `max_retries + 1` attempts in total.
    pub max_retries: u32,
    /// Wait between two attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, delay: Duration) -> Self {
        Self { max_retries, delay }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(config.thumbnail_max_retries(), config.thumbnail_retry_delay())
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            THUMBNAIL_MAX_RETRIES,
            Duration::from_millis(THUMBNAIL_RETRY_DELAY_MS),
        )
    }
}

#[derive(Debug, Error)]
pub enum ThumbnailError {
    #[error("Thumbnail {key} still missing after {attempts} attempts")]
    OutOfTries { key: String, attempts: u32 },

    #[error("Failed to resolve thumbnail {key}: {source}")]
    Storage {
        key: String,
        #[source]
        source: StorageError,
    },
}

/// Resolve the public URL of `key`, retrying while the object does not exist yet.
///
/// Only `NotFound` is retried. Any other storage error ends polling at once.
pub async fn poll_thumbnail_url(
    storage: &dyn Storage,
    key: &str,
    policy: RetryPolicy,
) -> Result<String, ThumbnailError> {
    let mut attempts = 0u32;

    loop {
        attempts += 1;

        match storage.download_url(key).await {
            Ok(url) => {
                tracing::debug!(key = %key, attempts, "Thumbnail available");
                return Ok(url);
            }
            Err(e) if e.is_not_found() => {
                if attempts > policy.max_retries {
                    tracing::warn!(key = %key, attempts, "Gave up waiting for thumbnail");
                    return Err(ThumbnailError::OutOfTries {
                        key: key.to_string(),
                        attempts,
                    });
                }

                tracing::debug!(
                    key = %key,
                    attempt = attempts,
                    delay_ms = policy.delay.as_millis() as u64,
                    "Thumbnail not ready, retrying"
                );
                sleep(policy.delay).await;
            }
            Err(source) => {
                return Err(ThumbnailError::Storage {
                    key: key.to_string(),
                    source,
                });
            }
        }
    }
}

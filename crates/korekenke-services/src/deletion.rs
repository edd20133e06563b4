//! Deletion pipeline: remove an original and all of its thumbnails.

use std::sync::Arc;

use futures::future::join_all;
use korekenke_core::{Config, ThumbnailVariants};
use korekenke_storage::{FilePathSet, Storage};
use serde::Serialize;

/// Per-key outcome of a deletion run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeletionReport {
    pub deleted: Vec<String>,
    /// Keys that did not exist; treated as already deleted.
    pub missing: Vec<String>,
    /// Keys whose deletion failed; the errors were logged.
    pub failed: Vec<String>,
}

impl DeletionReport {
    /// No key is left behind because of an error.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn total(&self) -> usize {
        self.deleted.len() + self.missing.len() + self.failed.len()
    }
}

enum Outcome {
    Deleted,
    Missing,
    Failed,
}

#[derive(Clone)]
pub struct DeletionPipeline {
    storage: Arc<dyn Storage>,
    variants: ThumbnailVariants,
}

impl DeletionPipeline {
    pub fn new(storage: Arc<dyn Storage>, variants: ThumbnailVariants) -> Self {
        Self { storage, variants }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::new(storage, config.thumbnail_variants().clone())
    }

    /// Delete `{file_path}/{file_name}` and its thumbnail for every configured variant.
    ///
    /// Deletes run concurrently. Missing objects count as deleted; other
    /// failures are logged and reported, never returned.
    #[tracing::instrument(skip(self), fields(delete.path = %file_path, delete.name = %file_name))]
    pub async fn delete(&self, file_path: &str, file_name: &str) -> DeletionReport {
        let paths = FilePathSet::from_stored_name(file_path, file_name, self.variants.iter());
        let keys = paths.all_keys();

        let outcomes = join_all(keys.iter().map(|key| self.delete_one(key))).await;

        let mut report = DeletionReport::default();
        for (key, outcome) in keys.into_iter().zip(outcomes) {
            let key = key.to_string();
            match outcome {
                Outcome::Deleted => report.deleted.push(key),
                Outcome::Missing => report.missing.push(key),
                Outcome::Failed => report.failed.push(key),
            }
        }

        tracing::info!(
            deleted = report.deleted.len(),
            missing = report.missing.len(),
            failed = report.failed.len(),
            "Deletion finished"
        );

        report
    }

    async fn delete_one(&self, key: &str) -> Outcome {
        match self.storage.delete(key).await {
            Ok(()) => Outcome::Deleted,
            Err(e) if e.is_not_found() => {
                tracing::debug!(key = %key, "Object already absent");
                Outcome::Missing
            }
            Err(e) => {
                tracing::error!(
                    error = %e,
                    uri = %self.storage.object_uri(key),
                    "Failed to delete object"
                );
                Outcome::Failed
            }
        }
    }
}

//! Upload pipeline: original transfer with progress, then thumbnail resolution.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use korekenke_core::constants::{TRANSFER_PROGRESS_CAP, UPLOAD_FAILURE_SETTLE_MS};
use korekenke_core::{
    AppError, Config, ThumbnailVariants, UploadResult, UploadSource, UploadStatus, UploadTask,
};
use korekenke_storage::keys::{split_file_name, stored_name_round_trips};
use korekenke_storage::{FilePathSet, Storage, StorageError};
use thiserror::Error;
use tokio::time::sleep;

use crate::thumbnail::{poll_thumbnail_url, RetryPolicy, ThumbnailError};

/// Upload progress observer, in percent (0-100).
pub type UploadProgressFn<'a> = &'a (dyn Fn(f64) + Send + Sync);

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Invalid upload source: {0}")]
    InvalidSource(String),

    #[error("Unknown resize variant '{variant}' (configured: {configured})")]
    UnknownVariant { variant: String, configured: String },

    #[error("Failed to read {}: {source}", path.display())]
    ReadSource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Transfer of {key} failed: {source}")]
    Transfer {
        key: String,
        #[source]
        source: StorageError,
    },

    /// The original is stored but the upload could not be completed.
    /// `file` carries the partial result, flagged as a failure.
    #[error("Upload of {} could not be completed: {source}", file.name)]
    Finalize {
        file: Box<UploadResult>,
        #[source]
        source: ThumbnailError,
    },
}

impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match err {
            UploadError::InvalidSource(_) | UploadError::UnknownVariant { .. } => {
                AppError::InvalidInput(err.to_string())
            }
            UploadError::ReadSource { .. } => AppError::InternalWithSource {
                message: err.to_string(),
                source: err.into(),
            },
            UploadError::Transfer { .. } | UploadError::Finalize { .. } => {
                AppError::UploadFailed(err.to_string())
            }
        }
    }
}

/// Transfer progress scaled so that only a completed upload reaches 100.
fn transfer_percent(transferred: u64, total: u64) -> f64 {
    if total == 0 {
        return TRANSFER_PROGRESS_CAP;
    }
    let ratio = transferred.min(total) as f64 / total as f64;
    ratio * TRANSFER_PROGRESS_CAP
}

/// Validated inputs of one upload.
struct PreparedUpload {
    uid: String,
    content_type: String,
    data: Bytes,
    paths: FilePathSet,
}

#[derive(Clone)]
pub struct UploadPipeline {
    storage: Arc<dyn Storage>,
    variants: ThumbnailVariants,
    retry_policy: RetryPolicy,
    settle_delay: Duration,
}

impl UploadPipeline {
    pub fn new(storage: Arc<dyn Storage>, variants: ThumbnailVariants) -> Self {
        Self {
            storage,
            variants,
            retry_policy: RetryPolicy::default(),
            settle_delay: Duration::from_millis(UPLOAD_FAILURE_SETTLE_MS),
        }
    }

    pub fn from_config(storage: Arc<dyn Storage>, config: &Config) -> Self {
        Self::new(storage, config.thumbnail_variants().clone())
            .with_retry_policy(RetryPolicy::from_config(config))
            .with_settle_delay(config.upload_failure_settle_delay())
    }

    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Wait applied before a post-transfer failure is returned.
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Upload the task's source and, for images, wait for its thumbnail.
    ///
    /// Progress climbs to at most 95 while bytes are transferred and reaches
    /// 100 only after the upload fully succeeds. Validation and transfer errors
    /// return immediately; failures after the transfer are returned after the
    /// settle delay as [`UploadError::Finalize`].
    #[tracing::instrument(
        skip(self, task, progress),
        fields(upload.uid = %task.source.uid(), upload.path = %task.file_path)
    )]
    pub async fn upload(
        &self,
        task: UploadTask,
        progress: UploadProgressFn<'_>,
    ) -> Result<UploadResult, UploadError> {
        let is_image = task.is_image;
        let variant = task.resize_variant.clone();
        let prepared = self.prepare(task).await?;
        let start = std::time::Instant::now();
        let size = prepared.data.len();

        let report = |transferred: u64, total: u64| progress(transfer_percent(transferred, total));
        let url = self
            .storage
            .put(
                &prepared.paths.original,
                &prepared.content_type,
                prepared.data,
                &report,
            )
            .await
            .map_err(|source| {
                tracing::error!(
                    error = %source,
                    key = %prepared.paths.original,
                    "Upload transfer failed"
                );
                UploadError::Transfer {
                    key: prepared.paths.original.clone(),
                    source,
                }
            })?;

        let mut file = UploadResult {
            uid: prepared.uid,
            name: prepared.paths.original_name().to_string(),
            url: Some(url),
            thumb_url: None,
            status: UploadStatus::Success,
        };

        if is_image {
            // `prepare` derived exactly one thumbnail key for the task's variant
            let thumbnail_key = prepared.paths.thumbnail(&variant).unwrap_or_default();
            match poll_thumbnail_url(self.storage.as_ref(), thumbnail_key, self.retry_policy).await
            {
                Ok(thumb_url) => file.thumb_url = Some(thumb_url),
                Err(source) => return Err(self.finalize_failure(file, source).await),
            }
        }

        progress(100.0);

        tracing::info!(
            key = %prepared.paths.original,
            size_bytes = size,
            has_thumbnail = file.thumb_url.is_some(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Upload completed"
        );

        Ok(file)
    }

    async fn prepare(&self, task: UploadTask) -> Result<PreparedUpload, UploadError> {
        task.source.validate().map_err(UploadError::InvalidSource)?;

        if !self.variants.contains(&task.resize_variant) {
            return Err(UploadError::UnknownVariant {
                variant: task.resize_variant,
                configured: self.variants.to_string(),
            });
        }

        let source_name = task
            .source
            .name()
            .ok_or_else(|| UploadError::InvalidSource("upload source has no file name".into()))?;
        let (stem, extension) = split_file_name(&source_name);
        let file_name = task
            .file_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(stem);
        if file_name.contains('/') {
            return Err(UploadError::InvalidSource(format!(
                "file name '{}' must not contain '/'",
                file_name
            )));
        }
        if !stored_name_round_trips(file_name, extension) {
            return Err(UploadError::InvalidSource(format!(
                "file name '{}' contains a dot but the source has no extension",
                file_name
            )));
        }

        let paths = FilePathSet::new(
            &task.file_path,
            file_name,
            extension,
            [task.resize_variant.as_str()],
        );
        let content_type = task.source.content_type();
        let uid = task.source.uid().to_string();
        let data = load_source(task.source).await?;

        Ok(PreparedUpload {
            uid,
            content_type,
            data,
            paths,
        })
    }

    async fn finalize_failure(&self, mut file: UploadResult, source: ThumbnailError) -> UploadError {
        tracing::error!(
            error = %source,
            name = %file.name,
            settle_ms = self.settle_delay.as_millis() as u64,
            "Upload could not be completed"
        );
        sleep(self.settle_delay).await;
        file.status = UploadStatus::Failure;
        UploadError::Finalize {
            file: Box::new(file),
            source,
        }
    }
}

async fn load_source(source: UploadSource) -> Result<Bytes, UploadError> {
    match source {
        UploadSource::Memory { data, .. } => Ok(data),
        UploadSource::LocalFile { path, .. } => {
            let metadata = tokio::fs::metadata(&path).await.map_err(|_| {
                UploadError::InvalidSource(format!("{} does not exist", path.display()))
            })?;
            if !metadata.is_file() {
                return Err(UploadError::InvalidSource(format!(
                    "{} is not a regular file",
                    path.display()
                )));
            }
            let data = tokio::fs::read(&path)
                .await
                .map_err(|source| UploadError::ReadSource { path, source })?;
            Ok(Bytes::from(data))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::MockStorage;
    use std::sync::Mutex;
    use tokio::time::Instant;

    const ORIGINAL: &str = "reservations/42/photo.jpg";
    const THUMB: &str = "reservations/42/thumbs/photo_200x200.webp";

    fn pipeline(storage: &Arc<MockStorage>) -> UploadPipeline {
        let variants = ThumbnailVariants::new(["200x200", "400x400"]).unwrap();
        UploadPipeline::new(storage.clone(), variants)
    }

    fn task(data: &'static [u8], is_image: bool) -> UploadTask {
        UploadTask {
            file_path: "reservations/42".to_string(),
            file_name: None,
            resize_variant: "200x200".to_string(),
            is_image,
            source: UploadSource::Memory {
                uid: "rc-upload-1".to_string(),
                name: "photo.jpg".to_string(),
                content_type: None,
                data: Bytes::from_static(data),
            },
        }
    }

    fn recorder() -> Mutex<Vec<f64>> {
        Mutex::new(Vec::new())
    }

    #[tokio::test(start_paused = true)]
    async fn uploads_image_and_resolves_thumbnail() {
        let storage = Arc::new(MockStorage::new());
        storage.set_file_after_lookups(THUMB, b"thumb".to_vec(), 2);
        let seen = recorder();

        let result = pipeline(&storage)
            .upload(task(b"0123456789abcdef", true), &|p| seen.lock().unwrap().push(p))
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.uid, "rc-upload-1");
        assert_eq!(result.name, "photo.jpg");
        assert_eq!(result.url.as_deref(), Some("https://example.com/reservations/42/photo.jpg"));
        assert_eq!(
            result.thumb_url.as_deref(),
            Some("https://example.com/reservations/42/thumbs/photo_200x200.webp")
        );
        assert!(storage.has_file(ORIGINAL));

        let seen = seen.into_inner().unwrap();
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(seen.last(), Some(&100.0));
        assert!(seen[..seen.len() - 1].iter().all(|p| *p <= 95.0));
        assert_eq!(seen[seen.len() - 2], 95.0);
    }

    #[tokio::test(start_paused = true)]
    async fn non_image_upload_skips_thumbnail_polling() {
        let storage = Arc::new(MockStorage::new());

        let result = pipeline(&storage)
            .upload(task(b"%PDF", false), &|_| {})
            .await
            .unwrap();

        assert!(result.is_success());
        assert_eq!(result.thumb_url, None);
        assert_eq!(storage.download_url_calls(THUMB), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn empty_file_reports_cap_then_completion() {
        let storage = Arc::new(MockStorage::new());
        let seen = recorder();

        pipeline(&storage)
            .upload(task(b"", false), &|p| seen.lock().unwrap().push(p))
            .await
            .unwrap();

        assert_eq!(seen.into_inner().unwrap(), vec![95.0, 100.0]);
    }

    #[tokio::test(start_paused = true)]
    async fn explicit_file_name_keeps_source_extension() {
        let storage = Arc::new(MockStorage::new());
        let mut task = task(b"data", false);
        task.file_name = Some("cover".to_string());

        let result = pipeline(&storage).upload(task, &|_| {}).await.unwrap();

        assert_eq!(result.name, "cover.jpg");
        assert!(storage.has_file("reservations/42/cover.jpg"));
    }

    #[tokio::test(start_paused = true)]
    async fn dotted_name_for_extensionless_source_is_rejected() {
        let storage = Arc::new(MockStorage::new());
        let mut task = task(b"notes", true);
        task.file_path = "docs".to_string();
        task.file_name = Some("v1.2".to_string());
        task.source = UploadSource::Memory {
            uid: "rc-readme".to_string(),
            name: "README".to_string(),
            content_type: None,
            data: Bytes::from_static(b"notes"),
        };

        let err = pipeline(&storage).upload(task, &|_| {}).await.unwrap_err();

        assert!(matches!(err, UploadError::InvalidSource(_)));
        assert_eq!(storage.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_variant_fails_before_any_storage_call() {
        let storage = Arc::new(MockStorage::new());
        let mut task = task(b"data", true);
        task.resize_variant = "999x999".to_string();

        let err = pipeline(&storage).upload(task, &|_| {}).await.unwrap_err();

        assert!(matches!(err, UploadError::UnknownVariant { .. }));
        assert_eq!(storage.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_source_fails_before_any_storage_call() {
        let storage = Arc::new(MockStorage::new());
        let mut missing_uid = task(b"data", false);
        missing_uid.source = UploadSource::Memory {
            uid: String::new(),
            name: "photo.jpg".to_string(),
            content_type: None,
            data: Bytes::new(),
        };
        let err = pipeline(&storage)
            .upload(missing_uid, &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidSource(_)));

        let mut missing_file = task(b"data", false);
        missing_file.source = UploadSource::LocalFile {
            uid: "rc-9".to_string(),
            path: PathBuf::from("/definitely/not/here.jpg"),
        };
        let err = pipeline(&storage)
            .upload(missing_file, &|_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::InvalidSource(_)));

        assert_eq!(storage.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn transfer_failure_returns_without_delay() {
        let storage = Arc::new(MockStorage::new());
        storage.fail_puts();
        let start = Instant::now();

        let err = pipeline(&storage)
            .upload(task(b"data", true), &|_| {})
            .await
            .unwrap_err();

        assert!(matches!(err, UploadError::Transfer { .. }));
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(storage.download_url_calls(THUMB), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_thumbnail_fails_after_retries_and_settle_delay() {
        let storage = Arc::new(MockStorage::new());
        let seen = recorder();
        let start = Instant::now();

        let err = pipeline(&storage)
            .upload(task(b"data", true), &|p| seen.lock().unwrap().push(p))
            .await
            .unwrap_err();

        // 10 retry waits of 1s, then the 5s settle delay
        assert_eq!(start.elapsed(), Duration::from_secs(15));
        assert_eq!(storage.download_url_calls(THUMB), 11);
        match err {
            UploadError::Finalize { file, source } => {
                assert_eq!(file.status, UploadStatus::Failure);
                assert_eq!(file.name, "photo.jpg");
                assert!(file.url.is_some());
                assert!(file.thumb_url.is_none());
                assert!(matches!(source, ThumbnailError::OutOfTries { attempts: 11, .. }));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(seen.into_inner().unwrap().iter().all(|p| *p <= 95.0));
    }

    #[tokio::test(start_paused = true)]
    async fn settle_delay_and_retries_are_configurable() {
        let storage = Arc::new(MockStorage::new());
        storage.fail_key(THUMB);
        let start = Instant::now();

        let err = pipeline(&storage)
            .with_retry_policy(RetryPolicy::new(2, Duration::from_millis(10)))
            .with_settle_delay(Duration::from_millis(250))
            .upload(task(b"data", true), &|_| {})
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UploadError::Finalize {
                source: ThumbnailError::Storage { .. },
                ..
            }
        ));
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[test]
    fn transfer_percent_is_capped() {
        assert_eq!(transfer_percent(0, 100), 0.0);
        assert_eq!(transfer_percent(50, 100), 47.5);
        assert_eq!(transfer_percent(100, 100), 95.0);
        assert_eq!(transfer_percent(150, 100), 95.0);
        assert_eq!(transfer_percent(0, 0), 95.0);
    }
}

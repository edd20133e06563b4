use crate::keys::validate_key;
use crate::traits::{ProgressFn, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use aws_config::meta::region::RegionProviderChain;
use aws_config::retry::{RetryConfig, RetryMode};
use aws_config::BehaviorVersion;
use aws_sdk_s3::error::SdkError;
use aws_sdk_s3::operation::get_object::GetObjectError;
use aws_sdk_s3::operation::head_object::HeadObjectError;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use aws_sdk_s3::Client;
use bytes::Bytes;

/// Objects above this size are sent as multipart uploads, one progress report per part.
const MULTIPART_THRESHOLD: usize = 5 * 1024 * 1024; // 5MB
/// Minimum part size accepted by S3 (except for the last part)
const PART_SIZE: usize = 5 * 1024 * 1024;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    client: Client,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let region_provider =
            RegionProviderChain::first_try(aws_config::Region::new(region.clone()));

        let retry_config = RetryConfig::standard()
            .with_max_attempts(5)
            .with_retry_mode(RetryMode::Adaptive);

        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region_provider)
            .retry_config(retry_config)
            .load()
            .await;

        let mut s3_config_builder = aws_sdk_s3::config::Builder::from(&config);
        if let Some(ref endpoint) = endpoint_url {
            // Path-style addressing is required by MinIO and most S3-compatible providers
            s3_config_builder = s3_config_builder
                .endpoint_url(endpoint)
                .force_path_style(true);
        }
        let client = Client::from_conf(s3_config_builder.build());

        Ok(S3Storage {
            client,
            bucket,
            region,
            endpoint_url,
        })
    }

    /// Generate public URL for S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{key}
    /// For S3-compatible providers, uses path-style: {endpoint}/{bucket}/{key}
    fn generate_url(&self, key: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, key)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, key
            )
        }
    }

    async fn put_single(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        progress: ProgressFn<'_>,
    ) -> StorageResult<()> {
        let size = data.len() as u64;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .body(ByteStream::from(data))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        progress(size, size);
        Ok(())
    }

    async fn put_multipart(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        progress: ProgressFn<'_>,
    ) -> StorageResult<()> {
        let total = data.len() as u64;

        let create_result = self
            .client
            .create_multipart_upload()
            .bucket(&self.bucket)
            .key(storage_key)
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

        let upload_id = create_result.upload_id().ok_or_else(|| {
            StorageError::UploadFailed("No upload ID returned from S3".to_string())
        })?;

        match self
            .upload_parts(storage_key, upload_id, &data, total, progress)
            .await
        {
            Ok(parts) => {
                let completed_parts = CompletedMultipartUpload::builder()
                    .set_parts(Some(parts))
                    .build();

                self.client
                    .complete_multipart_upload()
                    .bucket(&self.bucket)
                    .key(storage_key)
                    .upload_id(upload_id)
                    .multipart_upload(completed_parts)
                    .send()
                    .await
                    .map_err(|e| StorageError::UploadFailed(e.to_string()))?;

                Ok(())
            }
            Err(e) => {
                if let Err(abort_err) = self
                    .client
                    .abort_multipart_upload()
                    .bucket(&self.bucket)
                    .key(storage_key)
                    .upload_id(upload_id)
                    .send()
                    .await
                {
                    tracing::warn!(
                        error = %abort_err,
                        bucket = %self.bucket,
                        key = %storage_key,
                        "Failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        storage_key: &str,
        upload_id: &str,
        data: &Bytes,
        total: u64,
        progress: ProgressFn<'_>,
    ) -> StorageResult<Vec<CompletedPart>> {
        let mut parts = Vec::new();
        let mut transferred = 0u64;

        for (index, offset) in (0..data.len()).step_by(PART_SIZE).enumerate() {
            let part_number = (index + 1) as i32;
            let end = (offset + PART_SIZE).min(data.len());
            let part_data = data.slice(offset..end);
            let part_len = part_data.len() as u64;

            let upload_part_result = self
                .client
                .upload_part()
                .bucket(&self.bucket)
                .key(storage_key)
                .upload_id(upload_id)
                .part_number(part_number)
                .body(ByteStream::from(part_data))
                .send()
                .await
                .map_err(|e| {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %storage_key,
                        part_number = part_number,
                        "Failed to upload part"
                    );
                    StorageError::UploadFailed(e.to_string())
                })?;

            let etag = upload_part_result
                .e_tag()
                .ok_or_else(|| {
                    StorageError::UploadFailed(format!(
                        "No ETag returned for part {}",
                        part_number
                    ))
                })?
                .to_string();

            parts.push(
                CompletedPart::builder()
                    .part_number(part_number)
                    .e_tag(etag)
                    .build(),
            );

            transferred += part_len;
            progress(transferred, total);
        }

        Ok(parts)
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn put(
        &self,
        storage_key: &str,
        content_type: &str,
        data: Bytes,
        progress: ProgressFn<'_>,
    ) -> StorageResult<String> {
        validate_key(storage_key)?;
        let size = data.len() as u64;
        let start = std::time::Instant::now();

        let result = if data.len() > MULTIPART_THRESHOLD {
            self.put_multipart(storage_key, content_type, data, progress)
                .await
        } else {
            self.put_single(storage_key, content_type, data, progress)
                .await
        };

        if let Err(ref e) = result {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
        }
        result?;

        let url = self.generate_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn download_url(&self, storage_key: &str) -> StorageResult<String> {
        if self.exists(storage_key).await? {
            Ok(self.generate_url(storage_key))
        } else {
            Err(StorageError::NotFound(storage_key.to_string()))
        }
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();

        let response = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| match &e {
                SdkError::ServiceError(service_err)
                    if matches!(service_err.err(), GetObjectError::NoSuchKey(_)) =>
                {
                    StorageError::NotFound(storage_key.to_string())
                }
                _ => {
                    tracing::error!(
                        error = %e,
                        bucket = %self.bucket,
                        key = %storage_key,
                        duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                        "S3 download failed"
                    );
                    StorageError::DownloadFailed(e.to_string())
                }
            })?;

        let data = response
            .body
            .collect()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        let bytes = data.into_bytes().to_vec();

        tracing::debug!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();

        // S3 reports success for missing keys, so NotFound never surfaces here
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %storage_key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                StorageError::DeleteFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(storage_key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) => match &e {
                SdkError::ServiceError(service_err) => match service_err.err() {
                    HeadObjectError::NotFound(_) => Ok(false),
                    _ => Err(StorageError::BackendError(e.to_string())),
                },
                _ => Err(StorageError::BackendError(e.to_string())),
            },
        }
    }

    fn object_uri(&self, storage_key: &str) -> String {
        format!("s3://{}/{}", self.bucket, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}

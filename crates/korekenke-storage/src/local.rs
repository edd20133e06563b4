use crate::keys::validate_key;
use crate::traits::{ProgressFn, Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Bytes written between progress reports.
const WRITE_CHUNK_SIZE: usize = 64 * 1024;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/korekenke/files")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:8080/files")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path with security validation
    ///
    /// Rejects keys with traversal segments and keys whose existing target
    /// resolves (e.g. through a symlink) outside the base directory.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        validate_key(storage_key)?;

        let path = self.base_path.join(storage_key);

        if let Ok(canonical) = path.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidKey(
                    "Storage key resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(path)
    }

    /// Generate public URL for file
    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), key)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }

    async fn is_file(path: &Path) -> bool {
        fs::metadata(path)
            .await
            .map(|meta| meta.is_file())
            .unwrap_or(false)
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn put(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: Bytes,
        progress: ProgressFn<'_>,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let total = data.len() as u64;

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let mut written = 0u64;
        for chunk in data.chunks(WRITE_CHUNK_SIZE) {
            file.write_all(chunk).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "Failed to write file {}: {}",
                    path.display(),
                    e
                ))
            })?;
            written += chunk.len() as u64;
            progress(written, total);
        }

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        if total == 0 {
            progress(0, 0);
        }

        let url = self.generate_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = total,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn download_url(&self, storage_key: &str) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        if !Self::is_file(&path).await {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }
        Ok(self.generate_url(storage_key))
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !Self::is_file(&path).await {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        let data = fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        tracing::debug!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage download successful"
        );

        Ok(data)
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let path = self.key_to_path(storage_key)?;
        let start = std::time::Instant::now();

        if !Self::is_file(&path).await {
            return Err(StorageError::NotFound(storage_key.to_string()));
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(Self::is_file(&path).await)
    }

    fn object_uri(&self, storage_key: &str) -> String {
        format!("file://{}", self.base_path.join(storage_key).display())
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;
    use crate::traits::no_progress;
    use std::sync::Mutex;
    use tempfile::tempdir;

    async fn storage(dir: &Path) -> LocalStorage {
        LocalStorage::new(dir, "http://localhost:8080/files/".to_string())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_local_storage_put_download() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let data = Bytes::from_static(b"test data");

        let url = storage
            .put("docs/test.txt", "text/plain", data.clone(), &no_progress)
            .await
            .unwrap();

        assert_eq!(url, "http://localhost:8080/files/docs/test.txt");
        assert_eq!(storage.download("docs/test.txt").await.unwrap(), data.to_vec());
        assert_eq!(storage.download_url("docs/test.txt").await.unwrap(), url);
    }

    #[tokio::test]
    async fn test_put_reports_monotonic_progress() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;
        let data = Bytes::from(vec![7u8; WRITE_CHUNK_SIZE * 2 + 10]);
        let seen = Mutex::new(Vec::new());

        storage
            .put("big.bin", "application/octet-stream", data.clone(), &|done, total| {
                seen.lock().unwrap().push((done, total))
            })
            .await
            .unwrap();

        let seen = seen.into_inner().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0].0 <= w[1].0));
        assert_eq!(seen.last(), Some(&(data.len() as u64, data.len() as u64)));
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let result = storage.download("../../../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.delete("../etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));

        let result = storage.exists("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }

    #[tokio::test]
    async fn test_missing_objects_are_not_found() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        let err = storage.delete("nonexistent/file.txt").await.unwrap_err();
        assert!(err.is_not_found());

        let err = storage.download_url("thumbs/a_200x200.webp").await.unwrap_err();
        assert!(err.is_not_found());

        assert!(!storage.exists("nonexistent.txt").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_removes_file() {
        let dir = tempdir().unwrap();
        let storage = storage(dir.path()).await;

        storage
            .put("a/b.txt", "text/plain", Bytes::from_static(b"x"), &no_progress)
            .await
            .unwrap();
        assert!(storage.exists("a/b.txt").await.unwrap());

        storage.delete("a/b.txt").await.unwrap();
        assert!(!storage.exists("a/b.txt").await.unwrap());
        assert!(storage.object_uri("a/b.txt").starts_with("file://"));
    }
}

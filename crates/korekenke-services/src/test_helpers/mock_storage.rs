//! Mock Storage implementation for testing

use async_trait::async_trait;
use korekenke_storage::{ProgressFn, Storage, StorageBackend, StorageError, StorageResult};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Bytes per simulated transfer chunk.
pub const MOCK_CHUNK_SIZE: usize = 4;

#[derive(Default)]
struct State {
    files: HashMap<String, Vec<u8>>,
    /// Objects that appear after the given number of `download_url` lookups.
    pending: HashMap<String, (Vec<u8>, usize)>,
    failing: HashSet<String>,
    fail_puts: bool,
    put_calls: usize,
    delete_calls: usize,
    download_url_calls: HashMap<String, usize>,
}

/// Mock storage implementation that stores files in memory
#[derive(Default)]
pub struct MockStorage {
    state: Mutex<State>,
}

impl MockStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a file in the mock storage
    pub fn set_file(&self, key: &str, data: Vec<u8>) {
        self.state
            .lock()
            .unwrap()
            .files
            .insert(key.to_string(), data);
    }

    /// Make `key` visible only after `lookups` `download_url` calls have missed it.
    pub fn set_file_after_lookups(&self, key: &str, data: Vec<u8>, lookups: usize) {
        self.state
            .lock()
            .unwrap()
            .pending
            .insert(key.to_string(), (data, lookups));
    }

    /// Every operation on `key` fails with a backend error.
    pub fn fail_key(&self, key: &str) {
        self.state.lock().unwrap().failing.insert(key.to_string());
    }

    /// Every `put` fails with an upload error.
    pub fn fail_puts(&self) {
        self.state.lock().unwrap().fail_puts = true;
    }

    /// Check if a file exists in the mock storage
    pub fn has_file(&self, key: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(key)
    }

    /// Get file data (for test assertions)
    pub fn get_file(&self, key: &str) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(key).cloned()
    }

    pub fn put_calls(&self) -> usize {
        self.state.lock().unwrap().put_calls
    }

    pub fn delete_calls(&self) -> usize {
        self.state.lock().unwrap().delete_calls
    }

    pub fn download_url_calls(&self, key: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .download_url_calls
            .get(key)
            .copied()
            .unwrap_or(0)
    }

    /// Total storage calls of any kind.
    pub fn total_calls(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.put_calls + state.delete_calls + state.download_url_calls.values().sum::<usize>()
    }

    fn check_failing(state: &State, key: &str) -> StorageResult<()> {
        if state.failing.contains(key) {
            return Err(StorageError::BackendError(format!(
                "simulated failure for {}",
                key
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for MockStorage {
    async fn put(
        &self,
        storage_key: &str,
        _content_type: &str,
        data: bytes::Bytes,
        progress: ProgressFn<'_>,
    ) -> StorageResult<String> {
        {
            let mut state = self.state.lock().unwrap();
            state.put_calls += 1;
            if state.fail_puts {
                return Err(StorageError::UploadFailed("simulated upload failure".to_string()));
            }
            Self::check_failing(&state, storage_key)?;
        }

        let total = data.len() as u64;
        let mut sent = 0u64;
        for chunk in data.chunks(MOCK_CHUNK_SIZE) {
            sent += chunk.len() as u64;
            progress(sent, total);
        }
        if total == 0 {
            progress(0, 0);
        }

        self.set_file(storage_key, data.to_vec());
        Ok(format!("https://example.com/{}", storage_key))
    }

    async fn download_url(&self, storage_key: &str) -> StorageResult<String> {
        let mut state = self.state.lock().unwrap();
        *state
            .download_url_calls
            .entry(storage_key.to_string())
            .or_insert(0) += 1;
        Self::check_failing(&state, storage_key)?;

        if let Some((_, remaining)) = state.pending.get_mut(storage_key) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(StorageError::NotFound(storage_key.to_string()));
            }
            if let Some((data, _)) = state.pending.remove(storage_key) {
                state.files.insert(storage_key.to_string(), data);
            }
        }

        if state.files.contains_key(storage_key) {
            Ok(format!("https://example.com/{}", storage_key))
        } else {
            Err(StorageError::NotFound(storage_key.to_string()))
        }
    }

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>> {
        let state = self.state.lock().unwrap();
        Self::check_failing(&state, storage_key)?;
        state
            .files
            .get(storage_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))
    }

    async fn delete(&self, storage_key: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        state.delete_calls += 1;
        Self::check_failing(&state, storage_key)?;
        state
            .files
            .remove(storage_key)
            .ok_or_else(|| StorageError::NotFound(storage_key.to_string()))?;
        Ok(())
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        Ok(self.state.lock().unwrap().files.contains_key(storage_key))
    }

    fn object_uri(&self, storage_key: &str) -> String {
        format!("mock://{}", storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

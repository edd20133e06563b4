use std::path::PathBuf;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Content to upload, tagged by where its bytes live.
///
/// Both variants carry a client-side `uid` used to correlate the result with
/// UI state; it is never part of the storage path.
#[derive(Debug, Clone)]
pub enum UploadSource {
    /// Bytes already in memory (e.g. a multipart form field).
    Memory {
        uid: String,
        name: String,
        content_type: Option<String>,
        data: Bytes,
    },
    /// A file on the local filesystem, read when the upload starts.
    LocalFile { uid: String, path: PathBuf },
}

impl UploadSource {
    pub fn uid(&self) -> &str {
        match self {
            UploadSource::Memory { uid, .. } | UploadSource::LocalFile { uid, .. } => uid,
        }
    }

    /// Original file name including extension, if one can be determined.
    pub fn name(&self) -> Option<String> {
        match self {
            UploadSource::Memory { name, .. } => Some(name.clone()),
            UploadSource::LocalFile { path, .. } => path
                .file_name()
                .and_then(|n| n.to_str())
                .map(str::to_string),
        }
    }

    /// Explicit content type, or one inferred from the name's extension.
    pub fn content_type(&self) -> String {
        if let UploadSource::Memory {
            content_type: Some(ct),
            ..
        } = self
        {
            return ct.clone();
        }
        let ext = self
            .name()
            .and_then(|n| n.rsplit_once('.').map(|(_, ext)| ext.to_lowercase()))
            .unwrap_or_default();
        content_type_for_extension(&ext).to_string()
    }

    /// Structural checks that need no I/O: a non-empty uid and a usable name.
    pub fn validate(&self) -> Result<(), String> {
        if self.uid().trim().is_empty() {
            return Err("upload source has an empty uid".to_string());
        }
        match self.name() {
            Some(name) if !name.trim().is_empty() => Ok(()),
            _ => Err("upload source has no file name".to_string()),
        }
    }
}

fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "json" => "application/json",
        _ => "application/octet-stream",
    }
}

/// One user-initiated upload.
#[derive(Debug, Clone)]
pub struct UploadTask {
    /// Directory (storage prefix) the original is written under.
    pub file_path: String,
    /// Base name without extension; derived from the source name when absent.
    pub file_name: Option<String>,
    /// Thumbnail variant to wait for when `is_image` is set.
    pub resize_variant: String,
    pub is_image: bool,
    pub source: UploadSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Success,
    Failure,
}

/// Outcome of an upload, shaped for UI file lists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResult {
    pub uid: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    pub status: UploadStatus,
}

impl UploadResult {
    pub fn is_success(&self) -> bool {
        self.status == UploadStatus::Success
    }
}

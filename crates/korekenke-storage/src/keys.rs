//! Shared key generation for originals and their thumbnails.
//!
//! - original: `{file_path}/{file_name}.{ext}`
//! - thumbnail: `{file_path}/thumbs/{file_name}_{variant}.webp`
//!
//! The upload pipeline and the deletion pipeline both derive keys here, so a
//! thumbnail written for one is always found by the other.

use korekenke_core::constants::{THUMBNAIL_EXTENSION, THUMBS_DIR};

use crate::{StorageError, StorageResult};

/// Split `name.ext` into `("name", Some("ext"))`.
///
/// Only the last dot counts. Names without a dot, or whose only dot is the
/// first character (`.env`), have no extension.
pub fn split_file_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext)),
        _ => (name, None),
    }
}

/// Trim surrounding slashes and collapse empty segments: `"/a//b/"` -> `"a/b"`.
pub fn normalize_dir(file_path: &str) -> String {
    file_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

fn stored_name(file_name: &str, extension: Option<&str>) -> String {
    match extension {
        Some(ext) => format!("{}.{}", file_name, ext),
        None => file_name.to_string(),
    }
}

/// Whether a file stored as `file_name` plus `extension` splits back into the
/// same parts.
///
/// An extensionless `v1.2` is stored as `v1.2` but splits into `v1` and `2`,
/// so a later delete would derive thumbnail keys that were never written.
pub fn stored_name_round_trips(file_name: &str, extension: Option<&str>) -> bool {
    split_file_name(&stored_name(file_name, extension)) == (file_name, extension)
}

fn join(dir: &str, name: &str) -> String {
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", dir, name)
    }
}

/// Reject keys that could escape the storage root.
pub fn validate_key(key: &str) -> StorageResult<()> {
    if key.is_empty() {
        return Err(StorageError::InvalidKey("Storage key is empty".to_string()));
    }
    if key.starts_with('/') || key.split('/').any(|segment| segment == "..") {
        return Err(StorageError::InvalidKey(
            "Storage key contains invalid characters".to_string(),
        ));
    }
    Ok(())
}

/// Thumbnail key for one resize variant
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThumbnailPath {
    pub variant: String,
    pub key: String,
}

/// Every storage key belonging to one uploaded file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePathSet {
    pub original: String,
    pub thumbnails: Vec<ThumbnailPath>,
}

impl FilePathSet {
    /// Derive the original key and one thumbnail key per variant.
    pub fn new<'a, I>(file_path: &str, file_name: &str, extension: Option<&str>, variants: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let dir = normalize_dir(file_path);
        let original_name = stored_name(file_name, extension);
        let thumbs_dir = join(&dir, THUMBS_DIR);

        let thumbnails = variants
            .into_iter()
            .map(|variant| ThumbnailPath {
                variant: variant.to_string(),
                key: join(
                    &thumbs_dir,
                    &format!("{}_{}.{}", file_name, variant, THUMBNAIL_EXTENSION),
                ),
            })
            .collect();

        FilePathSet {
            original: join(&dir, &original_name),
            thumbnails,
        }
    }

    /// Keys for a stored file name that still carries its extension (`photo.jpg`).
    pub fn from_stored_name<'a, I>(file_path: &str, stored_name: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let (stem, ext) = split_file_name(stored_name);
        Self::new(file_path, stem, ext, variants)
    }

    /// File name of the original, extension included.
    pub fn original_name(&self) -> &str {
        self.original
            .rsplit_once('/')
            .map(|(_, name)| name)
            .unwrap_or(&self.original)
    }

    pub fn thumbnail(&self, variant: &str) -> Option<&str> {
        self.thumbnails
            .iter()
            .find(|t| t.variant == variant)
            .map(|t| t.key.as_str())
    }

    /// Original first, then thumbnails in variant order.
    pub fn all_keys(&self) -> Vec<&str> {
        std::iter::once(self.original.as_str())
            .chain(self.thumbnails.iter().map(|t| t.key.as_str()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_uses_last_dot_only() {
        assert_eq!(split_file_name("photo.final.JPG"), ("photo.final", Some("JPG")));
        assert_eq!(split_file_name("README"), ("README", None));
        assert_eq!(split_file_name(".env"), (".env", None));
        assert_eq!(split_file_name("trailing."), ("trailing.", None));
    }

    #[test]
    fn derives_original_and_thumbnail_keys() {
        let set = FilePathSet::new("/reservations/42/", "contract", Some("png"), ["200x200"]);
        assert_eq!(set.original, "reservations/42/contract.png");
        assert_eq!(
            set.thumbnail("200x200"),
            Some("reservations/42/thumbs/contract_200x200.webp")
        );
        assert_eq!(set.original_name(), "contract.png");
        assert_eq!(set.thumbnail("40x40"), None);
    }

    #[test]
    fn derivation_is_deterministic() {
        let a = FilePathSet::new("users/7", "avatar", Some("jpg"), ["40x40", "80x80"]);
        let b = FilePathSet::new("users/7", "avatar", Some("jpg"), ["40x40", "80x80"]);
        assert_eq!(a, b);
        assert_eq!(
            a.all_keys(),
            vec![
                "users/7/avatar.jpg",
                "users/7/thumbs/avatar_40x40.webp",
                "users/7/thumbs/avatar_80x80.webp",
            ]
        );
    }

    #[test]
    fn thumbnails_always_live_under_thumbs() {
        for dir in ["", "a", "a/b/c", "//a//"] {
            let set = FilePathSet::new(dir, "f", None, ["1x1", "2x2"]);
            for thumb in &set.thumbnails {
                assert!(thumb.key.contains("thumbs/f_"));
                assert!(thumb.key.ends_with(&format!("_{}.webp", thumb.variant)));
            }
        }
        let root = FilePathSet::new("", "f", None, ["1x1"]);
        assert_eq!(root.original, "f");
        assert_eq!(root.thumbnails[0].key, "thumbs/f_1x1.webp");
    }

    #[test]
    fn stored_name_round_trips_to_upload_keys() {
        let uploaded = FilePathSet::new("docs", "invoice", Some("pdf"), ["200x200"]);
        let stored = FilePathSet::from_stored_name("docs", uploaded.original_name(), ["200x200"]);
        assert_eq!(uploaded, stored);

        let bare = FilePathSet::new("docs", "README", None, ["200x200"]);
        let stored = FilePathSet::from_stored_name("docs", bare.original_name(), ["200x200"]);
        assert_eq!(bare, stored);
    }

    #[test]
    fn dotted_name_without_extension_does_not_round_trip() {
        assert!(!stored_name_round_trips("v1.2", None));
        let uploaded = FilePathSet::new("docs", "v1.2", None, ["200x200"]);
        let stored = FilePathSet::from_stored_name("docs", uploaded.original_name(), ["200x200"]);
        assert_ne!(uploaded.thumbnails, stored.thumbnails);

        assert!(stored_name_round_trips("v1.2", Some("pdf")));
        assert!(stored_name_round_trips("README", None));
        assert!(stored_name_round_trips(".env", None));
        assert!(stored_name_round_trips("photo", Some("jpg")));
    }

    #[test]
    fn validate_key_rejects_traversal() {
        assert!(validate_key("a/b.txt").is_ok());
        assert!(validate_key("a/..b/c").is_ok());
        assert!(validate_key("../etc/passwd").is_err());
        assert!(validate_key("a/../../b").is_err());
        assert!(validate_key("/etc/passwd").is_err());
        assert!(validate_key("").is_err());
    }
}

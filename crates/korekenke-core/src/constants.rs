//! Application-wide constants.

/// Maximum number of reservations returned by a single list query.
pub const MAX_RESERVATIONS: i64 = 3000;

/// Upload progress is capped at this percentage until the transfer completes.
/// The remainder covers URL resolution and thumbnail polling.
pub const TRANSFER_PROGRESS_CAP: f64 = 95.0;

/// Number of retries after the first thumbnail URL lookup returns not-found.
pub const THUMBNAIL_MAX_RETRIES: u32 = 10;

/// Wait between thumbnail URL lookups.
pub const THUMBNAIL_RETRY_DELAY_MS: u64 = 1000;

/// Wait before a post-transfer upload failure is returned to the caller.
pub const UPLOAD_FAILURE_SETTLE_MS: u64 = 5000;

/// Sub-path (relative to the file's directory) holding generated thumbnails.
pub const THUMBS_DIR: &str = "thumbs";

/// Extension of every generated thumbnail.
pub const THUMBNAIL_EXTENSION: &str = "webp";

/// Resize presets produced by the thumbnail generator when none are configured.
pub const DEFAULT_THUMBNAIL_VARIANTS: &[&str] = &["40x40", "80x80", "200x200", "400x400"];

/// Timezone used to compute "one calendar day" for reservation filters.
pub const DEFAULT_RESERVATIONS_TIMEZONE: &str = "America/Lima";

//! Korekenke Core Library
//!
//! Domain models, error types, configuration and search-token normalisation
//! shared by the storage, services, database and CLI crates.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod search;
pub mod storage_types;

// Re-export commonly used types
pub use config::{AppConfig, BaseConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{
    Reservation, ReservationFilter, ThumbnailVariants, UploadResult, UploadSource, UploadStatus,
    UploadTask,
};
pub use storage_types::StorageBackend;
// Storage, StorageError and StorageResult live in korekenke-storage

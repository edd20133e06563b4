//! Configuration module
//!
//! Settings for storage backends, the upload/deletion pipelines and the
//! reservations database, loaded from environment variables (with `.env` support).

use std::env;
use std::time::Duration;

use chrono_tz::Tz;

use crate::constants::{
    DEFAULT_RESERVATIONS_TIMEZONE, THUMBNAIL_MAX_RETRIES, THUMBNAIL_RETRY_DELAY_MS,
    UPLOAD_FAILURE_SETTLE_MS,
};
use crate::models::ThumbnailVariants;
use crate::storage_types::StorageBackend;

// Common constants
const MAX_CONNECTIONS: u32 = 10;
const CONNECTION_TIMEOUT_SECS: u64 = 30;

/// Base configuration shared by every entry point
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub environment: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_timeout_seconds: u64,
}

/// Storage and pipeline configuration
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: Option<StorageBackend>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Thumbnail / upload pipeline
    pub thumbnail_variants: ThumbnailVariants,
    pub thumbnail_max_retries: u32,
    pub thumbnail_retry_delay_ms: u64,
    pub upload_failure_settle_ms: u64,
    // Reservations
    pub reservations_timezone: Tz,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<AppConfig>);

impl Config {
    fn as_app(&self) -> &AppConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.as_app().base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup (environment, map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config = AppConfig::from_lookup(lookup)?;
        config.validate()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_app().validate()
    }

    pub fn validate_storage(&self) -> Result<(), anyhow::Error> {
        self.as_app().validate_storage()
    }

    pub fn environment(&self) -> &str {
        &self.as_app().base.environment
    }

    pub fn database_url(&self) -> Option<&str> {
        self.as_app().base.database_url.as_deref()
    }

    pub fn db_max_connections(&self) -> u32 {
        self.as_app().base.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.as_app().base.db_timeout_seconds
    }

    pub fn storage_backend(&self) -> Option<StorageBackend> {
        self.as_app().storage_backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.as_app().s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.as_app().s3_region.as_deref()
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.as_app().s3_endpoint.as_deref()
    }

    pub fn aws_region(&self) -> Option<&str> {
        self.as_app().aws_region.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_app().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_app().local_storage_base_url.as_deref()
    }

    pub fn thumbnail_variants(&self) -> &ThumbnailVariants {
        &self.as_app().thumbnail_variants
    }

    pub fn thumbnail_max_retries(&self) -> u32 {
        self.as_app().thumbnail_max_retries
    }

    pub fn thumbnail_retry_delay(&self) -> Duration {
        Duration::from_millis(self.as_app().thumbnail_retry_delay_ms)
    }

    pub fn upload_failure_settle_delay(&self) -> Duration {
        Duration::from_millis(self.as_app().upload_failure_settle_ms)
    }

    pub fn reservations_timezone(&self) -> Tz {
        self.as_app().reservations_timezone
    }
}

fn parse_or<T: std::str::FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}

impl AppConfig {
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = non_empty("ENVIRONMENT")
            .or_else(|| non_empty("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let base = BaseConfig {
            environment,
            database_url: non_empty("DATABASE_URL"),
            db_max_connections: parse_or(lookup("DB_MAX_CONNECTIONS"), MAX_CONNECTIONS),
            db_timeout_seconds: parse_or(lookup("DB_TIMEOUT_SECONDS"), CONNECTION_TIMEOUT_SECS),
        };

        let storage_backend = match non_empty("STORAGE_BACKEND") {
            Some(s) => Some(s.parse::<StorageBackend>()?),
            None => None,
        };

        let thumbnail_variants = match non_empty("THUMBNAIL_VARIANTS") {
            Some(s) => s
                .parse::<ThumbnailVariants>()
                .map_err(|e| anyhow::anyhow!("THUMBNAIL_VARIANTS: {}", e))?,
            None => ThumbnailVariants::default(),
        };

        let reservations_timezone = non_empty("RESERVATIONS_TIMEZONE")
            .unwrap_or_else(|| DEFAULT_RESERVATIONS_TIMEZONE.to_string())
            .parse::<Tz>()
            .map_err(|e| anyhow::anyhow!("RESERVATIONS_TIMEZONE is not a valid timezone: {}", e))?;

        Ok(AppConfig {
            base,
            storage_backend,
            s3_bucket: non_empty("S3_BUCKET"),
            s3_region: non_empty("S3_REGION"),
            s3_endpoint: non_empty("S3_ENDPOINT"),
            aws_region: non_empty("AWS_REGION"),
            local_storage_path: non_empty("LOCAL_STORAGE_PATH"),
            local_storage_base_url: non_empty("LOCAL_STORAGE_BASE_URL"),
            thumbnail_variants,
            thumbnail_max_retries: parse_or(
                lookup("THUMBNAIL_MAX_RETRIES"),
                THUMBNAIL_MAX_RETRIES,
            ),
            thumbnail_retry_delay_ms: parse_or(
                lookup("THUMBNAIL_RETRY_DELAY_MS"),
                THUMBNAIL_RETRY_DELAY_MS,
            ),
            upload_failure_settle_ms: parse_or(
                lookup("UPLOAD_FAILURE_SETTLE_MS"),
                UPLOAD_FAILURE_SETTLE_MS,
            ),
            reservations_timezone,
        })
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if let Some(url) = &self.base.database_url {
            if !url.starts_with("postgres://") && !url.starts_with("postgresql://") {
                return Err(anyhow::anyhow!(
                    "DATABASE_URL must be a valid PostgreSQL connection string"
                ));
            }
        }

        Ok(())
    }

    /// Check that the selected storage backend has everything it needs.
    ///
    /// Only commands that build a backend call this, so database-only use
    /// needs no storage settings.
    pub fn validate_storage(&self) -> Result<(), anyhow::Error> {
        let backend = self.storage_backend.unwrap_or(StorageBackend::S3);
        match backend {
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_BUCKET must be set when using S3 storage backend"
                    ));
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    return Err(anyhow::anyhow!(
                        "S3_REGION or AWS_REGION must be set when using S3 storage backend"
                    ));
                }
            }
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                    ));
                }
            }
        }

        Ok(())
    }
}

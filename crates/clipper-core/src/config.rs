//! Configuration module
//!
//! Settings are read from the process environment (after loading an optional `.env`
//! file) and validated once at startup.

use std::env;
use std::path::PathBuf;

use crate::storage_types::StorageBackend;

const SERVER_PORT: u16 = 8080;
const REQUEST_TIMEOUT_SECS: u64 = 900;
const SHUTDOWN_GRACE_SECS: u64 = 10;
const MAX_CONCURRENT_TRANSCODES: usize = 2;
const DRIVE_API_BASE_URL: &str = "https://www.googleapis.com";

/// Server-level settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub shutdown_grace_secs: u64,
    /// `text` or `json`
    pub log_format: String,
}

/// Clip extraction service configuration
#[derive(Clone, Debug)]
pub struct ClipperConfig {
    pub base: BaseConfig,
    // Storage configuration
    pub storage_backend: StorageBackend,
    pub drive_access_token: Option<String>,
    pub drive_api_base_url: String,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>, // Custom endpoint for S3-compatible providers (MinIO, etc.)
    pub aws_region: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Transcoding
    pub ffmpeg_path: String,
    pub scratch_dir: PathBuf,
    pub max_concurrent_transcodes: usize,
    /// 0 waits until the request deadline cancels the wait.
    pub transcode_queue_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ClipperConfig>);

impl Config {
    fn inner(&self) -> &ClipperConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let environment = self.inner().base.environment.to_lowercase();
        environment == "production" || environment == "prod"
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ClipperConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.inner().validate()
    }

    pub fn server_port(&self) -> u16 {
        self.inner().base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.inner().base.environment
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.inner().base.request_timeout_secs
    }

    pub fn shutdown_grace_secs(&self) -> u64 {
        self.inner().base.shutdown_grace_secs
    }

    pub fn log_format(&self) -> &str {
        &self.inner().base.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.inner().storage_backend
    }

    pub fn drive_access_token(&self) -> Option<&str> {
        self.inner().drive_access_token.as_deref()
    }

    pub fn drive_api_base_url(&self) -> &str {
        &self.inner().drive_api_base_url
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.inner().s3_bucket.as_deref()
    }

    /// `S3_REGION`, falling back to `AWS_REGION`.
    pub fn s3_region(&self) -> Option<&str> {
        self.inner()
            .s3_region
            .as_deref()
            .or(self.inner().aws_region.as_deref())
    }

    pub fn s3_endpoint(&self) -> Option<&str> {
        self.inner().s3_endpoint.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.inner().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.inner().local_storage_base_url.as_deref()
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.inner().ffmpeg_path
    }

    pub fn scratch_dir(&self) -> &std::path::Path {
        &self.inner().scratch_dir
    }

    pub fn max_concurrent_transcodes(&self) -> usize {
        self.inner().max_concurrent_transcodes
    }

    pub fn transcode_queue_timeout_secs(&self) -> u64 {
        self.inner().transcode_queue_timeout_secs
    }
}

impl ClipperConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_vars(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_vars<F>(var: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let base = BaseConfig {
            server_port: var("PORT")
                .unwrap_or_else(|| SERVER_PORT.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            environment,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|| REQUEST_TIMEOUT_SECS.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a valid number"))?,
            shutdown_grace_secs: var("SHUTDOWN_GRACE_SECS")
                .unwrap_or_else(|| SHUTDOWN_GRACE_SECS.to_string())
                .parse()
                .unwrap_or(SHUTDOWN_GRACE_SECS),
            log_format: var("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
        };

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(value) => value.parse()?,
            None => StorageBackend::Drive,
        };

        let config = ClipperConfig {
            base,
            storage_backend,
            drive_access_token: var("DRIVE_ACCESS_TOKEN").filter(|s| !s.is_empty()),
            drive_api_base_url: var("DRIVE_API_BASE_URL")
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| DRIVE_API_BASE_URL.to_string()),
            s3_bucket: var("S3_BUCKET").filter(|s| !s.is_empty()),
            s3_region: var("S3_REGION").filter(|s| !s.is_empty()),
            s3_endpoint: var("S3_ENDPOINT").filter(|s| !s.is_empty()),
            aws_region: var("AWS_REGION").filter(|s| !s.is_empty()),
            local_storage_path: var("LOCAL_STORAGE_PATH").filter(|s| !s.is_empty()),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL").filter(|s| !s.is_empty()),
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            scratch_dir: var("SCRATCH_DIR")
                .filter(|s| !s.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_concurrent_transcodes: var("MAX_CONCURRENT_TRANSCODES")
                .unwrap_or_else(|| MAX_CONCURRENT_TRANSCODES.to_string())
                .parse()
                .unwrap_or(MAX_CONCURRENT_TRANSCODES),
            transcode_queue_timeout_secs: var("TRANSCODE_QUEUE_TIMEOUT_SECS")
                .unwrap_or_else(|| "0".to_string())
                .parse()
                .unwrap_or(0),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.base.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be at least 1"));
        }

        if self.max_concurrent_transcodes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CONCURRENT_TRANSCODES must be at least 1"
            ));
        }

        if !matches!(self.base.log_format.as_str(), "text" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'text' or 'json'"));
        }

        match self.storage_backend {
            StorageBackend::Drive => {
                if self.drive_access_token.is_none() {
                    return Err(anyhow::anyhow!(
                        "DRIVE_ACCESS_TOKEN must be set when using Drive storage backend"
                    ));
                }
            }
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

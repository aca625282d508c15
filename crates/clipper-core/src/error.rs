//! Error types module
//!
//! All failures that can reach a caller are unified under `AppError`. Each pipeline
//! stage has its own variant so the HTTP layer can classify the failure without
//! inspecting messages.

use std::io;

use crate::timestamp::TimestampError;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like saturation
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
/// This trait allows errors to self-describe their HTTP response characteristics
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "FETCH_FAILED")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (the caller may retry)
    fn is_recoverable(&self) -> bool;

    /// Suggested action for the client
    fn suggested_action(&self) -> Option<&'static str>;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details must never be shown to callers
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Failed to fetch source: {0}")]
    FetchFailed(String),

    #[error("Failed to stage source locally: {0}")]
    StagingFailed(String),

    #[error("Transcode failed: {0}")]
    TranscodeFailed(String),

    #[error("Failed to store result: {0}")]
    StoreFailed(String),

    #[error("No transcode slot became available within {waited_secs}s")]
    TranscoderBusy { waited_secs: u64 },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

impl From<TimestampError> for AppError {
    fn from(err: TimestampError) -> Self {
        AppError::InvalidInput(err.to_string())
    }
}

/// Static metadata for each variant: (http_status, error_code, recoverable, suggested_action, sensitive, log_level).
fn app_error_static_metadata(
    err: &AppError,
) -> (
    u16,
    &'static str,
    bool,
    Option<&'static str>,
    bool,
    LogLevel,
) {
    match err {
        AppError::InvalidInput(_) => (
            400,
            "INVALID_INPUT",
            false,
            Some("Check request parameters and try again"),
            false,
            LogLevel::Debug,
        ),
        AppError::FetchFailed(_) => (
            500,
            "FETCH_FAILED",
            true,
            Some("Verify the source file exists and is shared with the service"),
            true,
            LogLevel::Error,
        ),
        AppError::StagingFailed(_) => (
            500,
            "STAGING_FAILED",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
        AppError::TranscodeFailed(_) => (
            500,
            "TRANSCODE_FAILED",
            false,
            Some("Check that the source is a supported media file"),
            true,
            LogLevel::Error,
        ),
        AppError::StoreFailed(_) => (
            500,
            "STORE_FAILED",
            true,
            Some("Verify the destination folder exists and is writable"),
            true,
            LogLevel::Error,
        ),
        AppError::TranscoderBusy { .. } => (
            503,
            "TRANSCODER_BUSY",
            true,
            Some("Wait 30-60 seconds and retry"),
            false,
            LogLevel::Warn,
        ),
        AppError::Internal(_) | AppError::InternalWithSource { .. } => (
            500,
            "INTERNAL_ERROR",
            true,
            Some("Retry after a short delay"),
            true,
            LogLevel::Error,
        ),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::FetchFailed(_) => "FetchFailed",
            AppError::StagingFailed(_) => "StagingFailed",
            AppError::TranscodeFailed(_) => "TranscodeFailed",
            AppError::StoreFailed(_) => "StoreFailed",
            AppError::TranscoderBusy { .. } => "TranscoderBusy",
            AppError::Internal(_) => "Internal",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_recoverable(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn suggested_action(&self) -> Option<&'static str> {
        app_error_static_metadata(self).3
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).4
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).5
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::FetchFailed(_) => "Failed to fetch source file".to_string(),
            AppError::StagingFailed(_) => "Failed to prepare source file".to_string(),
            AppError::TranscodeFailed(_) => "Failed to extract clip".to_string(),
            AppError::StoreFailed(_) => "Failed to store clip".to_string(),
            AppError::TranscoderBusy { waited_secs } => format!(
                "Transcoder is busy: no slot became available within {}s",
                waited_secs
            ),
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
        }
    }
}

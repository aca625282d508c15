use std::path::PathBuf;

use clipper_core::{AppError, TimestampError};
use clipper_storage::StorageError;
use thiserror::Error;

/// Failure while copying a source stream to local disk.
#[derive(Debug, Error)]
pub enum StagingError {
    #[error("failed to create staging file: {0}")]
    Create(#[source] std::io::Error),

    #[error("failed to read source stream after {bytes_written} bytes: {source}")]
    Read {
        bytes_written: u64,
        #[source]
        source: StorageError,
    },

    #[error("failed to write staging file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure of the external transcoder.
#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("source file {0} does not exist")]
    SourceNotFound(PathBuf),

    #[error("failed to prepare transcoder output: {0}")]
    Output(#[source] std::io::Error),

    #[error("failed to run transcoder: {0}")]
    Spawn(#[source] std::io::Error),

    /// The process ran and exited unsuccessfully. `diagnostics` is its captured stderr.
    #[error("transcoder exited with {status}: {diagnostics}")]
    Failed { status: String, diagnostics: String },
}

/// Failure of one extraction, classified by the stage that failed.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] TimestampError),

    #[error("fetch failed: {0}")]
    FetchFailed(#[source] StorageError),

    #[error("staging failed: {0}")]
    StagingFailed(#[from] StagingError),

    #[error("transcode failed: {0}")]
    TranscodeFailed(#[from] TranscodeError),

    #[error("store failed: {0}")]
    StoreFailed(#[source] StorageError),

    #[error("no transcode slot available after {waited_secs}s")]
    Busy { waited_secs: u64 },
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        match err {
            ExtractionError::InvalidRequest(e) => AppError::InvalidInput(e.to_string()),
            ExtractionError::FetchFailed(e) => AppError::FetchFailed(e.to_string()),
            ExtractionError::StagingFailed(e) => AppError::StagingFailed(e.to_string()),
            ExtractionError::TranscodeFailed(e) => AppError::TranscodeFailed(e.to_string()),
            ExtractionError::StoreFailed(e) => AppError::StoreFailed(e.to_string()),
            ExtractionError::Busy { waited_secs } => AppError::TranscoderBusy { waited_secs },
        }
    }
}

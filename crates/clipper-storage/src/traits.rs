//! Storage abstraction trait
//!
//! This module defines the `ObjectStorage` trait that all backends implement.

use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Chunked object content as produced by `fetch`.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, StorageError>> + Send>>;

/// Content handed to `store`. The backend owns it and drops it once the upload ends.
pub type ByteReader = Pin<Box<dyn AsyncRead + Send + Sync + Unpin>>;

/// A remote object opened for reading.
pub struct FetchedObject {
    /// Display name, including the extension
    pub name: String,
    /// Size in bytes when the backend reports it
    pub size: Option<u64>,
    pub content: ByteStream,
}

impl std::fmt::Debug for FetchedObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchedObject")
            .field("name", &self.name)
            .field("size", &self.size)
            .finish_non_exhaustive()
    }
}

/// Object store abstraction
///
/// The extraction pipeline only needs two operations: open a source object as a
/// stream of bytes and write a new object from a reader. Both are cancel-safe in the
/// sense that dropping the returned future abandons the transfer.
#[async_trait]
pub trait ObjectStorage: Send + Sync {
    /// Resolve an object's display name and open its content as a stream.
    async fn fetch(&self, id: &str) -> StorageResult<FetchedObject>;

    /// Write `reader` to a new object called `name` under `parent`.
    ///
    /// The reader is consumed until EOF. `content_length` is a hint some backends use
    /// to avoid chunked transfers. Returns the locator (URL) of the new object.
    async fn store(
        &self,
        name: &str,
        parent: &str,
        content_length: Option<u64>,
        reader: ByteReader,
    ) -> StorageResult<String>;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}

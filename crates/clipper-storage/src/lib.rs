//! Clipper Storage Library
//!
//! Object store abstraction used to fetch source media and store extracted clips.
//! Backends: Google Drive (REST), S3 (via `object_store`) and the local filesystem.
//!
//! # Identifiers
//!
//! `fetch` takes a backend-native identifier (a Drive file id, an S3 key, a path
//! relative to the local base directory). `store` takes a display name and a parent
//! location (a Drive folder id, or a key prefix for S3 and local storage) and returns
//! a URL locator for the stored object.

#[cfg(feature = "storage-drive")]
pub mod drive;
pub mod factory;
pub(crate) mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use clipper_core::StorageBackend;
#[cfg(feature = "storage-drive")]
pub use drive::DriveStorage;
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{ByteReader, ByteStream, FetchedObject, ObjectStorage, StorageError, StorageResult};

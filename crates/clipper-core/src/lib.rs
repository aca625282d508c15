//! Clipper Core Library
//!
//! This crate provides the domain models, error types, configuration and timestamp
//! handling shared by every Clipper component.

pub mod config;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod timestamp;

// Re-export commonly used types
pub use config::{BaseConfig, ClipperConfig, Config};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{ExtractionRequest, ExtractionResponse, ExtractionResult};
pub use storage_types::StorageBackend;
pub use timestamp::{format_hhmmss, parse_timestamp, TimeRange, TimestampError};

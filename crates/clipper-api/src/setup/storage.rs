//! Storage setup and initialization

use anyhow::{Context, Result};
use clipper_core::Config;
use clipper_storage::{create_storage, ObjectStorage};
use std::sync::Arc;

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn ObjectStorage>> {
    tracing::info!(backend = %config.storage_backend(), "Initializing object storage...");

    let storage = create_storage(config)
        .await
        .context("Failed to initialize object storage")?;

    tracing::info!(
        backend = ?storage.backend_type(),
        "Object storage initialized successfully"
    );
    Ok(storage)
}

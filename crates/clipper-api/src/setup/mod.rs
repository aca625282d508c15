//! Application setup and initialization

pub mod processing;
pub mod routes;
pub mod server;
pub mod storage;

use crate::state::AppState;
use anyhow::{Context, Result};
use clipper_core::Config;
use clipper_infra::LogFormat;
use std::sync::Arc;

/// Validate configuration, install tracing and build the state and router.
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config
        .validate()
        .context("Configuration validation failed")?;

    let log_format: LogFormat = config
        .log_format()
        .parse()
        .map_err(|e: String| anyhow::anyhow!(e))?;
    clipper_infra::init_telemetry(log_format).context("Failed to initialize telemetry")?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let pipeline = processing::setup_pipeline(&config, storage)?;

    let state = Arc::new(AppState::new(config.clone(), pipeline));
    let router = routes::setup_routes(&config, state.clone());

    Ok((state, router))
}

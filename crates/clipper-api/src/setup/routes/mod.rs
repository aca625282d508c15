//! Route configuration and setup.

mod health;

use crate::handlers;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use clipper_core::Config;
use clipper_infra::request_id_middleware;
use std::sync::Arc;
use std::time::Duration;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

const DEFAULT_HTTP_CONCURRENCY_LIMIT: usize = 1_000;

/// Build the application router.
///
/// Requests running longer than `REQUEST_TIMEOUT_SECS` are answered with 408 and their
/// handler future is dropped.
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Router {
    let request_timeout = Duration::from_secs(config.request_timeout_secs());

    let http_concurrency_limit = std::env::var("HTTP_CONCURRENCY_LIMIT")
        .ok()
        .and_then(|s| s.parse::<usize>().ok())
        .unwrap_or(DEFAULT_HTTP_CONCURRENCY_LIMIT)
        .max(1);

    tracing::info!(
        request_timeout_secs = request_timeout.as_secs(),
        http_concurrency_limit,
        "Routes configured"
    );

    Router::new()
        .route("/extract", post(handlers::extract::extract_clip))
        .route("/health/live", get(health::liveness_check))
        .route("/health/ready", get(health::readiness_check))
        .layer(TimeoutLayer::new(request_timeout))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(request_id_middleware))
        .with_state(state)
}

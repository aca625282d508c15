//! Server startup and graceful shutdown

use anyhow::Result;
use axum::Router;
use clipper_core::Config;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Start the server with graceful shutdown.
///
/// After a shutdown signal, in-flight requests get `SHUTDOWN_GRACE_SECS` to finish. Requests
/// still running after that are dropped, which cancels their extractions.
pub async fn start_server(config: &Config, app: Router) -> Result<()> {
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        storage_backend = %config.storage_backend(),
        ffmpeg_path = %config.ffmpeg_path(),
        max_concurrent_transcodes = config.max_concurrent_transcodes(),
        request_timeout_secs = config.request_timeout_secs(),
        "Server ready and accepting connections"
    );

    let shutdown = CancellationToken::new();
    let serve = {
        let shutdown = shutdown.clone();
        async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async move {
                    shutdown_signal().await;
                    shutdown.cancel();
                })
                .await
        }
    };

    let grace = Duration::from_secs(config.shutdown_grace_secs());
    tokio::select! {
        result = serve => result?,
        _ = async {
            shutdown.cancelled().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(
                grace_secs = grace.as_secs(),
                "Grace period elapsed, dropping in-flight requests"
            );
        }
    }

    clipper_infra::shutdown_telemetry().await;
    Ok(())
}

/// Resolves on Ctrl+C (SIGINT) or SIGTERM.
///
/// # Panics
/// Panics if a signal handler cannot be installed.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully...");
}

//! Health check handlers.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::fmt::Display;
use std::future::Future;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// Run an async check with timeout; returns "ready", "timeout", or "{prefix}: {error}".
async fn run_check<F, E>(timeout: Duration, f: F, error_prefix: &str) -> String
where
    F: Future<Output = Result<(), E>>,
    E: Display,
{
    match tokio::time::timeout(timeout, f).await {
        Ok(Ok(())) => "ready".to_string(),
        Ok(Err(e)) => format!("{}: {}", error_prefix, e),
        Err(_) => "timeout".to_string(),
    }
}

#[derive(serde::Serialize)]
pub(super) struct ReadinessResponse {
    pub status: String,
    pub scratch: String,
    pub transcoder: String,
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - scratch directory is writable and the transcoder can be run.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let scratch = state.scratch().clone();
    let scratch_status = run_check(
        CHECK_TIMEOUT,
        async move { scratch.probe() },
        "not_ready",
    )
    .await;

    let ffmpeg_path = state.ffmpeg_path().to_string();
    let transcoder_status = run_check(
        CHECK_TIMEOUT,
        async move { transcoder_version(&ffmpeg_path).await },
        "not_ready",
    )
    .await;

    let ready = scratch_status == "ready" && transcoder_status == "ready";
    if !ready {
        tracing::warn!(
            scratch = %scratch_status,
            transcoder = %transcoder_status,
            "Readiness check failed"
        );
    }

    let response = ReadinessResponse {
        status: if ready { "ready" } else { "not_ready" }.to_string(),
        scratch: scratch_status,
        transcoder: transcoder_status,
    };
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response))
}

async fn transcoder_version(ffmpeg_path: &str) -> Result<(), String> {
    let status = Command::new(ffmpeg_path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .status()
        .await
        .map_err(|e| format!("failed to run {}: {}", ffmpeg_path, e))?;

    if status.success() {
        Ok(())
    } else {
        Err(format!("{} -version exited with {}", ffmpeg_path, status))
    }
}

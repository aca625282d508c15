use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, Json};
use clipper_core::{ExtractionRequest, ExtractionResponse};
use std::sync::Arc;

/// `POST /extract`: cut a clip out of a stored media file and store it next to the destination.
///
/// Dropping this future (client disconnect or request timeout) cancels the extraction and
/// removes its local artifacts.
#[tracing::instrument(
    skip(state, request),
    fields(
        source_id = %request.source_file_id,
        destination = %request.destination_folder_id,
        operation = "extract_clip"
    )
)]
pub async fn extract_clip(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ExtractionRequest>,
) -> Result<(StatusCode, Json<ExtractionResponse>), HttpAppError> {
    tracing::info!(
        clip_start = %request.clip_start_time,
        clip_end = %request.clip_end_time,
        "Extraction requested"
    );

    let result = state.pipeline.extract(&request).await?;

    Ok((StatusCode::CREATED, Json(result.into())))
}

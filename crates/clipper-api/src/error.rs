//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that converts into
//! [`AppError`] converts into [`HttpAppError`] and renders as an [`ErrorResponse`].

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clipper_core::{AppError, ErrorMetadata, LogLevel};
use clipper_processing::ExtractionError;
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether retrying the same request may succeed
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper type for AppError to implement IntoResponse
/// (orphan rule: IntoResponse and AppError both live in other crates).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<ExtractionError> for HttpAppError {
    fn from(err: ExtractionError) -> Self {
        HttpAppError(err.into())
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        })
    }
}

impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that renders deserialization failures as a 400 [`ErrorResponse`].
#[derive(Debug, Clone, Copy)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
{
    type Rejection = HttpAppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(inner) = Json::<T>::from_request(req, state)
            .await
            .map_err(HttpAppError::from)?;
        Ok(ValidatedJson(inner))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(
                error = %error.detailed_message(),
                error_type = error_type,
                "Error occurred"
            );
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

impl HttpAppError {
    fn to_error_response(&self, show_details: bool) -> ErrorResponse {
        let app_error = &self.0;
        let (details, error_type) = if show_details && !app_error.is_sensitive() {
            (
                Some(app_error.detailed_message()),
                Some(app_error.error_type().to_string()),
            )
        } else {
            (None, None)
        };

        ErrorResponse {
            error: app_error.client_message(),
            details,
            error_type,
            code: app_error.error_code().to_string(),
            recoverable: app_error.is_recoverable(),
            suggested_action: app_error.suggested_action().map(String::from),
        }
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(&self.0);

        let body = self.to_error_response(!is_production_env());
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clipper_core::TimestampError;
    use clipper_processing::TranscodeError;
    use clipper_storage::StorageError;

    #[test]
    fn test_from_extraction_error_keeps_classification() {
        let HttpAppError(app_err) =
            ExtractionError::from(TimestampError::InvalidFormat("blah".into())).into();
        assert!(matches!(app_err, AppError::InvalidInput(_)));

        let HttpAppError(app_err) =
            ExtractionError::StoreFailed(StorageError::UploadFailed("denied".into())).into();
        assert!(matches!(app_err, AppError::StoreFailed(_)));

        let HttpAppError(app_err) = ExtractionError::Busy { waited_secs: 5 }.into();
        assert!(matches!(
            app_err,
            AppError::TranscoderBusy { waited_secs: 5 }
        ));
    }

    #[test]
    fn test_sensitive_error_hides_details() {
        let error: HttpAppError = ExtractionError::from(TranscodeError::Failed {
            status: "exit status: 1".into(),
            diagnostics: "/tmp/clipper-staged-x.mp4: Invalid data".into(),
        })
        .into();

        let response = error.to_error_response(true);

        assert_eq!(response.error, "Failed to extract clip");
        assert_eq!(response.code, "TRANSCODE_FAILED");
        assert!(response.details.is_none());
        assert!(response.error_type.is_none());
        assert!(!response.recoverable);
    }

    #[test]
    fn test_non_sensitive_error_details_depend_on_environment() {
        let error = HttpAppError(AppError::InvalidInput("bad timestamp".into()));

        let development = error.to_error_response(true);
        assert_eq!(development.error, "bad timestamp");
        assert_eq!(development.error_type.as_deref(), Some("InvalidInput"));
        assert!(development.details.unwrap().contains("bad timestamp"));

        let production = error.to_error_response(false);
        assert!(production.details.is_none());
        assert_eq!(production.code, "INVALID_INPUT");
    }

    #[test]
    fn test_into_response_status() {
        let cases = [
            (AppError::InvalidInput("x".into()), StatusCode::BAD_REQUEST),
            (
                AppError::FetchFailed("x".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                AppError::TranscoderBusy { waited_secs: 1 },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
        ];

        for (error, status) in cases {
            assert_eq!(HttpAppError(error).into_response().status(), status);
        }
    }

    #[test]
    fn test_error_response_shape() {
        let response = ErrorResponse {
            error: "Failed to fetch source file".to_string(),
            details: None,
            error_type: None,
            code: "FETCH_FAILED".to_string(),
            recoverable: true,
            suggested_action: None,
        };
        let json = serde_json::to_value(&response).unwrap();

        assert_eq!(json["code"], "FETCH_FAILED");
        assert_eq!(json["recoverable"], true);
        assert!(json.get("details").is_none());
        assert!(json.get("suggested_action").is_none());
    }
}

//! HTTP error response conversion
//!
//! Handlers return `Result<impl IntoResponse, HttpAppError>`. Anything that
//! converts into `AppError` converts into `HttpAppError` through `?`, and is
//! rendered with the status, code and message from its `ErrorMetadata`.

use axum::{
    extract::rejection::JsonRejection,
    extract::{FromRequest, Request},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use docvault_core::{AppError, ErrorMetadata, LogLevel};
use docvault_processing::{ExtractionError, ValidationError};
use docvault_storage::StorageError;
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    /// Machine-readable error code for programmatic handling
    pub code: String,
    /// Whether this error is recoverable (can be retried)
    pub recoverable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_action: Option<String>,
}

/// Wrapper so `AppError` (from docvault-core) can implement `IntoResponse`.
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<ExtractionError> for HttpAppError {
    fn from(err: ExtractionError) -> Self {
        HttpAppError(AppError::from(err))
    }
}

impl From<validator::ValidationErrors> for HttpAppError {
    fn from(err: validator::ValidationErrors) -> Self {
        HttpAppError(AppError::from(err))
    }
}

/// Convert JSON body deserialization failures into a 400 with our ErrorResponse format.
impl From<JsonRejection> for HttpAppError {
    fn from(rejection: JsonRejection) -> Self {
        HttpAppError(AppError::InvalidInput(format!(
            "Invalid request body: {}",
            rejection.body_text()
        )))
    }
}

/// JSON body extractor that answers malformed or incomplete bodies with a 400
/// in the `ErrorResponse` shape instead of axum's default 422 text.
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
            tracing::error!(error = %error.detailed_message(), error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| env.to_lowercase() == "production" || env.to_lowercase() == "prod")
        .unwrap_or(false)
}

fn error_response(app_error: &AppError, show_details: bool) -> ErrorResponse {
    ErrorResponse {
        error: app_error.client_message(),
        details: show_details.then(|| app_error.detailed_message()),
        error_type: show_details.then(|| app_error.error_type().to_string()),
        code: app_error.error_code().to_string(),
        recoverable: app_error.is_recoverable(),
        suggested_action: app_error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;

        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        // Details never leave the process in production or for sensitive errors
        let show_details = !is_production_env() && !app_error.is_sensitive();

        (status, Json(error_response(app_error, show_details))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_storage_error_not_found() {
        let HttpAppError(app_err) = StorageError::NotFound("a/b.pdf".to_string()).into();
        assert!(matches!(app_err, AppError::NotFound(_)));
        assert_eq!(app_err.http_status_code(), 404);
    }

    #[test]
    fn test_from_storage_error_upload_failed_is_sensitive() {
        let HttpAppError(app_err) = StorageError::UploadFailed("bucket gone".to_string()).into();
        assert!(matches!(app_err, AppError::Storage(_)));
        assert!(app_err.is_sensitive());
    }

    #[test]
    fn test_from_validation_error_file_too_large() {
        let HttpAppError(app_err) = ValidationError::FileTooLarge {
            size: 1000,
            max: 500,
        }
        .into();
        match app_err {
            AppError::PayloadTooLarge(msg) => {
                assert!(msg.contains("1000"));
                assert!(msg.contains("500"));
            }
            other => panic!("Expected PayloadTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_from_extraction_error_keeps_message() {
        let HttpAppError(app_err) = ExtractionError::UnsupportedFormat("txt".to_string()).into();
        assert_eq!(app_err.client_message(), "Unsupported file type: txt");
        assert_eq!(app_err.http_status_code(), 400);
    }

    #[test]
    fn test_sensitive_error_response_has_no_details() {
        let err = AppError::Storage("s3://secret-bucket unreachable".to_string());
        let json = serde_json::to_value(error_response(&err, false)).unwrap();
        assert_eq!(json["error"], "Failed to access storage");
        assert_eq!(json["code"], "STORAGE_ERROR");
        assert!(json.get("details").is_none());
        assert!(json.get("error_type").is_none());
    }

    #[test]
    fn test_error_response_shape_with_details() {
        let err = AppError::DocumentParse("PDF parsing error: bad header".to_string());
        let json = serde_json::to_value(error_response(&err, true)).unwrap();
        assert_eq!(json["error"], "PDF parsing error: bad header");
        assert_eq!(json["code"], "DOCUMENT_PARSE_ERROR");
        assert_eq!(json["error_type"], "ParseError");
        assert_eq!(json["recoverable"], false);
        assert!(json["suggested_action"].is_string());
    }
}

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Path, State},
    http::{header, Response, StatusCode},
    response::IntoResponse,
};
use docvault_core::constants::{DOCX_CONTENT_TYPE, OCTET_STREAM_CONTENT_TYPE, PDF_CONTENT_TYPE};
use docvault_core::AppError;
use docvault_processing::extract::extension_of;
use futures::StreamExt;
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use uuid::Uuid;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

fn content_type_for(filename: &str) -> &'static str {
    match extension_of(filename).as_str() {
        "pdf" => PDF_CONTENT_TYPE,
        "docx" => DOCX_CONTENT_TYPE,
        _ => OCTET_STREAM_CONTENT_TYPE,
    }
}

/// `attachment` disposition naming the original file. The quoted form is an
/// ASCII approximation; `filename*` carries the exact UTF-8 name.
fn content_disposition(original_filename: &str) -> String {
    let ascii: String = original_filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        utf8_percent_encode(original_filename, NON_ALPHANUMERIC)
    )
}

#[utoipa::path(
    get,
    path = "/api/v0/documents/{id}/file",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document file", content_type = "application/octet-stream"),
        (status = 404, description = "Document not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state),
    fields(user_id = %user.user_id, document_id = %id, operation = "download_document")
)]
pub async fn download_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .documents
        .get(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    tracing::debug!(storage_key = %document.file_path, "Streaming document from storage");

    let stream = state.storage.download_stream(&document.file_path).await?;

    let body_stream = stream.map(|result| {
        result.map_err(|e| std::io::Error::other(format!("Storage stream error: {}", e)))
    });

    let response = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type_for(&document.original_filename))
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&document.original_filename),
        )
        .header(header::CACHE_CONTROL, "private, no-store")
        .body(Body::from_stream(body_stream))
        .map_err(|e| AppError::Internal(format!("Failed to build response: {}", e)))?;

    Ok(response)
}

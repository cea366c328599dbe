use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    response::IntoResponse,
    Json,
};
use docvault_core::models::ExtractTextResponse;
use docvault_processing::upload::extract_with_timeout;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Extract the text of an uploaded PDF or DOCX without storing anything.
#[utoipa::path(
    post,
    path = "/api/v0/extract-text",
    tag = "extraction",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Extracted text (may be empty)", body = ExtractTextResponse),
        (status = 400, description = "Missing file or unsupported type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 422, description = "Document could not be parsed", body = ErrorResponse),
        (status = 504, description = "Extraction timed out", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, operation = "extract_text")
)]
pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;

    tracing::info!(
        filename = %file.filename,
        content_type = %file.content_type,
        size = file.size(),
        "Received file for text extraction"
    );

    let result = extract_with_timeout(&state.extraction, &file, state.extraction_timeout()).await?;

    Ok(Json(ExtractTextResponse {
        extracted_text: result.text,
    }))
}

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use docvault_core::models::{DocumentResponse, NewDocument};
use docvault_processing::upload_pipeline;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use crate::utils::upload::extract_multipart_file;

/// Upload a document: validate, extract its text, store the bytes and record it.
#[utoipa::path(
    post,
    path = "/api/v0/documents",
    tag = "documents",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Document stored", body = DocumentResponse),
        (status = 400, description = "Invalid input or unsupported type", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 422, description = "Document could not be parsed", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, multipart),
    fields(user_id = %user.user_id, operation = "upload_document")
)]
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    multipart: Multipart,
) -> Result<impl IntoResponse, HttpAppError> {
    let file = extract_multipart_file(multipart).await?;
    let original_filename = file.filename.clone();

    let outcome = upload_pipeline(
        user.user_id,
        file,
        &state.config,
        &state.extraction,
        state.storage.clone(),
        state.extraction_timeout(),
    )
    .await?;

    let new_document = NewDocument::new(
        user.user_id,
        outcome.storage_key.clone(),
        original_filename,
        Some(outcome.extracted_text),
    );

    let document = match state.documents.create(new_document).await {
        Ok(document) => document,
        Err(e) => {
            // The record is the only handle on the object, so drop the orphan
            let storage_key = outcome.storage_key;
            let storage = state.storage.clone();
            tokio::spawn(async move {
                if let Err(cleanup_err) = storage.delete(&storage_key).await {
                    tracing::warn!(
                        error = %cleanup_err,
                        storage_key = %storage_key,
                        "Failed to cleanup storage file after DB error"
                    );
                }
            });
            return Err(e.into());
        }
    };

    tracing::info!(
        document_id = %document.id,
        storage_key = %document.file_path,
        format = %outcome.format,
        file_size = outcome.file_size,
        "Document uploaded"
    );

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

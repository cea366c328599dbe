use std::sync::Arc;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use docvault_core::models::{CreateDocumentRequest, DocumentResponse, NewDocument};
use docvault_core::AppError;
use docvault_storage::is_owned_by;
use validator::Validate;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Record a document whose bytes the client already put in storage.
#[utoipa::path(
    post,
    path = "/api/v0/documents/records",
    tag = "documents",
    request_body = CreateDocumentRequest,
    responses(
        (status = 201, description = "Record created", body = DocumentResponse),
        (status = 400, description = "Missing fields or path outside the caller's namespace", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(
    skip(state, request),
    fields(user_id = %user.user_id, operation = "create_document_record")
)]
pub async fn create_document_record(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    ValidatedJson(request): ValidatedJson<CreateDocumentRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    request.validate()?;

    if !is_owned_by(user.user_id, &request.file_path) {
        return Err(AppError::BadRequest(
            "file_path must be inside the caller's storage namespace".to_string(),
        )
        .into());
    }

    let document = state
        .documents
        .create(NewDocument::new(
            user.user_id,
            request.file_path,
            request.original_filename,
            request.extracted_text,
        ))
        .await?;

    tracing::info!(document_id = %document.id, "Document record created");

    Ok((StatusCode::CREATED, Json(DocumentResponse::from(document))))
}

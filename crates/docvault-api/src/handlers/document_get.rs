use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Json,
};
use docvault_core::models::{DocumentResponse, DocumentSummary, ListDocumentsQuery};
use docvault_core::AppError;
use uuid::Uuid;

use crate::auth::UserContext;
use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/v0/documents/{id}",
    tag = "documents",
    params(
        ("id" = Uuid, Path, description = "Document ID")
    ),
    responses(
        (status = 200, description = "Document found", body = DocumentResponse),
        (status = 404, description = "Document not found", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_document(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpAppError> {
    let document = state
        .documents
        .get(user.user_id, id)
        .await?
        .ok_or_else(|| AppError::NotFound("Document not found".to_string()))?;

    Ok(Json(DocumentResponse::from(document)))
}

/// The caller's documents, newest upload first.
#[utoipa::path(
    get,
    path = "/api/v0/documents",
    tag = "documents",
    params(ListDocumentsQuery),
    responses(
        (status = 200, description = "List of documents", body = Vec<DocumentSummary>)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    user: UserContext,
    Query(query): Query<ListDocumentsQuery>,
) -> Result<impl IntoResponse, HttpAppError> {
    let (limit, offset) = query.resolve();

    let documents = state
        .documents
        .list_for_user(user.user_id, limit, offset)
        .await?;

    let summaries: Vec<DocumentSummary> = documents.into_iter().map(Into::into).collect();
    Ok(Json(summaries))
}

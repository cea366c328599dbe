//! OpenAPI documentation.

use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error::ErrorResponse;
use crate::handlers;
use docvault_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Docvault API",
        version = "0.1.0",
        description = "Upload PDF and DOCX documents, extract their text and download them again. All endpoints are versioned under /api/v0/."
    ),
    paths(
        handlers::health::health_check,
        handlers::extract_text::extract_text,
        handlers::document_upload::upload_document,
        handlers::document_create::create_document_record,
        handlers::document_get::get_document,
        handlers::document_get::list_documents,
        handlers::document_download::download_document,
    ),
    components(schemas(
        models::DocumentResponse,
        models::DocumentSummary,
        models::CreateDocumentRequest,
        models::ExtractTextResponse,
        handlers::health::HealthResponse,
        ErrorResponse,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "documents", description = "Stored documents"),
        (name = "extraction", description = "Stateless text extraction"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

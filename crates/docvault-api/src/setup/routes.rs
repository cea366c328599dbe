//! Route configuration and setup

use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use docvault_core::Config;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::auth::middleware::auth_middleware;
use crate::constants::{api_path, MULTIPART_OVERHEAD_BYTES};
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router, anyhow::Error> {
    let cors = setup_cors(config)?;
    let body_limit = config.max_document_size_bytes() + MULTIPART_OVERHEAD_BYTES;

    let public_routes = Router::new()
        .route(&api_path("/health"), get(handlers::health::health_check))
        .route(&api_path("/openapi.json"), get(openapi_json));

    let protected_routes = Router::new()
        .route(
            &api_path("/extract-text"),
            post(handlers::extract_text::extract_text),
        )
        .route(
            &api_path("/documents"),
            post(handlers::document_upload::upload_document)
                .get(handlers::document_get::list_documents),
        )
        .route(
            &api_path("/documents/records"),
            post(handlers::document_create::create_document_record),
        )
        .route(
            &api_path("/documents/{id}"),
            get(handlers::document_get::get_document),
        )
        .route(
            &api_path("/documents/{id}/file"),
            get(handlers::document_download::download_document),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.jwt.clone(),
            auth_middleware,
        ));

    let app = public_routes
        .merge(protected_routes)
        .merge(utoipa_rapidoc::RapiDoc::new(api_path("/openapi.json")).path("/docs"))
        .layer(ConcurrencyLimitLayer::new(config.http_concurrency_limit()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    Ok(app)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Setup CORS configuration
fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];

    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}

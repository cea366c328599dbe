use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use docvault_core::AppError;

use super::jwt::JwtVerifier;
use super::models::UserContext;
use crate::error::HttpAppError;

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Verify the bearer token and attach the caller's `UserContext`.
pub async fn auth_middleware(
    State(verifier): State<Arc<JwtVerifier>>,
    mut request: Request,
    next: Next,
) -> Response {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::debug!(path = %request.uri().path(), "Missing bearer token");
        return HttpAppError(AppError::Unauthorized(
            "Missing or malformed Authorization header".to_string(),
        ))
        .into_response();
    };

    match verifier.verify(&token) {
        Ok(claims) => {
            request.extensions_mut().insert(UserContext {
                user_id: claims.sub,
            });
            next.run(request).await
        }
        Err(e) => HttpAppError(e).into_response(),
    }
}

//! API constants

/// Versioned prefix every route is mounted under.
pub const API_PREFIX: &str = "/api/v0";

/// Slack on top of the document size limit for multipart framing.
pub const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Versioned API path, e.g. `api_path("/documents")` → `/api/v0/documents`.
pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

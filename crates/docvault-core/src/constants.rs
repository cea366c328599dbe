//! Constants shared across crates

/// MIME type of PDF uploads.
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// MIME type of DOCX (Office Open XML word processing) uploads.
pub const DOCX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Generic binary MIME type some clients send for any file.
pub const OCTET_STREAM_CONTENT_TYPE: &str = "application/octet-stream";

/// Base name used when sanitization leaves nothing behind.
pub const FALLBACK_FILENAME: &str = "file";

/// Default maximum upload size in megabytes.
pub const DEFAULT_MAX_DOCUMENT_SIZE_MB: usize = 10;

/// Default bound on a single extraction, in seconds.
pub const DEFAULT_EXTRACTION_TIMEOUT_SECS: u64 = 60;

/// Maximum page size for document listings.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Default page size for document listings.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

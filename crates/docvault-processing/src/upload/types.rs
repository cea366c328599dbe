//! Types for the upload pipeline.

use crate::extract::DocumentFormat;

/// What the pipeline produced for one stored document.
#[derive(Clone, Debug)]
pub struct UploadOutcome {
    pub storage_key: String,
    pub storage_url: String,
    pub format: DocumentFormat,
    pub content_type: String,
    pub file_size: usize,
    /// Extracted text, possibly empty.
    pub extracted_text: String,
}

use docvault_core::AppError;

/// Failures from the extraction pipeline.
///
/// None of these are retryable; the message is meant to reach the end user as is.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    #[error("DOCX extraction error: {0}")]
    DocxExtraction(String),
}

impl From<ExtractionError> for AppError {
    fn from(err: ExtractionError) -> Self {
        let message = err.to_string();
        match err {
            ExtractionError::UnsupportedFormat(_) => AppError::UnsupportedFormat(message),
            ExtractionError::PdfParse(_) => AppError::DocumentParse(message),
            ExtractionError::DocxExtraction(_) => AppError::TextExtraction(message),
        }
    }
}

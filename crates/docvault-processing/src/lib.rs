//! Docvault Document Processing Library
//!
//! Text extraction for PDF and DOCX uploads, upload validation and the
//! validate → extract → store pipeline.

pub mod error;
pub mod extract;
pub mod upload;
pub mod validator;

// Re-export commonly used types
pub use error::ExtractionError;
pub use extract::{
    detect_format, DocumentFormat, DocxExtractor, ExtractionOrchestrator, ExtractionResult,
    OoxmlConverter, PdfExtractor, TextExtractor, UploadedFile,
};
pub use upload::{upload_pipeline, UploadConfig, UploadOutcome};
pub use validator::{DocumentValidator, ValidationError};

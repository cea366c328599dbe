//! Text extraction
//!
//! The format is chosen from the filename extension alone. Exactly one
//! extractor runs per file; unsupported extensions never reach one.

pub mod docx;
pub mod format;
pub mod pdf;

use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::ExtractionError;

pub use docx::{html_to_text, DocxConverter, DocxExtractor, OoxmlConverter};
pub use format::{detect_format, extension_of, DocumentFormat};
pub use pdf::{parse_document_tree, PdfDocumentTree, PdfExtractor};

/// An uploaded file held fully in memory.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub data: Bytes,
    pub filename: String,
    pub content_type: String,
}

impl UploadedFile {
    pub fn new(data: impl Into<Bytes>, filename: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            filename: filename.into(),
            content_type: content_type.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    pub format: DocumentFormat,
    pub text: String,
}

impl ExtractionResult {
    /// True when nothing but whitespace was recovered.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Format-specific text extractor.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    fn format(&self) -> DocumentFormat;

    /// Extract the plain text of `data`. An empty string is a valid result.
    async fn extract(&self, data: Bytes) -> Result<String, ExtractionError>;
}

/// Routes a file to the extractor for its format.
#[derive(Clone)]
pub struct ExtractionOrchestrator {
    pdf: Arc<dyn TextExtractor>,
    docx: Arc<dyn TextExtractor>,
}

impl Default for ExtractionOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl ExtractionOrchestrator {
    pub fn new() -> Self {
        Self::with_extractors(Arc::new(PdfExtractor::new()), Arc::new(DocxExtractor::new()))
    }

    pub fn with_extractors(pdf: Arc<dyn TextExtractor>, docx: Arc<dyn TextExtractor>) -> Self {
        Self { pdf, docx }
    }

    fn extractor_for(&self, format: DocumentFormat) -> &Arc<dyn TextExtractor> {
        match format {
            DocumentFormat::Pdf => &self.pdf,
            DocumentFormat::Docx => &self.docx,
        }
    }

    #[tracing::instrument(skip(self, file), fields(filename = %file.filename, size = file.size()))]
    pub async fn extract_text(&self, file: &UploadedFile) -> Result<ExtractionResult, ExtractionError> {
        let format = detect_format(&file.filename)?;

        tracing::info!(format = %format, "Extracting document text");

        let text = self
            .extractor_for(format)
            .extract(file.data.clone())
            .await
            .map_err(|e| {
                tracing::warn!(format = %format, error = %e, "Text extraction failed");
                e
            })?;

        let result = ExtractionResult { format, text };
        if result.is_empty() {
            tracing::warn!(format = %format, "Document contains no extractable text");
        } else {
            tracing::info!(
                format = %format,
                text_length = result.text.chars().count(),
                "Text extraction completed"
            );
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingExtractor {
        format: DocumentFormat,
        output: &'static str,
        calls: AtomicUsize,
    }

    impl CountingExtractor {
        fn new(format: DocumentFormat, output: &'static str) -> Arc<Self> {
            Arc::new(Self {
                format,
                output,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TextExtractor for CountingExtractor {
        fn format(&self) -> DocumentFormat {
            self.format
        }

        async fn extract(&self, _data: Bytes) -> Result<String, ExtractionError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.output.to_string())
        }
    }

    fn orchestrator() -> (ExtractionOrchestrator, Arc<CountingExtractor>, Arc<CountingExtractor>) {
        let pdf = CountingExtractor::new(DocumentFormat::Pdf, "pdf text");
        let docx = CountingExtractor::new(DocumentFormat::Docx, "docx text");
        let orchestrator = ExtractionOrchestrator::with_extractors(pdf.clone(), docx.clone());
        (orchestrator, pdf, docx)
    }

    #[tokio::test]
    async fn test_routes_by_extension_case_insensitively() {
        let (orchestrator, pdf, docx) = orchestrator();

        let file = UploadedFile::new(Bytes::from_static(b"x"), "Report.PDF", "application/pdf");
        let result = orchestrator.extract_text(&file).await.unwrap();
        assert_eq!(result.format, DocumentFormat::Pdf);
        assert_eq!(result.text, "pdf text");

        let file = UploadedFile::new(Bytes::from_static(b"x"), "letter.docx", "application/octet-stream");
        let result = orchestrator.extract_text(&file).await.unwrap();
        assert_eq!(result.format, DocumentFormat::Docx);

        assert_eq!(pdf.calls.load(Ordering::SeqCst), 1);
        assert_eq!(docx.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unsupported_extension_runs_no_extractor() {
        let (orchestrator, pdf, docx) = orchestrator();

        let file = UploadedFile::new(Bytes::from_static(b"hello"), "notes.txt", "text/plain");
        let err = orchestrator.extract_text(&file).await.unwrap_err();

        assert_eq!(err.to_string(), "Unsupported file type: txt");
        assert_eq!(pdf.calls.load(Ordering::SeqCst), 0);
        assert_eq!(docx.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_text_is_success() {
        let pdf = CountingExtractor::new(DocumentFormat::Pdf, "");
        let docx = CountingExtractor::new(DocumentFormat::Docx, "");
        let orchestrator = ExtractionOrchestrator::with_extractors(pdf, docx);

        let file = UploadedFile::new(Bytes::from_static(b"x"), "scan.pdf", "application/pdf");
        let result = orchestrator.extract_text(&file).await.unwrap();

        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_default_orchestrator_reads_real_pdf() {
        let bytes = pdf::tests::make_pdf(&[&["Hello"], &["World"]]);
        let file = UploadedFile::new(bytes, "hello.pdf", "application/pdf");

        let result = ExtractionOrchestrator::new().extract_text(&file).await.unwrap();

        assert_eq!(result.text, "Hello World");
    }

    #[tokio::test]
    async fn test_default_orchestrator_reads_real_docx() {
        let bytes = docx::tests::make_simple_docx(&["First", "Second"]);
        let file = UploadedFile::new(bytes, "memo.docx", "application/octet-stream");

        let result = ExtractionOrchestrator::new().extract_text(&file).await.unwrap();

        assert_eq!(result.text, "First\n\nSecond\n\n");
    }
}

//! Extension-based format detection. Content is never sniffed.

use std::fmt;

use crate::error::ExtractionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentFormat {
    Pdf,
    Docx,
}

impl DocumentFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            DocumentFormat::Pdf => "pdf",
            DocumentFormat::Docx => "docx",
        }
    }
}

impl fmt::Display for DocumentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Lower-cased suffix after the last dot, or `""` when the name has no dot.
pub fn extension_of(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// The extension to name in a rejection. A name without one is reported whole.
pub(crate) fn reported_extension(filename: &str) -> String {
    let extension = extension_of(filename);
    if extension.is_empty() {
        filename.trim().to_lowercase()
    } else {
        extension
    }
}

/// Pick the extraction strategy for a declared filename.
pub fn detect_format(filename: &str) -> Result<DocumentFormat, ExtractionError> {
    match extension_of(filename).as_str() {
        "pdf" => Ok(DocumentFormat::Pdf),
        "docx" => Ok(DocumentFormat::Docx),
        _ => Err(ExtractionError::UnsupportedFormat(reported_extension(filename))),
    }
}

//! PDF text extraction
//!
//! The document is parsed into a small tree (pages → text elements → runs →
//! fragments) off the async runtime, then flattened in reading order with a
//! single space after every fragment.

use async_trait::async_trait;
use bytes::Bytes;
use lopdf::content::{Content, Operation};
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use super::format::DocumentFormat;
use super::TextExtractor;
use crate::error::ExtractionError;

/// Characters left alone by `encodeURIComponent`.
const FRAGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Kerning (in thousandths of an em) at or beyond which a `TJ` gap is a word break.
const WORD_GAP_THRESHOLD: f32 = -200.0;

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PdfDocumentTree {
    pub pages: Vec<PdfPage>,
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PdfPage {
    pub texts: Vec<PdfTextElement>,
}

/// One `BT` … `ET` block.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PdfTextElement {
    pub runs: Vec<PdfTextRun>,
}

/// One text-showing operator. Fragments are URI-component encoded.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PdfTextRun {
    pub fragments: Vec<String>,
}

impl PdfDocumentTree {
    /// Concatenate every decoded fragment in document order.
    pub fn collect_text(&self) -> String {
        let mut text = String::new();
        let fragments = self
            .pages
            .iter()
            .flat_map(|page| &page.texts)
            .flat_map(|element| &element.runs)
            .flat_map(|run| &run.fragments)
            .filter(|fragment| !fragment.is_empty());

        for fragment in fragments {
            text.push_str(&decode_fragment(fragment));
            text.push(' ');
        }

        text.trim().to_string()
    }
}

fn encode_fragment(raw: &str) -> String {
    utf8_percent_encode(raw, FRAGMENT_ENCODE_SET).to_string()
}

fn decode_fragment(fragment: &str) -> String {
    percent_decode_str(fragment).decode_utf8_lossy().into_owned()
}

/// Encodings of the fonts a page can select with `Tf`, keyed by resource name.
type FontEncodings<'a> = BTreeMap<Vec<u8>, Encoding<'a>>;

fn page_font_encodings(document: &Document, page_id: ObjectId) -> FontEncodings<'_> {
    let fonts = match document.get_page_fonts(page_id) {
        Ok(fonts) => fonts,
        Err(e) => {
            tracing::warn!(error = %e, "Could not read page fonts");
            return FontEncodings::new();
        }
    };

    fonts
        .into_iter()
        .filter(|(_, font)| font.type_is(b"Font"))
        .filter_map(|(name, font)| match font.get_font_encoding(document) {
            Ok(encoding) => Some((name, encoding)),
            Err(e) => {
                tracing::warn!(
                    font = %String::from_utf8_lossy(&name),
                    error = %e,
                    "Unreadable font encoding"
                );
                None
            }
        })
        .collect()
}

/// Decode a PDF string operand through the selected font's encoding.
///
/// Strings with a UTF-16BE byte order mark are read as UTF-16 unless the font
/// maps two-byte codes itself. Without a usable encoding every byte is one
/// Latin-1 character.
fn decode_pdf_string(bytes: &[u8], encoding: Option<&Encoding>) -> String {
    let cid_font = matches!(encoding, Some(Encoding::UnicodeMapEncoding(_)));
    if !cid_font {
        if let Some(body) = bytes.strip_prefix(&[0xFE, 0xFF]) {
            let units: Vec<u16> = body
                .chunks_exact(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
                .collect();
            return String::from_utf16_lossy(&units);
        }
    }

    if let Some(encoding) = encoding {
        match Document::decode_text(encoding, bytes) {
            Ok(text) => return text,
            Err(e) => {
                tracing::debug!(?encoding, error = %e, "Font encoding cannot decode string")
            }
        }
    }
    bytes.iter().map(|&b| b as char).collect()
}

fn number_value(object: &Object) -> Option<f32> {
    match object {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r as f32),
        _ => None,
    }
}

/// Fragments for a `TJ` array: strings joined until a wide negative gap.
fn fragments_from_array(items: &[Object], encoding: Option<&Encoding>) -> Vec<String> {
    let mut fragments = Vec::new();
    let mut current = String::new();

    for item in items {
        match item {
            Object::String(bytes, _) => current.push_str(&decode_pdf_string(bytes, encoding)),
            other => {
                if number_value(other).is_some_and(|gap| gap <= WORD_GAP_THRESHOLD)
                    && !current.is_empty()
                {
                    fragments.push(std::mem::take(&mut current));
                }
            }
        }
    }
    if !current.is_empty() {
        fragments.push(current);
    }

    fragments
}

fn run_from_operation(op: &Operation, encoding: Option<&Encoding>) -> Option<PdfTextRun> {
    let raw = match op.operator.as_str() {
        "Tj" | "'" => match op.operands.first() {
            Some(Object::String(bytes, _)) => vec![decode_pdf_string(bytes, encoding)],
            _ => return None,
        },
        "\"" => match op.operands.get(2) {
            Some(Object::String(bytes, _)) => vec![decode_pdf_string(bytes, encoding)],
            _ => return None,
        },
        "TJ" => match op.operands.first() {
            Some(Object::Array(items)) => fragments_from_array(items, encoding),
            _ => return None,
        },
        _ => return None,
    };

    Some(PdfTextRun {
        fragments: raw.iter().map(|s| encode_fragment(s)).collect(),
    })
}

fn page_from_operations(operations: &[Operation], fonts: &FontEncodings) -> PdfPage {
    let mut page = PdfPage::default();
    let mut current: Option<PdfTextElement> = None;
    let mut encoding: Option<&Encoding> = None;

    for op in operations {
        match op.operator.as_str() {
            "BT" => {
                if let Some(element) = current.take() {
                    page.texts.push(element);
                }
                current = Some(PdfTextElement::default());
            }
            "ET" => {
                if let Some(element) = current.take() {
                    page.texts.push(element);
                }
            }
            "Tf" => {
                encoding = op
                    .operands
                    .first()
                    .and_then(|name| name.as_name().ok())
                    .and_then(|name| fonts.get(name));
            }
            _ => {
                if let Some(run) = run_from_operation(op, encoding) {
                    // Text shown outside BT/ET still counts, as its own element
                    current.get_or_insert_with(PdfTextElement::default).runs.push(run);
                }
            }
        }
    }
    if let Some(element) = current {
        page.texts.push(element);
    }

    page.texts.retain(|element| !element.runs.is_empty());
    page
}

/// Parse raw PDF bytes into a text tree. Blocking; call from a blocking thread.
pub fn parse_document_tree(data: &[u8]) -> Result<PdfDocumentTree, ExtractionError> {
    let document =
        Document::load_mem(data).map_err(|e| ExtractionError::PdfParse(e.to_string()))?;

    let mut tree = PdfDocumentTree::default();
    for (page_number, page_id) in document.get_pages() {
        let raw = document.get_page_content(page_id).map_err(|e| {
            ExtractionError::PdfParse(format!("page {}: {}", page_number, e))
        })?;
        let content = Content::decode(&raw).map_err(|e| {
            ExtractionError::PdfParse(format!("page {} content: {}", page_number, e))
        })?;
        let fonts = page_font_encodings(&document, page_id);
        tree.pages.push(page_from_operations(&content.operations, &fonts));
    }

    Ok(tree)
}

/// PDF extractor backed by `lopdf`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TextExtractor for PdfExtractor {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pdf
    }

    async fn extract(&self, data: Bytes) -> Result<String, ExtractionError> {
        let tree = parse_off_runtime(move || parse_document_tree(&data)).await?;
        Ok(tree.collect_text())
    }
}

/// Run `parse` on the blocking pool. A panic inside the parser settles as a
/// `PdfParse` error; this relies on the unwinding panic strategy.
async fn parse_off_runtime<F>(parse: F) -> Result<PdfDocumentTree, ExtractionError>
where
    F: FnOnce() -> Result<PdfDocumentTree, ExtractionError> + Send + 'static,
{
    tokio::task::spawn_blocking(parse)
        .await
        .map_err(|e| ExtractionError::PdfParse(format!("parser task failed: {}", e)))?
}

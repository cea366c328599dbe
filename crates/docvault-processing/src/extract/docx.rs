//! DOCX text extraction
//!
//! The primary pass reads the raw text of `word/document.xml`. When that comes
//! back blank the document is rendered to HTML (which also carries footnotes
//! and endnotes) and the text is recovered from the markup.

use std::collections::HashMap;
use std::io::{Cursor, Read, Seek};
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use bytes::Bytes;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use regex::Regex;
use zip::result::ZipError;
use zip::ZipArchive;

use super::format::DocumentFormat;
use super::TextExtractor;
use crate::error::ExtractionError;

const DOCUMENT_PART: &str = "word/document.xml";
const FOOTNOTES_PART: &str = "word/footnotes.xml";
const ENDNOTES_PART: &str = "word/endnotes.xml";

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static NBSP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"&nbsp;").expect("nbsp pattern is valid"));
static ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&(?:[a-zA-Z][a-zA-Z0-9]*|#[0-9]+|#[xX][0-9a-fA-F]+);")
        .expect("entity pattern is valid")
});
static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// The two conversions the extractor needs from a DOCX backend.
///
/// Both run on a blocking thread.
pub trait DocxConverter: Send + Sync {
    /// Text of every run, `\n\n` after each paragraph.
    fn extract_raw_text(&self, data: &[u8]) -> Result<String, ExtractionError>;

    /// HTML rendering of the document body followed by its notes.
    fn convert_to_html(&self, data: &[u8]) -> Result<String, ExtractionError>;
}

/// Strip markup from converter HTML.
///
/// A regex pass, not an HTML parser: tags are dropped, `&nbsp;` and every
/// other entity become a space, whitespace collapses, and the result is trimmed.
pub fn html_to_text(html: &str) -> String {
    let text = TAG.replace_all(html, "");
    let text = NBSP.replace_all(&text, " ");
    let text = ENTITY.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

fn extract_with_fallback<C: DocxConverter + ?Sized>(
    converter: &C,
    data: &[u8],
) -> Result<String, ExtractionError> {
    let raw = converter.extract_raw_text(data)?;
    if !raw.trim().is_empty() {
        return Ok(raw);
    }

    tracing::debug!("DOCX raw text is blank, falling back to HTML conversion");
    let html = converter.convert_to_html(data)?;
    Ok(html_to_text(&html))
}

/// DOCX extractor over a pluggable converter.
pub struct DocxExtractor<C = OoxmlConverter> {
    converter: Arc<C>,
}

impl DocxExtractor<OoxmlConverter> {
    pub fn new() -> Self {
        Self::with_converter(OoxmlConverter)
    }
}

impl Default for DocxExtractor<OoxmlConverter> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: DocxConverter + 'static> DocxExtractor<C> {
    pub fn with_converter(converter: C) -> Self {
        Self {
            converter: Arc::new(converter),
        }
    }
}

#[async_trait]
impl<C: DocxConverter + 'static> TextExtractor for DocxExtractor<C> {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    async fn extract(&self, data: Bytes) -> Result<String, ExtractionError> {
        let converter = Arc::clone(&self.converter);
        tokio::task::spawn_blocking(move || extract_with_fallback(converter.as_ref(), &data))
            .await
            .map_err(|e| ExtractionError::DocxExtraction(format!("extraction task failed: {}", e)))?
    }
}

/// Office Open XML converter built on `zip` and `quick-xml`.
#[derive(Debug, Default, Clone, Copy)]
pub struct OoxmlConverter;

impl DocxConverter for OoxmlConverter {
    fn extract_raw_text(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let package = DocxPackage::open(data)?;
        raw_text_from_xml(&package.document)
    }

    fn convert_to_html(&self, data: &[u8]) -> Result<String, ExtractionError> {
        let package = DocxPackage::open(data)?;

        let mut body = HtmlRenderer::default();
        for_each_event(&package.document, |event| {
            body.feed(event);
            Ok(())
        })?;
        let note_refs = std::mem::take(&mut body.note_refs);
        let mut html = body.finish();

        for kind in [NoteKind::Footnote, NoteKind::Endnote] {
            let ids: Vec<&String> = note_refs
                .iter()
                .filter(|(k, _)| *k == kind)
                .map(|(_, id)| id)
                .collect();
            if ids.is_empty() {
                continue;
            }

            let notes = match package.notes(kind) {
                Some(xml) => render_notes(xml)?,
                None => HashMap::new(),
            };

            html.push_str("<ol>");
            for id in ids {
                let note = notes.get(id).map(String::as_str).unwrap_or("");
                html.push_str(&format!(
                    "<li id=\"{kind}-{id}\">{note} <a href=\"#{kind}-ref-{id}\">↑</a></li>\n",
                    kind = kind.as_str(),
                ));
            }
            html.push_str("</ol>\n");
        }

        Ok(html)
    }
}

fn docx_error(context: &str, err: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::DocxExtraction(format!("{}: {}", context, err))
}

struct DocxPackage {
    document: String,
    footnotes: Option<String>,
    endnotes: Option<String>,
}

impl DocxPackage {
    fn open(data: &[u8]) -> Result<Self, ExtractionError> {
        let mut archive = ZipArchive::new(Cursor::new(data))
            .map_err(|e| docx_error("could not open DOCX container", e))?;

        let document = read_part(&mut archive, DOCUMENT_PART)?.ok_or_else(|| {
            ExtractionError::DocxExtraction(format!("{} not found in container", DOCUMENT_PART))
        })?;

        Ok(Self {
            document,
            footnotes: read_part(&mut archive, FOOTNOTES_PART)?,
            endnotes: read_part(&mut archive, ENDNOTES_PART)?,
        })
    }

    fn notes(&self, kind: NoteKind) -> Option<&str> {
        match kind {
            NoteKind::Footnote => self.footnotes.as_deref(),
            NoteKind::Endnote => self.endnotes.as_deref(),
        }
    }
}

fn read_part<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<String>, ExtractionError> {
    let mut entry = match archive.by_name(name) {
        Ok(entry) => entry,
        Err(ZipError::FileNotFound) => return Ok(None),
        Err(e) => return Err(docx_error(&format!("could not read {}", name), e)),
    };

    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| docx_error(&format!("could not read {}", name), e))?;
    Ok(Some(xml))
}

/// Drop the namespace prefix of a qualified name.
fn local_name(name: &[u8]) -> &[u8] {
    match name.iter().position(|&b| b == b':') {
        Some(idx) => &name[idx + 1..],
        None => name,
    }
}

fn attr_value(element: &BytesStart, key: &[u8]) -> Option<String> {
    element
        .attributes()
        .with_checks(false)
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == key)
        .and_then(|attr| attr.unescape_value().ok().map(|v| v.into_owned()))
}

/// Drive `handle` over every event of `xml`, with text already unescaped.
fn for_each_event<F>(xml: &str, mut handle: F) -> Result<(), ExtractionError>
where
    F: FnMut(XmlEvent<'_>) -> Result<(), ExtractionError>,
{
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) => handle(XmlEvent::Start(e))?,
            Ok(Event::Empty(ref e)) => handle(XmlEvent::Empty(e))?,
            Ok(Event::End(ref e)) => handle(XmlEvent::End(local_name(e.name().as_ref())))?,
            Ok(Event::Text(t)) => {
                let text = t.unescape().map_err(|e| docx_error("malformed XML text", e))?;
                handle(XmlEvent::Text(&text))?
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(docx_error(
                    &format!("malformed XML at byte {}", reader.buffer_position()),
                    e,
                ))
            }
            _ => {}
        }
        buf.clear();
    }

    Ok(())
}

enum XmlEvent<'a> {
    Start(&'a BytesStart<'a>),
    Empty(&'a BytesStart<'a>),
    End(&'a [u8]),
    Text(&'a str),
}

fn raw_text_from_xml(xml: &str) -> Result<String, ExtractionError> {
    let mut text = String::new();
    let mut run_depth = 0usize;
    let mut in_text = false;

    for_each_event(xml, |event| {
        match event {
            XmlEvent::Start(e) => match local_name(e.name().as_ref()) {
                b"r" => run_depth += 1,
                b"t" => in_text = true,
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" if run_depth > 0 => text.push('\n'),
                _ => {}
            },
            XmlEvent::Empty(e) => match local_name(e.name().as_ref()) {
                b"tab" if run_depth > 0 => text.push('\t'),
                b"br" | b"cr" if run_depth > 0 => text.push('\n'),
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            XmlEvent::End(name) => match name {
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text = false,
                b"p" => text.push_str("\n\n"),
                _ => {}
            },
            XmlEvent::Text(t) if in_text => text.push_str(t),
            XmlEvent::Text(_) => {}
        }
        Ok(())
    })?;

    Ok(text)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoteKind {
    Footnote,
    Endnote,
}

impl NoteKind {
    fn as_str(&self) -> &'static str {
        match self {
            NoteKind::Footnote => "footnote",
            NoteKind::Endnote => "endnote",
        }
    }

    fn from_reference(name: &[u8]) -> Option<Self> {
        match name {
            b"footnoteReference" => Some(NoteKind::Footnote),
            b"endnoteReference" => Some(NoteKind::Endnote),
            _ => None,
        }
    }

    fn from_container(name: &[u8]) -> Option<Self> {
        match name {
            b"footnote" => Some(NoteKind::Footnote),
            b"endnote" => Some(NoteKind::Endnote),
            _ => None,
        }
    }
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            other => out.push(other),
        }
    }
    out
}

fn heading_tag(style: &str) -> Option<&'static str> {
    match style.strip_prefix("Heading")?.trim() {
        "1" => Some("h1"),
        "2" => Some("h2"),
        "3" => Some("h3"),
        "4" => Some("h4"),
        "5" => Some("h5"),
        "6" => Some("h6"),
        _ => None,
    }
}

struct OpenParagraph {
    tag: &'static str,
    body: String,
}

/// Streaming WordprocessingML → HTML renderer.
#[derive(Default)]
struct HtmlRenderer {
    html: String,
    // Text boxes nest paragraphs inside runs
    paragraphs: Vec<OpenParagraph>,
    run_depth: usize,
    in_text: bool,
    note_refs: Vec<(NoteKind, String)>,
}

impl HtmlRenderer {
    fn feed(&mut self, event: XmlEvent<'_>) {
        match event {
            XmlEvent::Start(e) => self.open(e, false),
            XmlEvent::Empty(e) => self.open(e, true),
            XmlEvent::End(name) => self.close(name),
            XmlEvent::Text(t) => {
                if self.in_text {
                    let escaped = escape_html(t);
                    self.push_inline(&escaped);
                }
            }
        }
    }

    fn open(&mut self, e: &BytesStart, empty: bool) {
        let name = e.name();
        let local = local_name(name.as_ref());
        match local {
            b"p" => {
                self.paragraphs.push(OpenParagraph {
                    tag: "p",
                    body: String::new(),
                });
                if empty {
                    self.close(b"p");
                }
            }
            b"pStyle" => {
                let tag = attr_value(e, b"val").and_then(|style| heading_tag(&style));
                if let (Some(tag), Some(paragraph)) = (tag, self.paragraphs.last_mut()) {
                    paragraph.tag = tag;
                }
            }
            b"r" if !empty => self.run_depth += 1,
            b"t" if !empty => self.in_text = true,
            b"tab" if self.run_depth > 0 => self.push_inline("\t"),
            b"br" | b"cr" if self.run_depth > 0 => self.push_inline("<br />"),
            b"tbl" | b"tr" | b"tc" => {
                self.html.push_str(match local {
                    b"tbl" => "<table>",
                    b"tr" => "<tr>",
                    _ => "<td>",
                });
                if empty {
                    self.close(local);
                }
            }
            other => {
                if let Some(kind) = NoteKind::from_reference(other) {
                    if let Some(id) = attr_value(e, b"id") {
                        let number = self.note_refs.iter().filter(|(k, _)| *k == kind).count() + 1;
                        self.push_inline(&format!(
                            "<sup><a href=\"#{kind}-{id}\" id=\"{kind}-ref-{id}\">[{number}]</a></sup>",
                            kind = kind.as_str(),
                        ));
                        self.note_refs.push((kind, id));
                    }
                }
            }
        }
    }

    fn close(&mut self, local: &[u8]) {
        match local {
            b"p" => {
                if let Some(paragraph) = self.paragraphs.pop() {
                    // Empty paragraphs are dropped
                    if !paragraph.body.trim().is_empty() {
                        self.html.push_str(&format!(
                            "<{tag}>{body}</{tag}>\n",
                            tag = paragraph.tag,
                            body = paragraph.body
                        ));
                    }
                }
            }
            b"r" => self.run_depth = self.run_depth.saturating_sub(1),
            b"t" => self.in_text = false,
            b"tbl" => self.html.push_str("</table>\n"),
            b"tr" => self.html.push_str("</tr>\n"),
            b"tc" => self.html.push_str("</td>\n"),
            _ => {}
        }
    }

    fn push_inline(&mut self, fragment: &str) {
        match self.paragraphs.last_mut() {
            Some(paragraph) => paragraph.body.push_str(fragment),
            None => self.html.push_str(fragment),
        }
    }

    fn finish(mut self) -> String {
        while !self.paragraphs.is_empty() {
            self.close(b"p");
        }
        self.html
    }
}

/// Render every real note in a notes part, keyed by its id. Separator notes are skipped.
fn render_notes(xml: &str) -> Result<HashMap<String, String>, ExtractionError> {
    let mut notes = HashMap::new();
    let mut current: Option<(String, HtmlRenderer)> = None;

    for_each_event(xml, |event| {
        match event {
            XmlEvent::Start(e) if NoteKind::from_container(local_name(e.name().as_ref())).is_some() => {
                let is_separator = attr_value(e, b"type")
                    .is_some_and(|t| t != "normal");
                current = match (is_separator, attr_value(e, b"id")) {
                    (false, Some(id)) => Some((id, HtmlRenderer::default())),
                    _ => None,
                };
            }
            XmlEvent::End(name) if NoteKind::from_container(name).is_some() => {
                if let Some((id, renderer)) = current.take() {
                    notes.insert(id, renderer.finish().trim_end().to_string());
                }
            }
            other => {
                if let Some((_, renderer)) = current.as_mut() {
                    renderer.feed(other);
                }
            }
        }
        Ok(())
    })?;

    Ok(notes)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    pub(crate) fn make_docx(parts: &[(&str, String)]) -> Vec<u8> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            for (name, body) in parts {
                zip.start_file(*name, FileOptions::default()).unwrap();
                zip.write_all(body.as_bytes()).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.into_inner()
    }

    pub(crate) fn document_xml(body: &str) -> String {
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {NS}><w:body>{body}</w:body></w:document>"#
        )
    }

    pub(crate) fn make_simple_docx(paragraphs: &[&str]) -> Vec<u8> {
        let body: String = paragraphs
            .iter()
            .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{p}</w:t></w:r></w:p>"))
            .collect();
        make_docx(&[("word/document.xml", document_xml(&body))])
    }

    struct StubConverter {
        raw: Result<String, String>,
        html: Result<String, String>,
        html_calls: AtomicUsize,
    }

    impl StubConverter {
        fn new(raw: &str, html: Result<&str, &str>) -> Self {
            Self {
                raw: Ok(raw.to_string()),
                html: html.map(str::to_string).map_err(str::to_string),
                html_calls: AtomicUsize::new(0),
            }
        }
    }

    impl DocxConverter for StubConverter {
        fn extract_raw_text(&self, _data: &[u8]) -> Result<String, ExtractionError> {
            self.raw.clone().map_err(ExtractionError::DocxExtraction)
        }

        fn convert_to_html(&self, _data: &[u8]) -> Result<String, ExtractionError> {
            self.html_calls.fetch_add(1, Ordering::SeqCst);
            self.html.clone().map_err(ExtractionError::DocxExtraction)
        }
    }

    #[tokio::test]
    async fn test_raw_text_keeps_paragraph_breaks() {
        let body = concat!(
            r#"<w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/></w:tabs></w:pPr>"#,
            r#"<w:r><w:t>Hello</w:t><w:tab/><w:t>World</w:t></w:r></w:p>"#,
            r#"<w:p><w:r><w:t xml:space="preserve">Second </w:t><w:br/><w:t>line &amp; more</w:t></w:r></w:p>"#,
        );
        let docx = make_docx(&[("word/document.xml", document_xml(body))]);

        let text = DocxExtractor::new().extract(Bytes::from(docx)).await.unwrap();

        assert_eq!(text, "Hello\tWorld\n\nSecond \nline & more\n\n");
    }

    #[tokio::test]
    async fn test_image_only_document_is_empty_not_error() {
        let body = concat!(
            r#"<w:p><w:r><w:drawing><wp:inline xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing">"#,
            r#"<wp:docPr id="1" name="Picture 1"/></wp:inline></w:drawing></w:r></w:p>"#,
            r#"<w:p/>"#,
        );
        let docx = make_docx(&[("word/document.xml", document_xml(body))]);

        let text = DocxExtractor::new().extract(Bytes::from(docx)).await.unwrap();

        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_footnote_text_recovered_through_html_fallback() {
        let body = r#"<w:p><w:r><w:footnoteReference w:id="2"/></w:r></w:p>"#;
        let footnotes = format!(
            concat!(
                r#"<w:footnotes {NS}>"#,
                r#"<w:footnote w:type="separator" w:id="-1"><w:p><w:r><w:separator/></w:r></w:p></w:footnote>"#,
                r#"<w:footnote w:id="2"><w:p><w:r><w:t>See appendix B</w:t></w:r></w:p></w:footnote>"#,
                r#"</w:footnotes>"#
            ),
            NS = NS
        );
        let docx = make_docx(&[
            ("word/document.xml", document_xml(body)),
            ("word/footnotes.xml", footnotes),
        ]);

        let raw = OoxmlConverter.extract_raw_text(&docx).unwrap();
        assert!(raw.trim().is_empty());

        let text = DocxExtractor::new().extract(Bytes::from(docx)).await.unwrap();
        assert!(text.contains("See appendix B"), "got {:?}", text);
    }

    #[tokio::test]
    async fn test_whitespace_raw_text_uses_html_text() {
        let stub = StubConverter::new(
            "  \n\t\n ",
            Ok("<h1>Menu</h1>\n<p>Caf&eacute; &amp; bar&nbsp;open</p>"),
        );
        let extractor = DocxExtractor::with_converter(stub);

        let text = extractor.extract(Bytes::from_static(b"PK")).await.unwrap();

        assert_eq!(text, "Menu Caf bar open");
        assert_eq!(extractor.converter.html_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_html_pass_skipped_when_raw_text_present() {
        let extractor = DocxExtractor::with_converter(StubConverter::new("Body", Err("boom")));

        let text = extractor.extract(Bytes::from_static(b"PK")).await.unwrap();

        assert_eq!(text, "Body");
        assert_eq!(extractor.converter.html_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_extraction_error() {
        let extractor = DocxExtractor::with_converter(StubConverter::new(" ", Err("bad markup")));

        let err = extractor.extract(Bytes::from_static(b"PK")).await.unwrap_err();

        assert!(matches!(err, ExtractionError::DocxExtraction(ref m) if m == "bad markup"));
    }

    #[tokio::test]
    async fn test_not_a_zip_is_extraction_error() {
        let err = DocxExtractor::new()
            .extract(Bytes::from_static(b"definitely not a zip"))
            .await
            .unwrap_err();

        assert!(matches!(err, ExtractionError::DocxExtraction(_)));
        assert!(err.to_string().starts_with("DOCX extraction error: could not open DOCX container"));
    }

    #[tokio::test]
    async fn test_missing_document_part_is_extraction_error() {
        let docx = make_docx(&[("word/styles.xml", "<w:styles/>".to_string())]);

        let err = DocxExtractor::new().extract(Bytes::from(docx)).await.unwrap_err();

        assert!(err.to_string().contains("word/document.xml"));
    }

    #[test]
    fn test_html_rendering_of_headings_and_tables() {
        let body = concat!(
            r#"<w:p><w:pPr><w:pStyle w:val="Heading2"/></w:pPr><w:r><w:t>Results</w:t></w:r></w:p>"#,
            r#"<w:tbl><w:tr><w:tc><w:p><w:r><w:t>a &lt; b</w:t></w:r></w:p></w:tc></w:tr></w:tbl>"#,
            r#"<w:p><w:r><w:t>Price:"#,
            "\u{a0}",
            r#"5</w:t></w:r></w:p>"#,
        );
        let docx = make_docx(&[("word/document.xml", document_xml(body))]);

        let html = OoxmlConverter.convert_to_html(&docx).unwrap();

        assert!(html.contains("<h2>Results</h2>"));
        assert!(html.contains("<table><tr><td><p>a &lt; b</p>\n</td>\n</tr>\n</table>"));
        assert!(html.contains("<p>Price:&nbsp;5</p>"));
    }

    #[test]
    fn test_html_to_text_collapses_and_trims() {
        assert_eq!(html_to_text("  <p>one</p>\n\n<p>two&#160;three&#x41;</p> "), "one two three");
        assert_eq!(html_to_text("<p></p>"), "");
    }

    #[test]
    fn test_local_name_strips_prefix() {
        assert_eq!(local_name(b"w:t"), b"t");
        assert_eq!(local_name(b"t"), b"t");
    }
}

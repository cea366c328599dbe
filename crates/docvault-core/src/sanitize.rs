//! Filename and storage path sanitization
//!
//! User-supplied names are turned into lower-case, hyphenated, ASCII-only base
//! names. The extension is kept exactly as given. Both functions are total and
//! deterministic, so the same input always maps to the same storage key.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::FALLBACK_FILENAME;

static UUID_SEGMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{4}-[0-9a-f]{12}$")
        .expect("uuid segment pattern is valid")
});

/// Emoji and pictograph code points that are dropped outright instead of
/// being turned into hyphens.
fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F300..=0x1F9FF | 0x1FA70..=0x1FAFF | 0x2600..=0x27BF | 0xFE0F | 0x200D
    )
}

/// Split `name` at its last dot. A dot in first position does not start an
/// extension, so `.env` is all base name.
fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

fn normalize_base(base: &str) -> String {
    let mut out = String::with_capacity(base.len());
    let mut pending_hyphen = false;

    for c in base.chars().filter(|c| !is_emoji(*c)) {
        let keep = c.is_ascii_alphanumeric() || c == '_';
        if keep {
            if pending_hyphen && !out.is_empty() {
                out.push('-');
            }
            pending_hyphen = false;
            out.push(c.to_ascii_lowercase());
        } else {
            // Whitespace, hyphens and every other disallowed character all
            // fold into a single separator.
            pending_hyphen = true;
        }
    }

    out
}

/// Normalize a user-supplied filename into a safe storage key segment.
///
/// ```
/// use docvault_core::sanitize_filename;
///
/// assert_eq!(sanitize_filename("Résumé final!!.pdf"), "r-sum-final.pdf");
/// assert_eq!(sanitize_filename("😀😀😀.docx"), "file.docx");
/// assert_eq!(sanitize_filename("Quarterly Report.DOCX"), "quarterly-report.DOCX");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let (base, extension) = split_extension(name);
    let mut sanitized = normalize_base(base);
    if sanitized.is_empty() {
        sanitized.push_str(FALLBACK_FILENAME);
    }
    sanitized.push_str(extension);
    sanitized
}

/// Sanitize every `/`-separated segment of a storage path.
///
/// A leading segment shaped like a UUID is the owner namespace and passes
/// through untouched.
pub fn sanitize_storage_path(path: &str) -> String {
    path.split('/')
        .enumerate()
        .map(|(idx, segment)| {
            if idx == 0 && UUID_SEGMENT.is_match(segment) {
                segment.to_string()
            } else {
                sanitize_filename(segment)
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

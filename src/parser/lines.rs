//! Offset → line conversion and body line splitting

use serde::Serialize;

/// Convert a byte offset into a 1-based line number.
///
/// Counts the `\n` characters in `text[..offset]` and adds one. Offsets past
/// the end of the text are clamped to its length.
pub fn line_of(text: &str, offset: usize) -> usize {
    let end = offset.min(text.len());
    text.as_bytes()[..end].iter().filter(|&&b| b == b'\n').count() + 1
}

/// One line of a captured construct body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BodyLine {
    /// The line as it appears in the source (without the line break)
    pub content: String,
    pub trimmed: String,
}

impl BodyLine {
    pub fn new(raw: &str) -> Self {
        let content = raw.strip_suffix('\r').unwrap_or(raw);
        BodyLine {
            content: content.to_string(),
            trimmed: content.trim().to_string(),
        }
    }
}

/// Split captured body text into line records. An empty body has no lines.
pub fn split_body(body: &str) -> Vec<BodyLine> {
    if body.is_empty() {
        return Vec::new();
    }
    body.split('\n').map(BodyLine::new).collect()
}

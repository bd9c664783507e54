//! JSON rendering of extracted segments.

use serde::Serialize;

use crate::detect::Format;
use crate::model::{ParsedDocument, TextSegment};
use crate::parser::ParseConfig;

use super::apply_note_policy;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

#[derive(Serialize)]
struct JsonDocument<'a> {
    format: Format,
    segments: &'a [TextSegment],
}

/// Convert a document to JSON after applying the notes placement policy.
pub fn to_json(
    doc: &ParsedDocument,
    config: &ParseConfig,
    format: JsonFormat,
) -> serde_json::Result<String> {
    let segments = apply_note_policy(&doc.segments, config);
    let view = JsonDocument {
        format: doc.format,
        segments: &segments,
    };

    match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(&view),
        JsonFormat::Compact => serde_json::to_string(&view),
    }
}

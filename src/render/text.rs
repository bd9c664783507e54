//! Plain text assembly.

use std::borrow::Cow;

use crate::model::{ParsedDocument, TextSegment};
use crate::parser::ParseConfig;

/// Apply the notes placement policy to a segment sequence.
///
/// With `ignore_notes` every note segment is dropped. Otherwise, with
/// `put_notes_at_last`, notes move behind all other segments and keep their
/// relative order.
pub fn apply_note_policy<'a>(
    segments: &'a [TextSegment],
    config: &ParseConfig,
) -> Cow<'a, [TextSegment]> {
    if config.ignore_notes {
        return Cow::Owned(segments.iter().filter(|s| !s.is_note()).cloned().collect());
    }
    if config.put_notes_at_last {
        let (notes, rest): (Vec<&TextSegment>, Vec<&TextSegment>) =
            segments.iter().partition(|s| s.is_note());
        return Cow::Owned(rest.into_iter().chain(notes).cloned().collect());
    }
    Cow::Borrowed(segments)
}

/// Convert a document to plain text.
///
/// Every line of every segment is joined with `newline_delimiter`.
pub fn to_text(doc: &ParsedDocument, config: &ParseConfig) -> String {
    let segments = apply_note_policy(&doc.segments, config);
    segments
        .iter()
        .flat_map(|s| s.lines.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(&config.newline_delimiter)
}

//! Text segment types.

use serde::{Deserialize, Serialize};

/// Structural origin of a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentKind {
    /// Regular flowing text (paragraphs, headings, text frames, PDF runs)
    Body,
    /// Text inside a table or spreadsheet cell
    TableCell,
    /// Page or slide header
    Header,
    /// Page or slide footer
    Footer,
    /// Presentation speaker notes
    Note,
}

/// One ordered unit of extracted text.
///
/// A segment carries one or more logical lines. Lines never contain a
/// newline character; the assembler joins them with the configured
/// delimiter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextSegment {
    /// Where the text came from
    pub kind: SegmentKind,

    /// Logical lines of the segment
    pub lines: Vec<String>,
}

impl TextSegment {
    /// Create a segment from text, splitting it into lines.
    pub fn new(kind: SegmentKind, text: impl AsRef<str>) -> Self {
        Self {
            kind,
            lines: split_lines(text.as_ref()),
        }
    }

    /// Create a segment from already separated lines.
    pub fn from_lines(kind: SegmentKind, lines: Vec<String>) -> Self {
        Self {
            kind,
            lines: lines.iter().flat_map(|l| split_lines(l)).collect(),
        }
    }

    /// Create a body segment.
    pub fn body(text: impl AsRef<str>) -> Self {
        Self::new(SegmentKind::Body, text)
    }

    /// Create a note segment.
    pub fn note(text: impl AsRef<str>) -> Self {
        Self::new(SegmentKind::Note, text)
    }

    /// Create a table cell segment.
    pub fn cell(text: impl AsRef<str>) -> Self {
        Self::new(SegmentKind::TableCell, text)
    }

    /// An empty body line, used to mark page boundaries.
    pub fn blank_line() -> Self {
        Self {
            kind: SegmentKind::Body,
            lines: vec![String::new()],
        }
    }

    /// Check if this is a note segment.
    pub fn is_note(&self) -> bool {
        self.kind == SegmentKind::Note
    }

    /// Check if the segment has no visible text.
    pub fn is_empty(&self) -> bool {
        self.lines.iter().all(|l| l.is_empty())
    }

    /// Get the text of the segment with lines joined by `delimiter`.
    pub fn text(&self, delimiter: &str) -> String {
        self.lines.join(delimiter)
    }
}

/// Split text on `\n`, dropping a trailing `\r` from each line.
fn split_lines(text: &str) -> Vec<String> {
    text.split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_splits_lines() {
        let seg = TextSegment::cell("first\r\nsecond\nthird");
        assert_eq!(seg.lines, vec!["first", "second", "third"]);
        assert_eq!(seg.text(" | "), "first | second | third");
        assert_eq!(seg.kind, SegmentKind::TableCell);
    }

    #[test]
    fn test_segment_empty() {
        assert!(TextSegment::body("").is_empty());
        assert!(TextSegment::blank_line().is_empty());
        assert!(!TextSegment::note("n").is_empty());
        assert!(TextSegment::note("n").is_note());
    }

    #[test]
    fn test_from_lines_never_keeps_newlines() {
        let seg = TextSegment::from_lines(
            SegmentKind::Body,
            vec!["a\nb".to_string(), "c".to_string()],
        );
        assert_eq!(seg.lines, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_kind_serialization() {
        let json = serde_json::to_string(&SegmentKind::TableCell).unwrap();
        assert_eq!(json, "\"table_cell\"");
    }
}

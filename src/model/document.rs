//! Document-level types.

use serde::{Deserialize, Serialize};

use super::{SegmentKind, TextSegment};
use crate::detect::Format;

/// The ordered text segments extracted from one document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDocument {
    /// Format the document was parsed as
    pub format: Format,

    /// Segments in reading order
    pub segments: Vec<TextSegment>,
}

impl ParsedDocument {
    /// Create a new empty document.
    pub fn new(format: Format) -> Self {
        Self {
            format,
            segments: Vec::new(),
        }
    }

    /// Create a document from segments, dropping empty ones.
    pub fn with_segments(format: Format, segments: Vec<TextSegment>) -> Self {
        let mut doc = Self::new(format);
        doc.extend(segments);
        doc
    }

    /// Add a segment. Segments without visible text are skipped.
    pub fn push(&mut self, segment: TextSegment) {
        if !segment.is_empty() {
            self.segments.push(segment);
        }
    }

    /// Add a segment even if it carries no visible text.
    pub fn push_raw(&mut self, segment: TextSegment) {
        self.segments.push(segment);
    }

    /// Add several segments, skipping empty ones.
    pub fn extend(&mut self, segments: impl IntoIterator<Item = TextSegment>) {
        for segment in segments {
            self.push(segment);
        }
    }

    /// Get the number of segments.
    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    /// Check if the document has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Iterate over the segments of one kind.
    pub fn segments_of(&self, kind: SegmentKind) -> impl Iterator<Item = &TextSegment> {
        self.segments.iter().filter(move |s| s.kind == kind)
    }

    /// Check if the document has any note segments.
    pub fn has_notes(&self) -> bool {
        self.segments.iter().any(TextSegment::is_note)
    }
}

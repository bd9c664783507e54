//! Paragraph accumulation shared by the XML walkers.

use crate::model::{SegmentKind, TextSegment};

#[derive(Debug)]
struct OpenParagraph {
    kind: SegmentKind,
    /// Never empty; the last entry is the line being written.
    lines: Vec<String>,
}

impl OpenParagraph {
    fn new(kind: SegmentKind) -> Self {
        Self {
            kind,
            lines: vec![String::new()],
        }
    }

    fn take(&mut self) -> TextSegment {
        let lines = std::mem::replace(&mut self.lines, vec![String::new()]);
        TextSegment::from_lines(self.kind, lines)
    }
}

/// Turns paragraph open/close events into ordered segments.
///
/// Paragraphs may nest (a text box inside a paragraph, a footnote body at
/// its citation). Opening a nested paragraph emits the text collected so far
/// for the outer one, so the nested text lands right after its anchor.
#[derive(Debug, Default)]
pub struct SegmentBuilder {
    segments: Vec<TextSegment>,
    open: Vec<OpenParagraph>,
}

impl SegmentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a paragraph of the given kind.
    pub fn open_paragraph(&mut self, kind: SegmentKind) {
        if let Some(outer) = self.open.last_mut() {
            let partial = outer.take();
            Self::emit(&mut self.segments, partial);
        }
        self.open.push(OpenParagraph::new(kind));
    }

    /// Finish the innermost paragraph.
    pub fn close_paragraph(&mut self) {
        if let Some(mut paragraph) = self.open.pop() {
            let segment = paragraph.take();
            Self::emit(&mut self.segments, segment);
        }
    }

    /// Check if a paragraph is open.
    pub fn in_paragraph(&self) -> bool {
        !self.open.is_empty()
    }

    /// Append text to the innermost paragraph. Text outside any paragraph
    /// is dropped.
    pub fn push_text(&mut self, text: &str) {
        let Some(paragraph) = self.open.last_mut() else {
            return;
        };
        for (i, piece) in text.split('\n').enumerate() {
            if i > 0 {
                paragraph.lines.push(String::new());
            }
            if let Some(line) = paragraph.lines.last_mut() {
                line.push_str(piece.strip_suffix('\r').unwrap_or(piece));
            }
        }
    }

    /// Start a new logical line in the innermost paragraph.
    pub fn line_break(&mut self) {
        if let Some(paragraph) = self.open.last_mut() {
            paragraph.lines.push(String::new());
        }
    }

    /// Add a complete segment at the current position.
    pub fn push_segment(&mut self, segment: TextSegment) {
        Self::emit(&mut self.segments, segment);
    }

    /// Close any paragraph left open and return the segments.
    pub fn finish(mut self) -> Vec<TextSegment> {
        while self.in_paragraph() {
            self.close_paragraph();
        }
        self.segments
    }

    fn emit(segments: &mut Vec<TextSegment>, mut segment: TextSegment) {
        while segment.lines.last().is_some_and(|l| l.is_empty()) {
            segment.lines.pop();
        }
        if !segment.is_empty() {
            segments.push(segment);
        }
    }
}

//! Document model types.
//!
//! This module defines the intermediate representation that bridges the
//! per-format walkers and the assembler. The model is format-agnostic: every
//! walker produces the same ordered sequence of [`TextSegment`]s.

mod document;
mod segment;

pub use document::ParsedDocument;
pub use segment::{SegmentKind, TextSegment};

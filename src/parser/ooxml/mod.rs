//! Office Open XML (docx, pptx, xlsx) walkers.
//!
//! Every OOXML package is a zip of XML parts wired together by
//! relationship parts (`_rels/*.rels`). The walkers here read the parts a
//! [`Workspace`](super::workspace::Workspace) unpacked and turn them into
//! ordered [`TextSegment`](crate::model::TextSegment)s.

pub mod drawing;
pub mod presentation;
pub mod spreadsheet;
pub mod word;

use quick_xml::events::Event;

use crate::detect::Format;
use crate::error::Result;

use super::xml;

/// One entry of a relationships part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relationship {
    pub id: String,
    /// Relationship type URI
    pub rel_type: String,
    /// Target path, relative to the source part's directory
    pub target: String,
    /// `TargetMode="External"` (hyperlinks and the like)
    pub external: bool,
}

/// Parsed relationships part, in document order.
#[derive(Debug, Clone, Default)]
pub struct Relationships {
    entries: Vec<Relationship>,
}

impl Relationships {
    /// Parse a `.rels` part.
    pub fn parse(data: &[u8], format: Format, part: &str) -> Result<Self> {
        let mut reader = xml::reader(data);
        let mut buf = Vec::new();
        let mut entries = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                    if e.local_name().as_ref() == b"Relationship" {
                        let id = xml::attr(e, b"Id");
                        let target = xml::attr(e, b"Target");
                        if let (Some(id), Some(target)) = (id, target) {
                            entries.push(Relationship {
                                id,
                                rel_type: xml::attr(e, b"Type").unwrap_or_default(),
                                target,
                                external: xml::attr(e, b"TargetMode").as_deref()
                                    == Some("External"),
                            });
                        }
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml::malformed(format, part, e)),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self { entries })
    }

    /// Look up a relationship by id.
    pub fn get(&self, id: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| r.id == id)
    }

    /// First internal relationship whose type URI ends with `/kind`.
    pub fn first_of_kind(&self, kind: &str) -> Option<&Relationship> {
        self.entries.iter().find(|r| {
            !r.external
                && r.rel_type
                    .rsplit('/')
                    .next()
                    .is_some_and(|last| last == kind)
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Relationships part of a source part:
/// `ppt/slides/slide1.xml` → `ppt/slides/_rels/slide1.xml.rels`.
pub fn rels_part(part: &str) -> String {
    match part.rsplit_once('/') {
        Some((dir, file)) => format!("{}/_rels/{}.rels", dir, file),
        None => format!("_rels/{}.rels", part),
    }
}

/// Resolve a relationship target against the directory of its source part.
///
/// Absolute targets (`/xl/worksheets/sheet1.xml`) are package-rooted.
pub fn resolve_target(source_part: &str, target: &str) -> String {
    if let Some(rooted) = target.strip_prefix('/') {
        return normalize(Vec::new(), rooted);
    }
    let mut segments: Vec<&str> = source_part.split('/').collect();
    // Drop the source file name, keep its directory.
    segments.pop();
    normalize(segments, target)
}

fn normalize<'a>(mut segments: Vec<&'a str>, target: &'a str) -> String {
    for piece in target.split('/') {
        match piece {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}

//! OpenDocument (odt, odp, ods) walker.
//!
//! All three flavours keep their text in `content.xml` using the same
//! `text:p` / `text:h` vocabulary, so one walker serves them. What differs is
//! where paragraphs live: table cells in spreadsheets, `presentation:notes`
//! in presentations, and footnote bodies nested inside the paragraph that
//! cites them in text documents.

use quick_xml::events::{BytesStart, Event};

use crate::detect::Format;
use crate::error::Result;
use crate::model::{ParsedDocument, SegmentKind, TextSegment};

use super::options::ParseConfig;
use super::text_builder::SegmentBuilder;
use super::workspace::{part_pattern, Workspace};
use super::{xml, FormatHandler};

const PARTS: &str = r"^(content\.xml|styles\.xml|Object \d+/content\.xml)$";
const OBJECTS: &str = r"^Object (\d+)/content\.xml$";

const CONTENT: &str = "content.xml";
const STYLES: &str = "styles.xml";

/// Handler for one OpenDocument format.
#[derive(Debug)]
pub struct OdfHandler {
    format: Format,
}

impl OdfHandler {
    pub const fn new(format: Format) -> Self {
        Self { format }
    }
}

impl FormatHandler for OdfHandler {
    fn name(&self) -> &'static str {
        "opendocument"
    }

    fn formats(&self) -> &[Format] {
        std::slice::from_ref(&self.format)
    }

    fn parse(&self, data: &[u8], config: &ParseConfig) -> Result<ParsedDocument> {
        let format = self.format;
        let workspace = Workspace::unpack(data, format, &part_pattern(PARTS)?, config)?;
        let content = workspace.read(CONTENT)?;

        // Page headers and footers of text documents live in the master pages.
        let (headers, footers): (Vec<TextSegment>, Vec<TextSegment>) = match format {
            Format::Odt => match workspace.read_optional(STYLES)? {
                Some(styles) => walk_part(&styles, format, STYLES, Role::Styles)?
                    .into_iter()
                    .partition(|s| s.kind == SegmentKind::Header),
                None => Default::default(),
            },
            _ => Default::default(),
        };

        let mut doc = ParsedDocument::new(format);
        doc.extend(headers);
        doc.extend(walk_part(&content, format, CONTENT, Role::Content)?);
        for (_, part) in workspace.numbered_parts(&part_pattern(OBJECTS)?) {
            let xml = workspace.read(&part)?;
            doc.extend(walk_part(&xml, format, &part, Role::Content)?);
        }
        doc.extend(footers);

        Ok(doc)
    }
}

/// What a part holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Document body (`content.xml`, embedded objects)
    Content,
    /// Styles part; only master-page headers and footers carry text
    Styles,
}

#[derive(Debug)]
struct CellState {
    /// Value of a numeric cell, `NaN` when absent or malformed
    number: Option<String>,
    has_text: bool,
}

/// Walk one OpenDocument XML part.
pub fn walk_part(data: &[u8], format: Format, part: &str, role: Role) -> Result<Vec<TextSegment>> {
    let mut reader = xml::reader(data);
    let mut buf = Vec::new();
    let mut builder = SegmentBuilder::new();

    // Comments and tracked deletions are not document text.
    let mut skipped = 0usize;
    let mut citations = 0usize;
    let mut notes = 0usize;
    let mut headers = 0usize;
    let mut footers = 0usize;
    let mut cells: Vec<CellState> = Vec::new();
    let mut paragraphs: Vec<bool> = Vec::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml::malformed(format, part, e))?;

        match event {
            Event::Start(ref e) => match e.name().as_ref() {
                b"office:annotation" | b"text:tracked-changes" => skipped += 1,
                _ if skipped > 0 => {}
                b"text:p" | b"text:h" => {
                    let kind = match role {
                        Role::Styles if headers > 0 => Some(SegmentKind::Header),
                        Role::Styles if footers > 0 => Some(SegmentKind::Footer),
                        Role::Styles => None,
                        Role::Content if notes > 0 => Some(SegmentKind::Note),
                        Role::Content if !cells.is_empty() => Some(SegmentKind::TableCell),
                        Role::Content => Some(SegmentKind::Body),
                    };
                    if let Some(kind) = kind {
                        builder.open_paragraph(kind);
                    }
                    paragraphs.push(kind.is_some());
                }
                b"text:note-citation" => citations += 1,
                b"presentation:notes" => notes += 1,
                b"style:header" | b"style:header-left" | b"style:header-first" => headers += 1,
                b"style:footer" | b"style:footer-left" | b"style:footer-first" => footers += 1,
                b"table:table-cell" | b"table:covered-table-cell" => cells.push(cell_state(e)),
                _ => inline_mark(&mut builder, e, &paragraphs),
            },
            Event::Empty(ref e) if skipped == 0 => match e.name().as_ref() {
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if let Some(number) = cell_state(e).number {
                        builder.push_segment(TextSegment::cell(number));
                    }
                }
                _ => inline_mark(&mut builder, e, &paragraphs),
            },
            Event::End(ref e) => match e.name().as_ref() {
                b"office:annotation" | b"text:tracked-changes" => {
                    skipped = skipped.saturating_sub(1)
                }
                _ if skipped > 0 => {}
                b"text:p" | b"text:h" => {
                    if paragraphs.pop() == Some(true) {
                        builder.close_paragraph();
                    }
                }
                b"text:note-citation" => citations = citations.saturating_sub(1),
                b"presentation:notes" => notes = notes.saturating_sub(1),
                b"style:header" | b"style:header-left" | b"style:header-first" => {
                    headers = headers.saturating_sub(1)
                }
                b"style:footer" | b"style:footer-left" | b"style:footer-first" => {
                    footers = footers.saturating_sub(1)
                }
                b"table:table-cell" | b"table:covered-table-cell" => {
                    if let Some(CellState {
                        number: Some(number),
                        has_text: false,
                    }) = cells.pop()
                    {
                        builder.push_segment(TextSegment::cell(number));
                    }
                }
                _ => {}
            },
            Event::Text(ref e) if skipped == 0 && citations == 0 => {
                if paragraphs.last() == Some(&true) {
                    let text = xml::text(format, part, e)?;
                    if let Some(cell) = cells.last_mut() {
                        cell.has_text |= !text.trim().is_empty();
                    }
                    builder.push_text(&text);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.finish())
}

fn cell_state(e: &BytesStart<'_>) -> CellState {
    let numeric = matches!(
        xml::attr(e, b"office:value-type").as_deref(),
        Some("float" | "percentage" | "currency")
    );
    let number = numeric.then(|| match xml::attr(e, b"office:value") {
        Some(v) if v.trim().parse::<f64>().is_ok() => v.trim().to_string(),
        _ => "NaN".to_string(),
    });
    CellState {
        number,
        has_text: false,
    }
}

/// Elements inside a paragraph that stand for characters.
fn inline_mark(builder: &mut SegmentBuilder, e: &BytesStart<'_>, paragraphs: &[bool]) {
    if paragraphs.last() != Some(&true) {
        return;
    }
    match e.name().as_ref() {
        b"text:s" => {
            let count = xml::attr(e, b"text:c")
                .and_then(|c| c.trim().parse::<usize>().ok())
                .unwrap_or(1);
            builder.push_text(&" ".repeat(count));
        }
        b"text:tab" => builder.push_text("\t"),
        b"text:line-break" => builder.line_break(),
        _ => {}
    }
}

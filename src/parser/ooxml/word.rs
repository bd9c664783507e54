//! WordprocessingML (docx) walker.

use quick_xml::events::Event;

use crate::detect::Format;
use crate::error::Result;
use crate::model::{ParsedDocument, SegmentKind, TextSegment};
use crate::parser::options::ParseConfig;
use crate::parser::text_builder::SegmentBuilder;
use crate::parser::workspace::{part_pattern, Workspace};
use crate::parser::{xml, FormatHandler};

const FORMAT: Format = Format::Docx;

const PARTS: &str = r"^word/(document|footnotes|endnotes|header\d+|footer\d+)\.xml$";
const HEADERS: &str = r"^word/header(\d+)\.xml$";
const FOOTERS: &str = r"^word/footer(\d+)\.xml$";

const MAIN_PART: &str = "word/document.xml";
const NOTE_PARTS: [&str; 2] = ["word/footnotes.xml", "word/endnotes.xml"];

/// Handler for `.docx` documents.
///
/// Output order is headers, body, footnotes, endnotes, footers. Footnotes
/// and endnotes are regular body text here; they are not presentation notes.
#[derive(Debug, Default)]
pub struct WordHandler;

impl FormatHandler for WordHandler {
    fn name(&self) -> &'static str {
        "word"
    }

    fn formats(&self) -> &[Format] {
        &[Format::Docx]
    }

    fn parse(&self, data: &[u8], config: &ParseConfig) -> Result<ParsedDocument> {
        let workspace = Workspace::unpack(data, FORMAT, &part_pattern(PARTS)?, config)?;
        let main = workspace.read(MAIN_PART)?;

        let mut doc = ParsedDocument::new(FORMAT);
        for (_, part) in workspace.numbered_parts(&part_pattern(HEADERS)?) {
            doc.extend(walk_part(&workspace.read(&part)?, &part, SegmentKind::Header)?);
        }

        doc.extend(walk_part(&main, MAIN_PART, SegmentKind::Body)?);

        for part in NOTE_PARTS {
            if let Some(xml) = workspace.read_optional(part)? {
                doc.extend(walk_part(&xml, part, SegmentKind::Body)?);
            }
        }

        for (_, part) in workspace.numbered_parts(&part_pattern(FOOTERS)?) {
            doc.extend(walk_part(&workspace.read(&part)?, &part, SegmentKind::Footer)?);
        }

        Ok(doc)
    }
}

/// Walk one WordprocessingML part.
///
/// Paragraphs become segments of kind `base`, or table cells when they sit
/// inside `w:tbl`. Only `w:t` carries text, so deleted revisions and field
/// instructions are left out.
pub fn walk_part(data: &[u8], part: &str, base: SegmentKind) -> Result<Vec<TextSegment>> {
    let mut reader = xml::reader(data);
    let mut buf = Vec::new();
    let mut builder = SegmentBuilder::new();

    // mc:Fallback duplicates the mc:Choice content for older readers.
    let mut fallback = 0usize;
    let mut tables = 0usize;
    let mut runs = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml::malformed(FORMAT, part, e))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"Fallback" => fallback += 1,
                _ if fallback > 0 => {}
                b"p" => {
                    let kind = if tables > 0 {
                        SegmentKind::TableCell
                    } else {
                        base
                    };
                    builder.open_paragraph(kind);
                }
                b"tbl" => tables += 1,
                b"r" => runs += 1,
                b"t" => in_text = true,
                name => inline_mark(&mut builder, name, runs > 0),
            },
            Event::Empty(ref e) if fallback == 0 => {
                inline_mark(&mut builder, e.local_name().as_ref(), runs > 0)
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"Fallback" => fallback = fallback.saturating_sub(1),
                _ if fallback > 0 => {}
                b"p" => builder.close_paragraph(),
                b"tbl" => tables = tables.saturating_sub(1),
                b"r" => runs = runs.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(ref e) if in_text && fallback == 0 => {
                builder.push_text(&xml::text(FORMAT, part, e)?);
            }
            Event::CData(ref e) if in_text && fallback == 0 => {
                builder.push_text(&String::from_utf8_lossy(e));
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.finish())
}

/// Run-level elements that stand for characters.
fn inline_mark(builder: &mut SegmentBuilder, name: &[u8], in_run: bool) {
    match name {
        // w:tab also appears in paragraph properties as a tab stop.
        b"tab" if in_run => builder.push_text("\t"),
        b"br" | b"cr" => builder.line_break(),
        b"noBreakHyphen" => builder.push_text("-"),
        _ => {}
    }
}

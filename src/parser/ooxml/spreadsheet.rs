//! SpreadsheetML (xlsx) walker.

use quick_xml::events::Event;

use crate::detect::Format;
use crate::error::{Error, Result};
use crate::model::{ParsedDocument, SegmentKind, TextSegment};
use crate::parser::options::ParseConfig;
use crate::parser::workspace::{part_pattern, Workspace};
use crate::parser::{xml, FormatHandler};

use super::{drawing, rels_part, resolve_target, Relationships};

const FORMAT: Format = Format::Xlsx;

const PARTS: &str = r"^xl/(workbook\.xml|_rels/workbook\.xml\.rels|sharedStrings\.xml|worksheets/sheet\d+\.xml|drawings/drawing\d+\.xml|charts/chart\d+\.xml)$";
const SHEETS: &str = r"^xl/worksheets/sheet(\d+)\.xml$";
const DRAWINGS: &str = r"^xl/drawings/drawing(\d+)\.xml$";
const CHARTS: &str = r"^xl/charts/chart(\d+)\.xml$";

const WORKBOOK: &str = "xl/workbook.xml";
const SHARED_STRINGS: &str = "xl/sharedStrings.xml";

/// Handler for `.xlsx` workbooks.
///
/// Cells come out sheet by sheet in row-major order, one table-cell segment
/// each. Drawing and chart text follows the sheets.
#[derive(Debug, Default)]
pub struct SpreadsheetHandler;

impl FormatHandler for SpreadsheetHandler {
    fn name(&self) -> &'static str {
        "spreadsheet"
    }

    fn formats(&self) -> &[Format] {
        &[Format::Xlsx]
    }

    fn parse(&self, data: &[u8], config: &ParseConfig) -> Result<ParsedDocument> {
        let workspace = Workspace::unpack(data, FORMAT, &part_pattern(PARTS)?, config)?;

        let sheets = sheet_order(&workspace)?;
        if sheets.is_empty() {
            return Err(Error::corrupted(FORMAT, "workbook contains no worksheets"));
        }

        let shared = match workspace.read_optional(SHARED_STRINGS)? {
            Some(xml) => shared_strings(&xml)?,
            None => Vec::new(),
        };

        let mut doc = ParsedDocument::new(FORMAT);
        for sheet in &sheets {
            doc.extend(walk_sheet(&workspace.read(sheet)?, sheet, &shared)?);
        }
        for (_, part) in workspace.numbered_parts(&part_pattern(DRAWINGS)?) {
            let xml = workspace.read(&part)?;
            doc.extend(drawing::walk_part(&xml, FORMAT, &part, SegmentKind::Body)?);
        }
        for (_, part) in workspace.numbered_parts(&part_pattern(CHARTS)?) {
            doc.push(walk_chart(&workspace.read(&part)?, &part)?);
        }

        Ok(doc)
    }
}

/// Worksheet parts in workbook order, falling back to numeric order when
/// the workbook does not say.
fn sheet_order(workspace: &Workspace) -> Result<Vec<String>> {
    let numeric: Vec<String> = workspace
        .numbered_parts(&part_pattern(SHEETS)?)
        .into_iter()
        .map(|(_, part)| part)
        .collect();

    let rels = rels_part(WORKBOOK);
    let (Some(workbook), Some(rels_xml)) = (
        workspace.read_optional(WORKBOOK)?,
        workspace.read_optional(&rels)?,
    ) else {
        return Ok(numeric);
    };
    let relationships = Relationships::parse(&rels_xml, FORMAT, &rels)?;

    let ordered: Vec<String> = workbook_sheet_ids(&workbook)?
        .iter()
        .filter_map(|id| relationships.get(id))
        .map(|rel| resolve_target(WORKBOOK, &rel.target))
        .filter(|part| workspace.contains(part))
        .collect();

    if ordered.is_empty() {
        Ok(numeric)
    } else {
        Ok(ordered)
    }
}

/// Relationship ids of the `<sheet>` entries of `xl/workbook.xml`.
fn workbook_sheet_ids(data: &[u8]) -> Result<Vec<String>> {
    let mut reader = xml::reader(data);
    let mut buf = Vec::new();
    let mut ids = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e)) => {
                if e.local_name().as_ref() == b"sheet" {
                    if let Some(id) = xml::local_attr(e, b"id") {
                        ids.push(id);
                    }
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml::malformed(FORMAT, WORKBOOK, e)),
            _ => {}
        }
        buf.clear();
    }

    Ok(ids)
}

/// Parse the shared string table. Each `<si>` concatenates its runs;
/// phonetic hints (`rPh`) are not part of the text.
pub fn shared_strings(data: &[u8]) -> Result<Vec<String>> {
    let mut reader = xml::reader(data);
    let mut buf = Vec::new();
    let mut strings = Vec::new();

    let mut current: Option<String> = None;
    let mut phonetic = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml::malformed(FORMAT, SHARED_STRINGS, e))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => current = Some(String::new()),
                b"rPh" => phonetic += 1,
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(ref e) if e.local_name().as_ref() == b"si" => strings.push(String::new()),
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => strings.extend(current.take()),
                b"rPh" => phonetic = phonetic.saturating_sub(1),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(ref e) if in_text && phonetic == 0 => {
                if let Some(current) = current.as_mut() {
                    current.push_str(&xml::text(FORMAT, SHARED_STRINGS, e)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}

#[derive(Debug, Default)]
struct Cell {
    cell_type: Option<String>,
    value: String,
    inline: String,
}

impl Cell {
    fn resolve(self, shared: &[String], part: &str) -> Result<String> {
        match self.cell_type.as_deref() {
            Some("s") => {
                let index = self.value.trim();
                if index.is_empty() {
                    return Ok(String::new());
                }
                index
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| shared.get(i))
                    .cloned()
                    .ok_or_else(|| {
                        Error::corrupted(
                            FORMAT,
                            format!("{} references shared string {:?} which does not exist", part, index),
                        )
                    })
            }
            Some("inlineStr") => Ok(self.inline),
            Some("b") => Ok(match self.value.trim() {
                "1" => "TRUE".to_string(),
                "0" => "FALSE".to_string(),
                other => other.to_string(),
            }),
            _ => Ok(self.value),
        }
    }
}

/// Walk a worksheet, one table-cell segment per non-empty cell.
pub fn walk_sheet(data: &[u8], part: &str, shared: &[String]) -> Result<Vec<TextSegment>> {
    let mut reader = xml::reader(data);
    let mut buf = Vec::new();
    let mut segments = Vec::new();

    let mut cell: Option<Cell> = None;
    let mut in_value = false;
    let mut in_inline = false;
    let mut in_text = false;
    let mut phonetic = 0usize;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml::malformed(FORMAT, part, e))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"c" => {
                    cell = Some(Cell {
                        cell_type: xml::attr(e, b"t"),
                        ..Cell::default()
                    })
                }
                b"v" => in_value = true,
                b"is" => in_inline = true,
                b"t" => in_text = true,
                b"rPh" => phonetic += 1,
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"c" => {
                    if let Some(done) = cell.take() {
                        let text = done.resolve(shared, part)?;
                        if !text.is_empty() {
                            segments.push(TextSegment::cell(text));
                        }
                    }
                }
                b"v" => in_value = false,
                b"is" => in_inline = false,
                b"t" => in_text = false,
                b"rPh" => phonetic = phonetic.saturating_sub(1),
                _ => {}
            },
            Event::Text(ref e) => {
                if let Some(cell) = cell.as_mut() {
                    if in_value {
                        cell.value.push_str(&xml::text(FORMAT, part, e)?);
                    } else if in_inline && in_text && phonetic == 0 {
                        cell.inline.push_str(&xml::text(FORMAT, part, e)?);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(segments)
}

/// Collect the `c:v` values of a chart part into one segment.
///
/// Points of numeric caches whose value is missing or not a number come out
/// as `NaN` so the series keeps its length.
pub fn walk_chart(data: &[u8], part: &str) -> Result<TextSegment> {
    let mut reader = xml::reader(data);
    let mut buf = Vec::new();
    let mut values = Vec::new();

    let mut numeric = 0usize;
    let mut point: Option<String> = None;
    let mut in_value = false;
    let mut value = String::new();

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml::malformed(FORMAT, part, e))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"numCache" | b"numLit" => numeric += 1,
                b"pt" if numeric > 0 => point = Some(String::new()),
                b"v" => {
                    in_value = true;
                    value.clear();
                }
                _ => {}
            },
            Event::Empty(ref e) if numeric > 0 && e.local_name().as_ref() == b"pt" => {
                values.push(number_or_nan(""));
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"numCache" | b"numLit" => numeric = numeric.saturating_sub(1),
                b"v" => {
                    in_value = false;
                    match point.as_mut() {
                        Some(point) => point.push_str(&value),
                        None => values.push(std::mem::take(&mut value)),
                    }
                }
                b"pt" => {
                    if let Some(point) = point.take() {
                        values.push(number_or_nan(&point));
                    }
                }
                _ => {}
            },
            Event::Text(ref e) if in_value => value.push_str(&xml::text(FORMAT, part, e)?),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(TextSegment::from_lines(SegmentKind::Body, values))
}

fn number_or_nan(raw: &str) -> String {
    let raw = raw.trim();
    if raw.parse::<f64>().is_ok() {
        raw.to_string()
    } else {
        "NaN".to_string()
    }
}

//! DrawingML text walker, shared by slides, notes slides and spreadsheet
//! drawings.

use quick_xml::events::{BytesStart, Event};

use crate::detect::Format;
use crate::error::Result;
use crate::model::{SegmentKind, TextSegment};
use crate::parser::text_builder::SegmentBuilder;
use crate::parser::xml;

/// Walk the `a:p` paragraphs of a DrawingML part.
///
/// Paragraphs take the kind `base` unless their shape is a header or footer
/// placeholder (on body parts) or they sit in a table cell. Slide number
/// placeholders are skipped.
pub fn walk_part(
    data: &[u8],
    format: Format,
    part: &str,
    base: SegmentKind,
) -> Result<Vec<TextSegment>> {
    let mut reader = xml::reader(data);
    let mut buf = Vec::new();
    let mut builder = SegmentBuilder::new();

    let mut fallback = 0usize;
    // One entry per open shape; `None` marks a shape whose text is dropped.
    let mut shapes: Vec<Option<SegmentKind>> = Vec::new();
    // One entry per open paragraph; `false` when the paragraph is dropped.
    let mut paragraphs: Vec<bool> = Vec::new();
    let mut cells = 0usize;
    let mut in_text = false;

    loop {
        let event = reader
            .read_event_into(&mut buf)
            .map_err(|e| xml::malformed(format, part, e))?;

        match event {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"Fallback" => fallback += 1,
                _ if fallback > 0 => {}
                b"sp" => shapes.push(Some(base)),
                b"ph" => placeholder(e, base, &mut shapes),
                b"tc" => cells += 1,
                b"p" => {
                    let kept = match shapes.last() {
                        Some(None) => false,
                        Some(Some(kind)) if cells == 0 => {
                            builder.open_paragraph(*kind);
                            true
                        }
                        _ => {
                            let kind = if cells > 0 {
                                SegmentKind::TableCell
                            } else {
                                base
                            };
                            builder.open_paragraph(kind);
                            true
                        }
                    };
                    paragraphs.push(kept);
                }
                b"t" => in_text = true,
                b"br" if paragraphs.last() == Some(&true) => builder.line_break(),
                _ => {}
            },
            Event::Empty(ref e) if fallback == 0 => match e.local_name().as_ref() {
                b"ph" => placeholder(e, base, &mut shapes),
                b"br" if paragraphs.last() == Some(&true) => builder.line_break(),
                _ => {}
            },
            Event::End(ref e) => match e.local_name().as_ref() {
                b"Fallback" => fallback = fallback.saturating_sub(1),
                _ if fallback > 0 => {}
                b"sp" => {
                    shapes.pop();
                }
                b"tc" => cells = cells.saturating_sub(1),
                b"p" => {
                    if paragraphs.pop() == Some(true) {
                        builder.close_paragraph();
                    }
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(ref e) if in_text && fallback == 0 => {
                if paragraphs.last() == Some(&true) {
                    builder.push_text(&xml::text(format, part, e)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(builder.finish())
}

/// Apply a `p:ph` placeholder declaration to the innermost shape.
fn placeholder(e: &BytesStart<'_>, base: SegmentKind, shapes: &mut [Option<SegmentKind>]) {
    let Some(shape) = shapes.last_mut() else {
        return;
    };
    match xml::attr(e, b"type").as_deref() {
        Some("sldNum") => *shape = None,
        Some("ftr") if base == SegmentKind::Body => *shape = Some(SegmentKind::Footer),
        Some("hdr") if base == SegmentKind::Body => *shape = Some(SegmentKind::Header),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slide(shapes: &str) -> String {
        format!(
            r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            shapes
        )
    }

    fn shape(ph: &str, paragraphs: &str) -> String {
        format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="s"/><p:cNvSpPr/><p:nvPr>{}</p:nvPr></p:nvSpPr><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>"#,
            ph, paragraphs
        )
    }

    fn walk(xml: &str, base: SegmentKind) -> Vec<TextSegment> {
        walk_part(xml.as_bytes(), Format::Pptx, "ppt/slides/slide1.xml", base).unwrap()
    }

    #[test]
    fn test_text_frames_in_order() {
        let xml = slide(&format!(
            "{}{}",
            shape(
                r#"<p:ph type="title"/>"#,
                "<a:p><a:r><a:t>Title</a:t></a:r></a:p>"
            ),
            shape(
                "",
                "<a:p><a:r><a:t>First</a:t></a:r><a:br/><a:r><a:t>line</a:t></a:r></a:p><a:p/><a:p><a:fld type=\"datetime\"><a:t>Today</a:t></a:fld></a:p>"
            ),
        ));
        let segments = walk(&xml, SegmentKind::Body);
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[0].lines, vec!["Title"]);
        assert_eq!(segments[1].lines, vec!["First", "line"]);
        assert_eq!(segments[2].lines, vec!["Today"]);
    }

    #[test]
    fn test_placeholders() {
        let xml = slide(&format!(
            "{}{}{}",
            shape(
                r#"<p:ph type="sldNum" idx="12"/>"#,
                "<a:p><a:fld type=\"slidenum\"><a:t>7</a:t></a:fld></a:p>"
            ),
            shape(
                r#"<p:ph type="ftr" idx="11"/>"#,
                "<a:p><a:r><a:t>Confidential</a:t></a:r></a:p>"
            ),
            shape(
                r#"<p:ph type="hdr"/>"#,
                "<a:p><a:r><a:t>Top</a:t></a:r></a:p>"
            ),
        ));
        let segments = walk(&xml, SegmentKind::Body);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].kind, SegmentKind::Footer);
        assert_eq!(segments[1].kind, SegmentKind::Header);

        // Inside notes everything but the slide number stays a note.
        let segments = walk(&xml, SegmentKind::Note);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.is_note()));
    }

    #[test]
    fn test_table_cells() {
        let xml = slide(
            r#"<p:graphicFrame><a:graphic><a:graphicData><a:tbl>
                <a:tr><a:tc><a:txBody><a:p><a:r><a:t>h1</a:t></a:r></a:p></a:txBody></a:tc><a:tc><a:txBody><a:p><a:r><a:t>h2</a:t></a:r></a:p></a:txBody></a:tc></a:tr>
               </a:tbl></a:graphicData></a:graphic></p:graphicFrame>"#,
        );
        let segments = walk(&xml, SegmentKind::Body);
        assert_eq!(segments.len(), 2);
        assert!(segments.iter().all(|s| s.kind == SegmentKind::TableCell));
    }

    #[test]
    fn test_spreadsheet_drawing() {
        let xml = r#"<xdr:wsDr xmlns:xdr="urn:xdr" xmlns:a="urn:a"><xdr:twoCellAnchor><xdr:sp><xdr:txBody><a:p><a:r><a:t>Callout</a:t></a:r></a:p></xdr:txBody></xdr:sp></xdr:twoCellAnchor></xdr:wsDr>"#;
        let segments =
            walk_part(xml.as_bytes(), Format::Xlsx, "xl/drawings/drawing1.xml", SegmentKind::Body)
                .unwrap();
        assert_eq!(segments, vec![TextSegment::body("Callout")]);
    }
}

//! PresentationML (pptx) walker.

use crate::detect::Format;
use crate::error::{Error, Result};
use crate::model::{ParsedDocument, SegmentKind};
use crate::parser::options::ParseConfig;
use crate::parser::workspace::{part_pattern, Workspace};
use crate::parser::FormatHandler;

use super::{drawing, rels_part, resolve_target, Relationships};

const FORMAT: Format = Format::Pptx;

const SLIDES: &str = r"^ppt/slides/slide(\d+)\.xml$";
const SLIDES_AND_NOTES: &str =
    r"^ppt/(slides/slide\d+\.xml|slides/_rels/slide\d+\.xml\.rels|notesSlides/notesSlide\d+\.xml)$";

/// Handler for `.pptx` documents.
///
/// Each slide is followed by its speaker notes. Moving notes to the end or
/// dropping them is left to the assembler; with `ignore_notes` the notes
/// parts are not even unpacked.
#[derive(Debug, Default)]
pub struct PresentationHandler;

impl FormatHandler for PresentationHandler {
    fn name(&self) -> &'static str {
        "presentation"
    }

    fn formats(&self) -> &[Format] {
        &[Format::Pptx]
    }

    fn parse(&self, data: &[u8], config: &ParseConfig) -> Result<ParsedDocument> {
        let wanted = if config.ignore_notes {
            SLIDES
        } else {
            SLIDES_AND_NOTES
        };
        let workspace = Workspace::unpack(data, FORMAT, &part_pattern(wanted)?, config)?;

        let slides = workspace.numbered_parts(&part_pattern(SLIDES)?);
        if slides.is_empty() {
            return Err(Error::corrupted(FORMAT, "presentation contains no slides"));
        }
        log::debug!("Walking {} slide(s)", slides.len());

        let mut doc = ParsedDocument::new(FORMAT);
        for (number, slide) in slides {
            let xml = workspace.read(&slide)?;
            doc.extend(drawing::walk_part(&xml, FORMAT, &slide, SegmentKind::Body)?);

            if config.ignore_notes {
                continue;
            }
            if let Some(notes) = notes_part(&workspace, &slide, number)? {
                let xml = workspace.read(&notes)?;
                doc.extend(drawing::walk_part(&xml, FORMAT, &notes, SegmentKind::Note)?);
            }
        }

        Ok(doc)
    }
}

/// Find the notes slide of `slide`. When the slide has relationships they
/// alone decide; notes slides are numbered in creation order, so only a
/// slide without a rels part falls back to the notes slide of its number.
fn notes_part(workspace: &Workspace, slide: &str, number: u32) -> Result<Option<String>> {
    let rels = rels_part(slide);
    if let Some(data) = workspace.read_optional(&rels)? {
        let relationships = Relationships::parse(&data, FORMAT, &rels)?;
        let Some(rel) = relationships.first_of_kind("notesSlide") else {
            return Ok(None);
        };
        let target = resolve_target(slide, &rel.target);
        if !workspace.contains(&target) {
            log::warn!("{} points to missing notes part {}", rels, target);
            return Ok(None);
        }
        return Ok(Some(target));
    }

    let by_number = format!("ppt/notesSlides/notesSlide{}.xml", number);
    Ok(workspace.contains(&by_number).then_some(by_number))
}

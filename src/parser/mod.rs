//! Per-format document parsing.
//!
//! Each supported format has a [`FormatHandler`] that turns the raw bytes of
//! a document into ordered text segments. Zip-based formats are unpacked
//! into a [`Workspace`] first; PDFs are read in memory.

pub mod backend;
pub mod odf;
pub mod ooxml;
mod options;
pub mod pdf_parser;
pub mod text_builder;
pub mod workspace;
pub mod xml;

pub use backend::{LopdfBackend, PdfBackend};
pub use odf::OdfHandler;
pub use ooxml::presentation::PresentationHandler;
pub use ooxml::spreadsheet::SpreadsheetHandler;
pub use ooxml::word::WordHandler;
pub use options::{ParseConfig, DEFAULT_TEMP_FILES_LOCATION};
pub use pdf_parser::{PdfHandler, PdfParser};
pub use workspace::Workspace;

use crate::detect::Format;
use crate::error::Result;
use crate::model::ParsedDocument;

/// Extracts ordered text segments from one family of documents.
pub trait FormatHandler: Send + Sync {
    /// Short handler name, used in logs.
    fn name(&self) -> &'static str;

    /// Formats this handler reads.
    fn formats(&self) -> &[Format];

    /// Parse a document held in memory.
    fn parse(&self, data: &[u8], config: &ParseConfig) -> Result<ParsedDocument>;
}

static WORD: WordHandler = WordHandler;
static PRESENTATION: PresentationHandler = PresentationHandler;
static SPREADSHEET: SpreadsheetHandler = SpreadsheetHandler;
static ODT: OdfHandler = OdfHandler::new(Format::Odt);
static ODP: OdfHandler = OdfHandler::new(Format::Odp);
static ODS: OdfHandler = OdfHandler::new(Format::Ods);
static PDF: PdfHandler = PdfHandler;

/// Handler for a format.
pub fn handler_for(format: Format) -> &'static dyn FormatHandler {
    match format {
        Format::Docx => &WORD,
        Format::Pptx => &PRESENTATION,
        Format::Xlsx => &SPREADSHEET,
        Format::Odt => &ODT,
        Format::Odp => &ODP,
        Format::Ods => &ODS,
        Format::Pdf => &PDF,
    }
}

//! PDF text extraction from page content streams.

use unicode_normalization::UnicodeNormalization;

use crate::detect::Format;
use crate::error::Result;
use crate::model::{ParsedDocument, TextSegment};

use super::backend::{LopdfBackend, PageId, PdfBackend, PdfValue};
use super::options::ParseConfig;
use super::FormatHandler;

/// `TJ` adjustments beyond this many thousandths of a text unit are word gaps.
const WORD_GAP: f32 = 200.0;

/// PDF document parser.
///
/// Each text run becomes one body segment. Consecutive pages with text are
/// separated by an empty line.
pub struct PdfParser<B: PdfBackend = LopdfBackend> {
    backend: B,
}

impl PdfParser<LopdfBackend> {
    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self::with_backend(LopdfBackend::load_bytes(data)?))
    }
}

impl<B: PdfBackend> PdfParser<B> {
    /// Wrap an already loaded backend.
    pub fn with_backend(backend: B) -> Self {
        Self { backend }
    }

    /// Get the number of pages.
    pub fn page_count(&self) -> usize {
        self.backend.pages().len()
    }

    /// Extract the text runs of every page in page order.
    pub fn parse(&self) -> Result<ParsedDocument> {
        let mut doc = ParsedDocument::new(Format::Pdf);
        let mut previous_page_had_text = false;

        for (number, page) in self.backend.pages() {
            let runs = self.page_runs(page)?;
            log::debug!("Page {}: {} text run(s)", number, runs.len());
            if runs.is_empty() {
                continue;
            }

            if previous_page_had_text {
                doc.push_raw(TextSegment::blank_line());
            }
            doc.extend(runs.into_iter().map(TextSegment::body));
            previous_page_had_text = true;
        }

        Ok(doc)
    }

    /// Extract the text runs of one page.
    fn page_runs(&self, page: PageId) -> Result<Vec<String>> {
        let content = self.backend.page_content(page)?;
        if content.is_empty() {
            return Ok(Vec::new());
        }
        let ops = self.backend.decode_content(&content)?;

        let mut runs = RunCollector::default();
        let mut font: Vec<u8> = Vec::new();
        let mut line_y: Option<f32> = None;

        for op in &ops {
            match op.operator.as_str() {
                "BT" => line_y = None,
                "ET" => runs.end_run(),
                "Tf" => {
                    if let Some(PdfValue::Name(name)) = op.operands.first() {
                        font = name.clone();
                    }
                }
                "Td" | "TD" => {
                    let ty = op.number(1).unwrap_or(0.0);
                    if ty != 0.0 {
                        runs.end_run();
                        line_y = line_y.map(|y| y + ty);
                    }
                }
                "Tm" => {
                    if let Some(y) = op.number(5) {
                        if line_y.is_some_and(|prev| prev != y) {
                            runs.end_run();
                        }
                        line_y = Some(y);
                    }
                }
                "T*" => runs.end_run(),
                "Tj" => self.show(page, &font, op.operands.first(), &mut runs),
                "'" => {
                    runs.end_run();
                    self.show(page, &font, op.operands.first(), &mut runs);
                }
                "\"" => {
                    runs.end_run();
                    self.show(page, &font, op.operands.get(2), &mut runs);
                }
                "TJ" => {
                    if let Some(PdfValue::Array(items)) = op.operands.first() {
                        for item in items {
                            match item.as_number() {
                                Some(adjustment) if -adjustment > WORD_GAP => runs.word_gap(),
                                Some(_) => {}
                                None => self.show(page, &font, Some(item), &mut runs),
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        runs.end_run();

        Ok(runs.finish())
    }

    fn show(&self, page: PageId, font: &[u8], operand: Option<&PdfValue>, runs: &mut RunCollector) {
        if let Some(PdfValue::Str(bytes)) = operand {
            runs.push(&self.backend.decode_text(page, font, bytes));
        }
    }
}

/// Accumulates shown text into runs.
#[derive(Debug, Default)]
struct RunCollector {
    runs: Vec<String>,
    current: String,
}

impl RunCollector {
    fn push(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn word_gap(&mut self) {
        match self.current.chars().last() {
            Some(c) if !c.is_whitespace() && !is_spaceless_script_char(c) => {
                self.current.push(' ')
            }
            _ => {}
        }
    }

    fn end_run(&mut self) {
        let run: String = std::mem::take(&mut self.current).nfc().collect();
        // Runs never carry line breaks; those are the assembler's job.
        let run = run.replace(['\r', '\n'], " ");
        if !run.trim().is_empty() {
            self.runs.push(run);
        }
    }

    fn finish(self) -> Vec<String> {
        self.runs
    }
}

/// Scripts written without word spaces (CJK ideographs and kana).
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and Extension A
    (0x4E00..=0x9FFF).contains(&code)
    || (0x3400..=0x4DBF).contains(&code)
    // Extensions B-F
    || (0x20000..=0x2EBEF).contains(&code)
    // Hiragana and Katakana
    || (0x3040..=0x30FF).contains(&code)
    // CJK Symbols and Punctuation
    || (0x3000..=0x303F).contains(&code)
}

/// Handler for PDF documents. Notes settings do not apply.
#[derive(Debug, Default)]
pub struct PdfHandler;

impl FormatHandler for PdfHandler {
    fn name(&self) -> &'static str {
        "pdf"
    }

    fn formats(&self) -> &[Format] {
        &[Format::Pdf]
    }

    fn parse(&self, data: &[u8], _config: &ParseConfig) -> Result<ParsedDocument> {
        PdfParser::from_bytes(data)?.parse()
    }
}

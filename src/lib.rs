//! # unoffice
//!
//! Plain text extraction from office documents for Rust.
//!
//! This library reads Office Open XML (docx, pptx, xlsx), OpenDocument
//! (odt, odp, ods) and PDF files and returns their visible text in
//! document order.
//!
//! ## Quick Start
//!
//! ```no_run
//! use unoffice::{parse_office, parse_office_with_config, ParseConfig};
//!
//! fn main() -> unoffice::Result<()> {
//!     // Default configuration
//!     let text = parse_office("slides.pptx")?;
//!     println!("{}", text);
//!
//!     // Speaker notes moved behind the slides, lines joined with spaces
//!     let config = ParseConfig::new()
//!         .with_notes_at_last(true)
//!         .with_newline_delimiter(" ");
//!     let text = parse_office_with_config("slides.pptx", &config)?;
//!     println!("{}", text);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Seven formats**: docx, pptx, xlsx, odt, odp, ods, pdf
//! - **Path or buffer input**: formats are detected from the extension or
//!   from the content signature
//! - **Notes policy**: keep, drop or move presentation speaker notes
//! - **Scoped workspaces**: archives are unpacked into a unique temporary
//!   directory that is removed after use unless preservation is requested
//! - **Parallel batches**: independent documents parsed on the rayon pool

pub mod detect;
pub mod dispatch;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

#[cfg(feature = "ffi")]
pub mod ffi;

#[cfg(test)]
mod test_utils;

// Re-export commonly used types
pub use detect::{detect_format_from_bytes, detect_format_from_path, is_supported, Format, Input};
pub use error::{Error, ErrorKind, Result};
pub use model::{ParsedDocument, SegmentKind, TextSegment};
pub use parser::{ParseConfig, DEFAULT_TEMP_FILES_LOCATION};
pub use render::JsonFormat;

use std::path::Path;

use rayon::prelude::*;

/// Extract the text of a document with the default configuration.
///
/// # Arguments
///
/// * `input` - A file path or the raw bytes of a document
///
/// # Example
///
/// ```no_run
/// use unoffice::parse_office;
///
/// let text = parse_office("report.docx").unwrap();
/// println!("{}", text);
/// ```
pub fn parse_office(input: impl Into<Input>) -> Result<String> {
    parse_office_with_config(input, &ParseConfig::default())
}

/// Extract the text of a document with a custom configuration.
///
/// # Example
///
/// ```no_run
/// use unoffice::{parse_office_with_config, ParseConfig};
///
/// let data = std::fs::read("budget.ods").unwrap();
/// let config = ParseConfig::new().with_newline_delimiter(" | ");
/// let text = parse_office_with_config(data, &config).unwrap();
/// ```
pub fn parse_office_with_config(input: impl Into<Input>, config: &ParseConfig) -> Result<String> {
    let doc = dispatch::dispatch(input.into(), config)?;
    Ok(render::to_text(&doc, config))
}

/// Parse a document into its ordered text segments.
///
/// The notes policy of `config` is already applied to the returned
/// segments.
pub fn parse_document(input: impl Into<Input>, config: &ParseConfig) -> Result<ParsedDocument> {
    let mut doc = dispatch::dispatch(input.into(), config)?;
    let segments = render::apply_note_policy(&doc.segments, config).into_owned();
    doc.segments = segments;
    Ok(doc)
}

/// Parse a document file into segments with the default configuration.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ParsedDocument> {
    parse_document(path.as_ref(), &ParseConfig::default())
}

/// Parse a document held in memory into segments with the default
/// configuration. The format is detected from the content.
pub fn parse_bytes(data: &[u8]) -> Result<ParsedDocument> {
    parse_document(data, &ParseConfig::default())
}

/// Extract the text of several documents in parallel.
///
/// Every input is an independent invocation with its own workspace. Results
/// are returned in input order; one failure does not affect the others.
///
/// # Example
///
/// ```no_run
/// use unoffice::{parse_batch, Input, ParseConfig};
///
/// let inputs: Vec<Input> = vec!["a.docx".into(), "b.pdf".into()];
/// for result in parse_batch(inputs, &ParseConfig::default()) {
///     match result {
///         Ok(text) => println!("{}", text),
///         Err(e) => eprintln!("{}", e),
///     }
/// }
/// ```
pub fn parse_batch(inputs: Vec<Input>, config: &ParseConfig) -> Vec<Result<String>> {
    log::debug!("Parsing a batch of {} document(s)", inputs.len());
    inputs
        .into_par_iter()
        .map(|input| parse_office_with_config(input, config))
        .collect()
}

/// Extract the text of a document on tokio's blocking pool.
#[cfg(feature = "async")]
pub async fn parse_office_async(input: impl Into<Input>, config: ParseConfig) -> Result<String> {
    let input = input.into();
    tokio::task::spawn_blocking(move || parse_office_with_config(input, &config))
        .await
        .map_err(|e| Error::ImproperArguments(format!("parse task failed: {}", e)))?
}

/// File extensions this library can read, without the leading dot.
pub fn supported_extensions() -> Vec<&'static str> {
    Format::ALL.iter().map(|f| f.extension()).collect()
}

//! Input resolution and handler selection.

use std::fs;
use std::path::Path;

use crate::detect::{detect_format_from_bytes, detect_format_from_path, Format, Input};
use crate::error::{Error, Result, ERROR_HEADER};
use crate::model::ParsedDocument;
use crate::parser::{handler_for, ParseConfig};

/// Resolve the input, pick the handler for its format and run it.
///
/// Failures are logged and, when `output_error_to_console` is set, echoed
/// to stderr. They are always returned.
pub fn dispatch(input: Input, config: &ParseConfig) -> Result<ParsedDocument> {
    let result = run(input, config);
    if let Err(ref e) = result {
        report(e, config);
    }
    result
}

fn run(input: Input, config: &ParseConfig) -> Result<ParsedDocument> {
    config.validate()?;

    let (format, data) = match input {
        Input::Path(path) => {
            let format = resolve_path(&path)?;
            let data = fs::read(&path).map_err(|_| Error::FileDoesNotExist { path })?;
            (format, data)
        }
        Input::Buffer(data) => (detect_format_from_bytes(&data)?, data),
    };

    let handler = handler_for(format);
    log::debug!(
        "Parsing {} bytes as {} with the {} handler ({})",
        data.len(),
        format,
        handler.name(),
        if format.is_archive() {
            "unpacked into a workspace"
        } else {
            "read in memory"
        }
    );
    handler.parse(&data, config)
}

/// Validate a path and detect its format from the extension.
fn resolve_path(path: &Path) -> Result<Format> {
    if path.as_os_str().is_empty() {
        return Err(Error::ImproperArguments("file path is empty".to_string()));
    }
    if !path.is_file() {
        return Err(Error::FileDoesNotExist {
            path: path.to_path_buf(),
        });
    }
    detect_format_from_path(path)
}

fn report(err: &Error, config: &ParseConfig) {
    log::error!("{}", err);
    if config.output_error_to_console {
        eprintln!("{}{}", ERROR_HEADER, err);
    }
}

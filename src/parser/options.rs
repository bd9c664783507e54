//! Parsing configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default directory for extraction scratch space.
pub const DEFAULT_TEMP_FILES_LOCATION: &str = "officeparser_temp";

/// Options for extracting text from a document.
///
/// Built once per call and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ParseConfig {
    /// Directory under which archive workspaces are created
    pub temp_files_location: PathBuf,

    /// Keep the unpacked workspace after extraction
    pub preserve_temp_files: bool,

    /// Echo error diagnostics to stderr in addition to returning them
    pub output_error_to_console: bool,

    /// Separator inserted between logical lines
    pub newline_delimiter: String,

    /// Drop presentation notes
    pub ignore_notes: bool,

    /// Collect presentation notes at the end instead of after each slide
    pub put_notes_at_last: bool,
}

impl ParseConfig {
    /// Create a configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from a JSON object of options.
    ///
    /// Unspecified options keep their defaults; unknown keys are rejected.
    ///
    /// ```
    /// use unoffice::ParseConfig;
    ///
    /// let config = ParseConfig::from_json(r#"{"ignore_notes": true}"#).unwrap();
    /// assert!(config.ignore_notes);
    /// assert_eq!(config.newline_delimiter, "\n");
    /// ```
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::ImproperArguments(format!("invalid configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Set the temp files location.
    pub fn with_temp_files_location(mut self, location: impl Into<PathBuf>) -> Self {
        self.temp_files_location = location.into();
        self
    }

    /// Keep or remove the workspace after extraction.
    pub fn with_preserve_temp_files(mut self, preserve: bool) -> Self {
        self.preserve_temp_files = preserve;
        self
    }

    /// Enable or disable console diagnostics.
    pub fn with_output_error_to_console(mut self, output: bool) -> Self {
        self.output_error_to_console = output;
        self
    }

    /// Set the line delimiter.
    pub fn with_newline_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.newline_delimiter = delimiter.into();
        self
    }

    /// Drop or keep presentation notes.
    pub fn with_ignore_notes(mut self, ignore: bool) -> Self {
        self.ignore_notes = ignore;
        self
    }

    /// Move presentation notes to the end of the output.
    pub fn with_notes_at_last(mut self, at_last: bool) -> Self {
        self.put_notes_at_last = at_last;
        self
    }

    /// Whether the default scratch directory is in use.
    pub fn uses_default_location(&self) -> bool {
        self.temp_files_location.as_os_str() == DEFAULT_TEMP_FILES_LOCATION
    }

    /// Check that option values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.temp_files_location.as_os_str().is_empty() {
            return Err(Error::ImproperArguments(
                "temp_files_location must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ParseConfig {
    fn default() -> Self {
        Self {
            temp_files_location: PathBuf::from(DEFAULT_TEMP_FILES_LOCATION),
            preserve_temp_files: false,
            output_error_to_console: false,
            newline_delimiter: "\n".to_string(),
            ignore_notes: false,
            put_notes_at_last: false,
        }
    }
}

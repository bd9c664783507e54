//! Error types for unoffice library.

use std::path::PathBuf;
use thiserror::Error;

use crate::detect::Format;

/// Result type alias for unoffice operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Prefix used when diagnostics are echoed to the console.
pub const ERROR_HEADER: &str = "[unoffice]: ";

/// Error types that can occur while extracting text.
#[derive(Error, Debug)]
pub enum Error {
    /// The supplied path does not resolve to a readable file.
    #[error("File {} could not be found! Check if the file exists or verify the relative path from your working directory", path.display())]
    FileDoesNotExist { path: PathBuf },

    /// The resolved format is not one of the supported types.
    #[error("Sorry, unoffice currently supports docx, pptx, xlsx, odt, odp, ods, pdf files only ({extension:?} is not supported)")]
    ExtensionUnsupported { extension: String },

    /// The container or one of its required parts cannot be read.
    #[error("Your {format} file seems to be corrupted: {message}")]
    FileCorrupted { format: Format, message: String },

    /// The temp files location does not exist or cannot be written.
    #[error("Entered location {} is not reachable: {message}", location.display())]
    LocationNotFound { location: PathBuf, message: String },

    /// Invalid arguments or configuration values.
    #[error("Improper arguments: {0}")]
    ImproperArguments(String),

    /// The buffer is not any supported container.
    #[error("Error occurred while reading the file buffers: {0}")]
    ImproperBuffers(String),
}

/// Fieldless view of [`Error`] for callers that only match on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    FileDoesNotExist,
    ExtensionUnsupported,
    FileCorrupted,
    LocationNotFound,
    ImproperArguments,
    ImproperBuffers,
}

impl Error {
    /// Build a [`Error::FileCorrupted`] for the given format.
    pub fn corrupted(format: Format, message: impl Into<String>) -> Self {
        Error::FileCorrupted {
            format,
            message: message.into(),
        }
    }

    /// Get the kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::FileDoesNotExist { .. } => ErrorKind::FileDoesNotExist,
            Error::ExtensionUnsupported { .. } => ErrorKind::ExtensionUnsupported,
            Error::FileCorrupted { .. } => ErrorKind::FileCorrupted,
            Error::LocationNotFound { .. } => ErrorKind::LocationNotFound,
            Error::ImproperArguments(_) => ErrorKind::ImproperArguments,
            Error::ImproperBuffers(_) => ErrorKind::ImproperBuffers,
        }
    }

    /// Format the error originated from, when known.
    pub fn format(&self) -> Option<Format> {
        match self {
            Error::FileCorrupted { format, .. } => Some(*format),
            _ => None,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::Decryption(_) => {
                Error::corrupted(Format::Pdf, "document is encrypted")
            }
            _ => Error::corrupted(Format::Pdf, err.to_string()),
        }
    }
}

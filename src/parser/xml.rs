//! Shared quick-xml helpers for the document walkers.

use std::fmt::Display;

use quick_xml::events::{BytesStart, BytesText};
use quick_xml::Reader;

use crate::detect::Format;
use crate::error::Error;

/// Create a reader that keeps whitespace-only text.
///
/// Office documents carry significant spaces in their own text runs
/// (`<w:t xml:space="preserve"> </w:t>`), so nothing is trimmed.
pub fn reader(xml: &[u8]) -> Reader<&[u8]> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    reader
}

/// Error for a part that cannot be parsed as XML.
pub fn malformed(format: Format, part: &str, err: impl Display) -> Error {
    Error::corrupted(format, format!("malformed XML in {}: {}", part, err))
}

/// Unescaped text content of a text event.
pub fn text(format: Format, part: &str, e: &BytesText<'_>) -> Result<String, Error> {
    e.unescape()
        .map(|t| t.into_owned())
        .map_err(|err| malformed(format, part, err))
}

/// Value of the attribute whose qualified name is `key` (`w:type`, `text:c`).
pub fn attr(e: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == key)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

/// Value of the attribute whose local name is `local`, whatever its prefix.
pub fn local_attr(e: &BytesStart<'_>, local: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.local_name().as_ref() == local)
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}

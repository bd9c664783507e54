//! Format detection from file extensions and content signatures.

use std::fmt;
use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Supported document formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Docx,
    Pptx,
    Xlsx,
    Odt,
    Odp,
    Ods,
    Pdf,
}

/// Container family a format belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Office Open XML (zip + XML)
    Ooxml,
    /// OpenDocument (zip + XML)
    OpenDocument,
    /// Portable Document Format
    Pdf,
}

impl Format {
    /// Every supported format, in the order they are documented.
    pub const ALL: [Format; 7] = [
        Format::Docx,
        Format::Pptx,
        Format::Xlsx,
        Format::Odt,
        Format::Odp,
        Format::Ods,
        Format::Pdf,
    ];

    /// Lowercase file extension without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            Format::Docx => "docx",
            Format::Pptx => "pptx",
            Format::Xlsx => "xlsx",
            Format::Odt => "odt",
            Format::Odp => "odp",
            Format::Ods => "ods",
            Format::Pdf => "pdf",
        }
    }

    /// Map an extension (case-insensitive, with or without dot) to a format.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        Format::ALL.into_iter().find(|f| f.extension() == ext)
    }

    /// Container family of the format.
    pub fn family(self) -> Family {
        match self {
            Format::Docx | Format::Pptx | Format::Xlsx => Family::Ooxml,
            Format::Odt | Format::Odp | Format::Ods => Family::OpenDocument,
            Format::Pdf => Family::Pdf,
        }
    }

    /// Whether the format is a zip container that needs a workspace.
    pub fn is_archive(self) -> bool {
        self.family() != Family::Pdf
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// Input to the extraction engine: a file path or an in-memory buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    /// Path to a document; the format comes from its extension.
    Path(PathBuf),
    /// Raw document bytes; the format is sniffed from the content.
    Buffer(Vec<u8>),
}

impl From<&str> for Input {
    fn from(path: &str) -> Self {
        Input::Path(PathBuf::from(path))
    }
}

impl From<String> for Input {
    fn from(path: String) -> Self {
        Input::Path(PathBuf::from(path))
    }
}

impl From<&Path> for Input {
    fn from(path: &Path) -> Self {
        Input::Path(path.to_path_buf())
    }
}

impl From<PathBuf> for Input {
    fn from(path: PathBuf) -> Self {
        Input::Path(path)
    }
}

impl From<&PathBuf> for Input {
    fn from(path: &PathBuf) -> Self {
        Input::Path(path.clone())
    }
}

impl From<Vec<u8>> for Input {
    fn from(data: Vec<u8>) -> Self {
        Input::Buffer(data)
    }
}

impl From<&[u8]> for Input {
    fn from(data: &[u8]) -> Self {
        Input::Buffer(data.to_vec())
    }
}

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Readers accept the PDF header anywhere in the first kilobyte.
const PDF_HEADER_WINDOW: usize = 1024;
/// Zip local file header signature.
const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Detect the format of a path from its extension.
///
/// # Returns
/// * `Ok(Format)` for one of the supported extensions
/// * `Err(Error::ExtensionUnsupported)` otherwise
///
/// # Example
/// ```
/// use unoffice::detect::{detect_format_from_path, Format};
///
/// assert_eq!(detect_format_from_path("report.DOCX").unwrap(), Format::Docx);
/// ```
pub fn detect_format_from_path<P: AsRef<Path>>(path: P) -> Result<Format> {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    Format::from_extension(extension).ok_or_else(|| Error::ExtensionUnsupported {
        extension: extension.to_ascii_lowercase(),
    })
}

/// Detect the format of a buffer from its content signature.
///
/// PDFs are recognized by their `%PDF-` header, zip containers by the
/// parts they hold (`mimetype` for OpenDocument, `word/`, `ppt/`, `xl/`
/// for Office Open XML).
///
/// # Returns
/// * `Ok(Format)` if the buffer is a supported container
/// * `Err(Error::ImproperBuffers)` otherwise
pub fn detect_format_from_bytes(data: &[u8]) -> Result<Format> {
    if data.is_empty() {
        return Err(Error::ImproperBuffers("buffer is empty".to_string()));
    }

    if data.starts_with(ZIP_MAGIC) {
        return detect_zip_format(data);
    }

    let window = &data[..data.len().min(PDF_HEADER_WINDOW)];
    if window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC) {
        return Ok(Format::Pdf);
    }

    Err(Error::ImproperBuffers(
        "content is neither a zip container nor a PDF".to_string(),
    ))
}

/// Inspect the entries of a zip container to tell the office formats apart.
///
/// A container whose central directory cannot be read is classified from
/// its local file headers, so that a damaged document still reaches its
/// handler and is reported as corrupted.
fn detect_zip_format(data: &[u8]) -> Result<Format> {
    let (names, mimetype) = match ZipArchive::new(Cursor::new(data)) {
        Ok(mut archive) => {
            let mimetype = archive.by_name("mimetype").ok().and_then(|mut entry| {
                let mut value = String::new();
                entry.read_to_string(&mut value).ok().map(|_| value)
            });
            let names = archive.file_names().map(str::to_string).collect();
            (names, mimetype)
        }
        Err(e) => {
            log::debug!("Zip directory unreadable ({}), scanning local headers", e);
            scan_local_headers(data)
        }
    };

    classify_entries(&names, mimetype.as_deref()).ok_or_else(|| {
        Error::ImproperBuffers("zip container holds no supported document".to_string())
    })
}

fn classify_entries(names: &[String], mimetype: Option<&str>) -> Option<Format> {
    if let Some(value) = mimetype {
        let value = value.trim();
        if value.contains("opendocument.text") {
            return Some(Format::Odt);
        }
        if value.contains("opendocument.presentation") {
            return Some(Format::Odp);
        }
        if value.contains("opendocument.spreadsheet") {
            return Some(Format::Ods);
        }
    }

    let any = |prefix: &str| names.iter().any(|n| n.starts_with(prefix));
    if any("word/") {
        return Some(Format::Docx);
    }
    if any("ppt/") {
        return Some(Format::Pptx);
    }
    if any("xl/") {
        return Some(Format::Xlsx);
    }
    if names.iter().any(|n| n == "content.xml" || n == "mimetype") {
        return Some(Format::Odt);
    }
    None
}

/// Offsets inside a zip local file header.
const LOCAL_HEADER_LEN: usize = 30;
const LOCAL_FLAGS: usize = 6;
const LOCAL_METHOD: usize = 8;
const LOCAL_COMPRESSED_SIZE: usize = 18;
const LOCAL_NAME_LEN: usize = 26;
const LOCAL_EXTRA_LEN: usize = 28;
/// General purpose flag: sizes follow the data in a descriptor.
const FLAG_DATA_DESCRIPTOR: u16 = 0x0008;

/// Entry names (and a stored `mimetype` value) read by walking the local
/// file headers from the start of the buffer. Stops at the first header
/// that is cut off or whose size is unknown.
fn scan_local_headers(data: &[u8]) -> (Vec<String>, Option<String>) {
    let le16 = |at: usize| u16::from_le_bytes([data[at], data[at + 1]]);
    let le32 = |at: usize| {
        u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
    };

    let mut names = Vec::new();
    let mut mimetype = None;
    let mut offset = 0usize;

    while data.len().saturating_sub(offset) >= LOCAL_HEADER_LEN
        && data[offset..].starts_with(ZIP_MAGIC)
    {
        let name_len = le16(offset + LOCAL_NAME_LEN) as usize;
        let extra_len = le16(offset + LOCAL_EXTRA_LEN) as usize;
        let name_start = offset + LOCAL_HEADER_LEN;
        let Some(name) = data.get(name_start..name_start + name_len) else {
            break;
        };
        let name = String::from_utf8_lossy(name).into_owned();

        let flags = le16(offset + LOCAL_FLAGS);
        let stored = le16(offset + LOCAL_METHOD) == 0;
        let size = le32(offset + LOCAL_COMPRESSED_SIZE) as usize;
        let body_start = name_start + name_len + extra_len;

        if name == "mimetype" && stored {
            mimetype = data
                .get(body_start..body_start + size)
                .map(|v| String::from_utf8_lossy(v).into_owned());
        }
        names.push(name);

        if flags & FLAG_DATA_DESCRIPTOR != 0 {
            break;
        }
        offset = body_start.saturating_add(size);
    }

    (names, mimetype)
}

/// Check if a path has a supported extension.
pub fn is_supported<P: AsRef<Path>>(path: P) -> bool {
    detect_format_from_path(path).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::zip_with;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    #[test]
    fn test_detect_from_extension() {
        assert_eq!(detect_format_from_path("a/b/c.pptx").unwrap(), Format::Pptx);
        assert_eq!(detect_format_from_path("C.ODS").unwrap(), Format::Ods);
        assert_eq!(detect_format_from_path("x.pdf").unwrap(), Format::Pdf);
    }

    #[test]
    fn test_detect_unsupported_extension() {
        let err = detect_format_from_path("notes.txt").unwrap_err();
        assert!(matches!(
            err,
            Error::ExtensionUnsupported { ref extension } if extension == "txt"
        ));
        assert!(!is_supported("Makefile"));
    }

    #[test]
    fn test_detect_pdf_bytes() {
        assert_eq!(
            detect_format_from_bytes(b"%PDF-1.7\n%\xe2\xe3\xcf\xd3").unwrap(),
            Format::Pdf
        );
        // Junk before the header is tolerated.
        assert_eq!(
            detect_format_from_bytes(b"\x00\x00junk%PDF-1.4\n").unwrap(),
            Format::Pdf
        );
    }

    #[test]
    fn test_detect_zip_formats() {
        let docx = zip_with(&[
            ("[Content_Types].xml", "<Types/>"),
            ("word/document.xml", "<w:document/>"),
        ]);
        assert_eq!(detect_format_from_bytes(&docx).unwrap(), Format::Docx);

        let pptx = zip_with(&[("ppt/slides/slide1.xml", "<p:sld/>")]);
        assert_eq!(detect_format_from_bytes(&pptx).unwrap(), Format::Pptx);

        let xlsx = zip_with(&[("xl/workbook.xml", "<workbook/>")]);
        assert_eq!(detect_format_from_bytes(&xlsx).unwrap(), Format::Xlsx);

        let odp = zip_with(&[
            ("mimetype", "application/vnd.oasis.opendocument.presentation"),
            ("content.xml", "<office:document-content/>"),
        ]);
        assert_eq!(detect_format_from_bytes(&odp).unwrap(), Format::Odp);

        let bare_odf = zip_with(&[("content.xml", "<office:document-content/>")]);
        assert_eq!(detect_format_from_bytes(&bare_odf).unwrap(), Format::Odt);
    }

    #[test]
    fn test_detect_improper_buffers() {
        assert!(matches!(
            detect_format_from_bytes(b""),
            Err(Error::ImproperBuffers(_))
        ));
        assert!(matches!(
            detect_format_from_bytes(b"<!DOCTYPE html>"),
            Err(Error::ImproperBuffers(_))
        ));
        let other_zip = zip_with(&[("readme.txt", "hello")]);
        assert!(matches!(
            detect_format_from_bytes(&other_zip),
            Err(Error::ImproperBuffers(_))
        ));
        // Signature without a complete local header.
        assert!(matches!(
            detect_format_from_bytes(b"PK\x03\x04\x14\x00"),
            Err(Error::ImproperBuffers(_))
        ));
    }

    #[test]
    fn test_detect_truncated_zip_from_local_headers() {
        let docx = zip_with(&[
            ("word/document.xml", "<w:document><w:body/></w:document>"),
            ("word/styles.xml", "<w:styles/>"),
        ]);
        let cut = &docx[..docx.len() / 2];
        assert!(ZipArchive::new(Cursor::new(cut)).is_err());
        assert_eq!(detect_format_from_bytes(cut).unwrap(), Format::Docx);

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("mimetype", stored).unwrap();
        writer
            .write_all(b"application/vnd.oasis.opendocument.presentation")
            .unwrap();
        writer.start_file("content.xml", SimpleFileOptions::default()).unwrap();
        writer.write_all(b"<office:document-content/>").unwrap();
        let odp = writer.finish().unwrap().into_inner();
        let central = odp.windows(4).position(|w| w == b"PK\x01\x02").unwrap();
        assert_eq!(detect_format_from_bytes(&odp[..central]).unwrap(), Format::Odp);
    }

    #[test]
    fn test_zip_checked_before_pdf_header() {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);
        writer.start_file("word/document.xml", stored).unwrap();
        writer.write_all(b"%PDF-1.4 quoted in a document").unwrap();
        let docx = writer.finish().unwrap().into_inner();
        assert!(docx[..64].windows(5).any(|w| w == b"%PDF-"));
        assert_eq!(detect_format_from_bytes(&docx).unwrap(), Format::Docx);
    }

    #[test]
    fn test_input_conversions() {
        assert_eq!(Input::from("a.docx"), Input::Path(PathBuf::from("a.docx")));
        assert_eq!(Input::from(vec![1u8, 2]), Input::Buffer(vec![1, 2]));
        assert_eq!(Input::from(&b"xy"[..]), Input::Buffer(b"xy".to_vec()));
    }

    #[test]
    fn test_format_family() {
        assert!(Format::Docx.is_archive());
        assert!(Format::Ods.is_archive());
        assert!(!Format::Pdf.is_archive());
        assert_eq!(Format::Odp.family(), Family::OpenDocument);
        assert_eq!(Format::from_extension(".XLSX"), Some(Format::Xlsx));
    }
}

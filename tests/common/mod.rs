//! In-memory fixture builders shared by the integration tests.

#![allow(dead_code)]

use std::fs;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use tempfile::TempDir;
use unoffice::ParseConfig;
use zip::unstable::write::FileOptionsExt;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;
const PML: &str = r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main""#;
const SML: &str = r#"xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main""#;
const ODF: &str = r#"xmlns:office="urn:oasis:names:tc:opendocument:xmlns:office:1.0" xmlns:text="urn:oasis:names:tc:opendocument:xmlns:text:1.0" xmlns:table="urn:oasis:names:tc:opendocument:xmlns:table:1.0" xmlns:draw="urn:oasis:names:tc:opendocument:xmlns:drawing:1.0" xmlns:presentation="urn:oasis:names:tc:opendocument:xmlns:presentation:1.0" xmlns:style="urn:oasis:names:tc:opendocument:xmlns:style:1.0""#;

/// Build a zip archive from `(name, contents)` pairs.
pub fn zip<N: AsRef<str>>(entries: &[(N, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in entries {
        writer
            .start_file(name.as_ref(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Build a zip archive whose entries are all password protected.
pub fn encrypted_zip(entries: &[(&str, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().with_deprecated_encryption(b"secret");
    for (name, body) in entries {
        writer.start_file(*name, options).unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

fn w_paragraphs(paragraphs: &[&str]) -> String {
    paragraphs
        .iter()
        .map(|p| format!("<w:p><w:r><w:t xml:space=\"preserve\">{}</w:t></w:r></w:p>", p))
        .collect()
}

/// Word document entries with one run per paragraph.
pub fn docx_entries(paragraphs: &[&str]) -> Vec<(&'static str, String)> {
    vec![
        (
            "[Content_Types].xml",
            "<Types xmlns=\"http://schemas.openxmlformats.org/package/2006/content-types\"/>"
                .to_string(),
        ),
        (
            "word/document.xml",
            format!(
                "<w:document {}><w:body>{}</w:body></w:document>",
                W,
                w_paragraphs(paragraphs)
            ),
        ),
    ]
}

/// A word document with one run per paragraph.
pub fn docx(paragraphs: &[&str]) -> Vec<u8> {
    zip(&docx_entries(paragraphs))
}

/// A word document with a header, a table, a footnote and a footer.
pub fn docx_full() -> Vec<u8> {
    let body = format!(
        "<w:document {w}><w:body>\
         <w:p><w:r><w:t>Intro</w:t></w:r><w:r><w:footnoteReference w:id=\"1\"/></w:r></w:p>\
         <w:tbl><w:tr>\
         <w:tc><w:p><w:r><w:t>A1</w:t></w:r></w:p></w:tc>\
         <w:tc><w:p><w:r><w:t>B1</w:t></w:r></w:p></w:tc>\
         </w:tr></w:tbl>\
         <w:p><w:r><w:t>Outro</w:t></w:r></w:p>\
         </w:body></w:document>",
        w = W
    );
    zip(&[
        ("[Content_Types].xml", "<Types/>".to_string()),
        ("word/document.xml", body),
        (
            "word/header1.xml",
            format!("<w:hdr {}>{}</w:hdr>", W, w_paragraphs(&["Page header"])),
        ),
        (
            "word/footer1.xml",
            format!("<w:ftr {}>{}</w:ftr>", W, w_paragraphs(&["Page footer"])),
        ),
        (
            "word/footnotes.xml",
            format!(
                "<w:footnotes {}><w:footnote w:id=\"1\">{}</w:footnote></w:footnotes>",
                W,
                w_paragraphs(&["A footnote"])
            ),
        ),
    ])
}

fn pml_text(root: &str, text: &str) -> String {
    format!(
        "<p:{root} {ns}><p:cSld><p:spTree><p:sp><p:txBody><a:p><a:r><a:t>{text}</a:t></a:r></a:p></p:txBody></p:sp></p:spTree></p:cSld></p:{root}>",
        root = root,
        ns = PML,
        text = text
    )
}

/// A presentation; each slide has body text and optional speaker notes.
pub fn pptx(slides: &[(&str, Option<&str>)]) -> Vec<u8> {
    let mut entries = vec![
        ("[Content_Types].xml".to_string(), "<Types/>".to_string()),
        (
            "ppt/presentation.xml".to_string(),
            format!("<p:presentation {}/>", PML),
        ),
    ];
    for (i, (body, notes)) in slides.iter().enumerate() {
        let n = i + 1;
        entries.push((
            format!("ppt/slides/slide{}.xml", n),
            pml_text("sld", body),
        ));
        if let Some(notes) = notes {
            entries.push((
                format!("ppt/notesSlides/notesSlide{}.xml", n),
                pml_text("notes", notes),
            ));
        }
    }
    zip(&entries)
}

/// A workbook with one sheet: a row of shared string cells followed by a
/// row of numbers.
pub fn xlsx(cells: &[&str], numbers: &[f64]) -> Vec<u8> {
    let shared: String = cells.iter().map(|c| format!("<si><t>{}</t></si>", c)).collect();
    let strings: String = (0..cells.len())
        .map(|i| format!("<c r=\"{}1\" t=\"s\"><v>{}</v></c>", column(i), i))
        .collect();
    let values: String = numbers
        .iter()
        .enumerate()
        .map(|(i, n)| format!("<c r=\"{}2\"><v>{}</v></c>", column(i), n))
        .collect();
    let rows = format!("<row r=\"1\">{}</row><row r=\"2\">{}</row>", strings, values);
    zip(&[
        ("[Content_Types].xml", "<Types/>".to_string()),
        (
            "xl/workbook.xml",
            format!(
                "<workbook {} xmlns:r=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships\"><sheets><sheet name=\"Data\" sheetId=\"1\" r:id=\"rId1\"/></sheets></workbook>",
                SML
            ),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            "<Relationships xmlns=\"http://schemas.openxmlformats.org/package/2006/relationships\"><Relationship Id=\"rId1\" Type=\"http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet\" Target=\"worksheets/sheet1.xml\"/></Relationships>".to_string(),
        ),
        (
            "xl/sharedStrings.xml",
            format!("<sst {}>{}</sst>", SML, shared),
        ),
        (
            "xl/worksheets/sheet1.xml",
            format!("<worksheet {}><sheetData>{}</sheetData></worksheet>", SML, rows),
        ),
    ])
}

fn column(index: usize) -> char {
    (b'A' + index as u8) as char
}

fn odf(mimetype: &str, body: &str) -> Vec<u8> {
    zip(&[
        ("mimetype", mimetype.to_string()),
        (
            "content.xml",
            format!(
                "<office:document-content {}><office:body>{}</office:body></office:document-content>",
                ODF, body
            ),
        ),
    ])
}

/// A text document with the given `office:text` children.
pub fn odt(body: &str) -> Vec<u8> {
    odf(
        "application/vnd.oasis.opendocument.text",
        &format!("<office:text>{}</office:text>", body),
    )
}

/// A presentation; each page has a text frame and optional notes.
pub fn odp(pages: &[(&str, Option<&str>)]) -> Vec<u8> {
    let body: String = pages
        .iter()
        .enumerate()
        .map(|(i, (text, notes))| {
            let notes = notes
                .map(|n| {
                    format!(
                        "<presentation:notes><draw:frame><draw:text-box><text:p>{}</text:p></draw:text-box></draw:frame></presentation:notes>",
                        n
                    )
                })
                .unwrap_or_default();
            format!(
                "<draw:page draw:name=\"page{}\"><draw:frame><draw:text-box><text:p>{}</text:p></draw:text-box></draw:frame>{}</draw:page>",
                i + 1,
                text,
                notes
            )
        })
        .collect();
    odf(
        "application/vnd.oasis.opendocument.presentation",
        &format!("<office:presentation>{}</office:presentation>", body),
    )
}

/// A spreadsheet with one row of string cells.
pub fn ods(cells: &[&str]) -> Vec<u8> {
    let row: String = cells
        .iter()
        .map(|c| format!("<table:table-cell office:value-type=\"string\"><text:p>{}</text:p></table:table-cell>", c))
        .collect();
    odf(
        "application/vnd.oasis.opendocument.spreadsheet",
        &format!(
            "<office:spreadsheet><table:table table:name=\"Sheet1\"><table:table-row>{}</table:table-row></table:table></office:spreadsheet>",
            row
        ),
    )
}

/// A PDF with one text line per entry of each page.
pub fn pdf(pages: &[&[&str]], compress: bool) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in pages {
        let mut operations = vec![
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec!["F1".into(), 12.into()]),
            Operation::new("Td", vec![72.into(), 720.into()]),
        ];
        for (i, line) in lines.iter().enumerate() {
            if i > 0 {
                operations.push(Operation::new("Td", vec![0.into(), (-14).into()]));
            }
            operations.push(Operation::new("Tj", vec![Object::string_literal(*line)]));
        }
        operations.push(Operation::new("ET", vec![]));

        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);
    if compress {
        doc.compress();
    }

    let mut out = Vec::new();
    doc.save_to(&mut out).unwrap();
    out
}

/// A configuration whose workspaces live in a fresh temporary directory.
pub fn scratch() -> (TempDir, ParseConfig) {
    let temp = TempDir::new().unwrap();
    let config = ParseConfig::new().with_temp_files_location(temp.path());
    (temp, config)
}

/// Directories currently inside `location`.
pub fn workspaces(location: &Path) -> Vec<PathBuf> {
    let mut dirs: Vec<PathBuf> = fs::read_dir(location)
        .unwrap()
        .map(|e| e.unwrap().path())
        .filter(|p| p.is_dir())
        .collect();
    dirs.sort();
    dirs
}

/// Write `data` to `name` inside `dir` and return the path.
pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, data).unwrap();
    path
}

//! Test utilities for building ZIP archives and DOCX packages.
//!
//! # Panics
//!
//! All functions in this module may panic on I/O errors since they are
//! designed for test use only where panics are acceptable.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Cursor;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use tempfile::TempDir;
use zip::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::write::ZipWriter;

use crate::transform::DIVIDING_LINE;
use crate::transform::HYPERLINK_UNDERLINE;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"/>"#;

/// Creates an in-memory ZIP archive from a list of entries.
///
/// Each entry is a tuple of (path, content). Files are stored uncompressed
/// with mode 0o644.
///
/// # Examples
///
/// ```
/// use docxfix_core::test_utils::create_test_zip;
///
/// let zip_data = create_test_zip(&[
///     ("file.txt", b"hello".as_slice()),
///     ("dir/nested.txt", b"world".as_slice()),
/// ]);
/// assert_eq!(&zip_data[0..4], b"PK\x03\x04");
/// ```
#[must_use]
pub fn create_test_zip(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));

    let options = SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored)
        .unix_permissions(0o644);

    for (path, data) in entries {
        zip.start_file(*path, options).unwrap();
        zip.write_all(data).unwrap();
    }

    zip.finish().unwrap().into_inner()
}

/// Builder for ZIP test archives with explicit directory entries.
///
/// # Examples
///
/// ```
/// use docxfix_core::test_utils::ZipTestBuilder;
///
/// let zip_data = ZipTestBuilder::new()
///     .add_directory("docs/")
///     .add_file("docs/a.txt", b"a")
///     .build();
/// assert!(!zip_data.is_empty());
/// ```
pub struct ZipTestBuilder {
    writer: ZipWriter<Cursor<Vec<u8>>>,
}

impl ZipTestBuilder {
    /// Creates a new ZIP test builder.
    #[must_use]
    pub fn new() -> Self {
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
        }
    }

    /// Adds a deflated file with mode 0o644.
    #[must_use]
    pub fn add_file(self, path: &str, data: &[u8]) -> Self {
        self.add_file_with_mode(path, data, 0o644)
    }

    /// Adds a deflated file with a custom mode.
    #[must_use]
    pub fn add_file_with_mode(mut self, path: &str, data: &[u8], mode: u32) -> Self {
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .unix_permissions(mode);
        self.writer.start_file(path, options).unwrap();
        self.writer.write_all(data).unwrap();
        self
    }

    /// Adds a directory entry.
    #[must_use]
    pub fn add_directory(mut self, path: &str) -> Self {
        self.writer
            .add_directory(path, SimpleFileOptions::default())
            .unwrap();
        self
    }

    /// Finishes the archive and returns its bytes.
    #[must_use]
    pub fn build(self) -> Vec<u8> {
        self.writer.finish().unwrap().into_inner()
    }
}

impl Default for ZipTestBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Creates an in-memory DOCX package whose `word/document.xml` holds
/// `document_xml` verbatim.
///
/// The package also carries `[Content_Types].xml`, `_rels/.rels` and
/// `word/styles.xml`.
#[must_use]
pub fn create_test_docx(document_xml: &str) -> Vec<u8> {
    ZipTestBuilder::new()
        .add_file("[Content_Types].xml", CONTENT_TYPES.as_bytes())
        .add_file("_rels/.rels", ROOT_RELS.as_bytes())
        .add_file("word/document.xml", document_xml.as_bytes())
        .add_file("word/styles.xml", STYLES.as_bytes())
        .build()
}

/// Document XML holding one dividing line, one underlined hyperlink run and
/// one underlined run outside any hyperlink.
#[must_use]
pub fn sample_document_xml() -> String {
    format!(
        concat!(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
            "<w:p>{line}</w:p>",
            r#"<w:p><w:hyperlink r:id="rId7"><w:r><w:rPr>{u}</w:rPr><w:t>link</w:t></w:r></w:hyperlink></w:p>"#,
            "<w:p><w:r><w:rPr>{u}</w:rPr><w:t>plain</w:t></w:r></w:p>",
            "</w:body></w:document>"
        ),
        line = DIVIDING_LINE,
        u = HYPERLINK_UNDERLINE,
    )
}

/// Creates a temporary directory whose path has no `.` in its final
/// component.
///
/// The legacy extraction layout strips the first `.` of the whole archive
/// path, so archives under the default `.tmpXXXX` directories would be
/// unpacked next to the temporary directory instead of inside it.
#[must_use]
pub fn dotless_temp_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("docxfix-test-")
        .tempdir()
        .unwrap()
}

/// Reads every file entry of the ZIP archive at `path` into a map from entry
/// name to content. Directory entries are skipped.
#[must_use]
pub fn read_zip_entries(path: &Path) -> BTreeMap<String, Vec<u8>> {
    read_zip_entries_from(File::open(path).unwrap())
}

/// Same as [`read_zip_entries`] for in-memory archive bytes.
#[must_use]
pub fn read_zip_bytes(data: &[u8]) -> BTreeMap<String, Vec<u8>> {
    read_zip_entries_from(Cursor::new(data))
}

fn read_zip_entries_from<R: Read + std::io::Seek>(reader: R) -> BTreeMap<String, Vec<u8>> {
    let mut archive = ZipArchive::new(reader).unwrap();
    let mut entries = BTreeMap::new();

    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        if entry.is_dir() {
            continue;
        }
        let mut data = Vec::new();
        entry.read_to_end(&mut data).unwrap();
        entries.insert(entry.name().to_string(), data);
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_zip_roundtrip() {
        let data = create_test_zip(&[("a.txt", b"a".as_slice()), ("b/c.txt", b"c".as_slice())]);
        let entries = read_zip_bytes(&data);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries["b/c.txt"], b"c");
    }

    #[test]
    fn test_create_test_docx_parts() {
        let entries = read_zip_bytes(&create_test_docx("<w:body/>"));
        assert_eq!(entries["word/document.xml"], b"<w:body/>");
        assert!(entries.contains_key("[Content_Types].xml"));
        assert!(entries.contains_key("_rels/.rels"));
    }

    #[test]
    fn test_dotless_temp_dir() {
        let dir = dotless_temp_dir();
        let name = dir.path().file_name().unwrap().to_str().unwrap();
        assert!(!name.contains('.'));
    }

    #[test]
    fn test_sample_document_xml_contains_patterns() {
        let xml = sample_document_xml();
        assert_eq!(xml.matches(DIVIDING_LINE).count(), 1);
        assert_eq!(xml.matches(HYPERLINK_UNDERLINE).count(), 2);
    }
}

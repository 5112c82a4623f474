//! DOCX package container.
//!
//! A `.docx` file is a ZIP package. The text payload lives in
//! `word/document.xml`; every other part is carried through unchanged.

use std::fs::File;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::path::Path;

use zip::CompressionMethod;
use zip::ZipArchive;
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

use crate::document::DocumentContainer;
use crate::document::DocumentFormat;
use crate::error::zip_to_io;

/// Name of the main document part inside a package.
pub const DOCUMENT_PART: &str = "word/document.xml";

/// Opens `.docx` packages.
#[derive(Debug, Clone, Copy, Default)]
pub struct DocxFormat;

impl DocxFormat {
    /// Creates a new DOCX format handler.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl DocumentFormat for DocxFormat {
    type Container = DocxPackage;

    fn open(&self, path: &Path) -> std::io::Result<DocxPackage> {
        DocxPackage::read(path)
    }
}

#[derive(Debug, Clone)]
struct Part {
    name: String,
    data: Vec<u8>,
    stored: bool,
    is_dir: bool,
}

/// An opened `.docx` package held fully in memory.
///
/// Because nothing keeps the source file open, the file can be removed and
/// recreated while the package is alive.
#[derive(Debug, Clone)]
pub struct DocxPackage {
    parts: Vec<Part>,
    document_index: usize,
    text: String,
}

impl DocxPackage {
    /// Reads every part of the package at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not a ZIP archive,
    /// has no `word/document.xml` part, or that part is not valid UTF-8.
    pub fn read(path: &Path) -> std::io::Result<Self> {
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(BufReader::new(file)).map_err(zip_to_io)?;

        let mut parts = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).map_err(zip_to_io)?;
            let mut data = Vec::new();
            entry.read_to_end(&mut data)?;
            parts.push(Part {
                name: entry.name().to_string(),
                stored: entry.compression() == CompressionMethod::Stored,
                is_dir: entry.is_dir(),
                data,
            });
        }

        let document_index = parts
            .iter()
            .position(|part| part.name == DOCUMENT_PART)
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    format!("package has no {DOCUMENT_PART} part"),
                )
            })?;

        let text = String::from_utf8(std::mem::take(&mut parts[document_index].data))
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;

        Ok(Self {
            parts,
            document_index,
            text,
        })
    }

    /// Returns the names of all parts, in package order.
    pub fn part_names(&self) -> impl Iterator<Item = &str> {
        self.parts.iter().map(|part| part.name.as_str())
    }

    /// Returns the raw bytes of a part other than the document part.
    #[must_use]
    pub fn part(&self, name: &str) -> Option<&[u8]> {
        self.parts
            .iter()
            .enumerate()
            .find(|(i, part)| *i != self.document_index && part.name == name)
            .map(|(_, part)| part.data.as_slice())
    }

    fn write_to<W: Write + std::io::Seek>(&self, writer: W) -> std::io::Result<W> {
        let mut zip = ZipWriter::new(writer);
        let deflated = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let stored = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

        for (i, part) in self.parts.iter().enumerate() {
            let options = if part.stored { stored } else { deflated };

            if part.is_dir {
                zip.add_directory(part.name.as_str(), options)
                    .map_err(zip_to_io)?;
                continue;
            }

            zip.start_file(part.name.as_str(), options)
                .map_err(zip_to_io)?;
            if i == self.document_index {
                zip.write_all(self.text.as_bytes())?;
            } else {
                zip.write_all(&part.data)?;
            }
        }

        zip.finish().map_err(zip_to_io)
    }
}

impl DocumentContainer for DocxPackage {
    fn text(&self) -> &str {
        &self.text
    }

    fn set_text(&mut self, text: String) {
        self.text = text;
    }

    fn save(&self, path: &Path) -> std::io::Result<()> {
        let file = File::create(path)?;
        let file = self.write_to(file)?;
        file.sync_all()
    }
}

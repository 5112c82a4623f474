//! In-place document conversion.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use crate::ConversionError;
use crate::Result;
use crate::docx::DocxFormat;
use crate::error::Rollback;
use crate::transform::TransformStats;
use crate::transform::transform_with_stats;

/// An opened document whose text payload can be read, replaced and saved.
///
/// Closing happens on drop.
pub trait DocumentContainer {
    /// Returns the full text payload.
    fn text(&self) -> &str;

    /// Replaces the text payload in memory.
    fn set_text(&mut self, text: String);

    /// Writes the container, including the current text payload, to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written.
    fn save(&self, path: &Path) -> std::io::Result<()>;
}

/// Opens document containers of one format.
pub trait DocumentFormat {
    /// Container type produced by [`open`](Self::open).
    type Container: DocumentContainer;

    /// Opens the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid
    /// document of this format.
    fn open(&self, path: &Path) -> std::io::Result<Self::Container>;
}

/// Result of a successful conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOutcome {
    /// The converted document.
    pub path: PathBuf,
    /// What the markup rewrite changed.
    pub stats: TransformStats,
}

/// Rewrites documents in place.
///
/// # Examples
///
/// ```no_run
/// use docxfix_core::DocumentConverter;
/// use std::path::Path;
///
/// let converter = DocumentConverter::docx();
/// let outcome = converter.convert(Path::new("report.docx"))?;
/// println!("replaced {} dividing lines", outcome.stats.dividing_lines);
/// # Ok::<(), docxfix_core::ConversionError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct DocumentConverter<F = DocxFormat> {
    format: F,
}

impl DocumentConverter {
    /// Creates a converter for `.docx` packages.
    #[must_use]
    pub fn docx() -> Self {
        Self::new(DocxFormat::new())
    }
}

impl<F: DocumentFormat> DocumentConverter<F> {
    /// Creates a converter using the given document format.
    #[must_use]
    pub fn new(format: F) -> Self {
        Self { format }
    }

    /// Converts the document at `path` in place.
    ///
    /// The document is opened and rewritten in memory, the file is removed,
    /// and the container is saved back to the same path. If that save
    /// fails, the original text is put back and saved once more; the outcome
    /// of that second save is reported in [`ConversionError::Write`].
    ///
    /// # Errors
    ///
    /// - [`ConversionError::Open`] if the document cannot be opened; the file
    ///   is untouched.
    /// - [`ConversionError::Remove`] if the file cannot be removed; the file
    ///   is untouched.
    /// - [`ConversionError::Write`] if the converted document cannot be
    ///   written. With [`Rollback::Failed`] the file may no longer exist.
    pub fn convert(&self, path: &Path) -> Result<ConversionOutcome> {
        let mut container = self.format.open(path).map_err(|source| ConversionError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let original = container.text().to_owned();
        let (converted, stats) = transform_with_stats(&original);
        container.set_text(converted);

        fs::remove_file(path).map_err(|source| ConversionError::Remove {
            path: path.to_path_buf(),
            source,
        })?;

        if let Err(source) = container.save(path) {
            container.set_text(original);
            let rollback = match container.save(path) {
                Ok(()) => Rollback::Restored,
                Err(err) => Rollback::Failed(err),
            };
            tracing::warn!(
                path = %path.display(),
                error = %source,
                %rollback,
                "writing converted document failed"
            );
            return Err(ConversionError::Write {
                path: path.to_path_buf(),
                source,
                rollback,
            });
        }

        tracing::info!(
            path = %path.display(),
            dividing_lines = stats.dividing_lines,
            underlines_removed = stats.underlines_removed,
            "converted document"
        );

        Ok(ConversionOutcome {
            path: path.to_path_buf(),
            stats,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_docx;
    use crate::test_utils::sample_document_xml;
    use crate::transform::DASHES;
    use crate::transform::DIVIDING_LINE;
    use crate::transform::HYPERLINK_UNDERLINE;
    use std::cell::Cell;
    use std::io;
    use std::rc::Rc;
    use tempfile::TempDir;

    /// Plain-text documents whose saves can be made to fail.
    struct MemoryFormat {
        /// Text returned by `open` instead of reading the file.
        fixed_text: Option<String>,
        /// Number of upcoming saves that fail.
        failing_saves: Rc<Cell<usize>>,
    }

    impl MemoryFormat {
        fn failing(saves: usize) -> Self {
            Self {
                fixed_text: None,
                failing_saves: Rc::new(Cell::new(saves)),
            }
        }
    }

    struct MemoryDocument {
        text: String,
        failing_saves: Rc<Cell<usize>>,
    }

    impl DocumentContainer for MemoryDocument {
        fn text(&self) -> &str {
            &self.text
        }

        fn set_text(&mut self, text: String) {
            self.text = text;
        }

        fn save(&self, path: &Path) -> io::Result<()> {
            let remaining = self.failing_saves.get();
            if remaining > 0 {
                self.failing_saves.set(remaining - 1);
                return Err(io::Error::other("simulated write failure"));
            }
            fs::write(path, &self.text)
        }
    }

    impl DocumentFormat for MemoryFormat {
        type Container = MemoryDocument;

        fn open(&self, path: &Path) -> io::Result<MemoryDocument> {
            let text = match &self.fixed_text {
                Some(text) => text.clone(),
                None => fs::read_to_string(path)?,
            };
            Ok(MemoryDocument {
                text,
                failing_saves: Rc::clone(&self.failing_saves),
            })
        }
    }

    fn hyperlinked_text() -> String {
        format!(
            "A<w:hyperlink>B{HYPERLINK_UNDERLINE}C</w:hyperlink>D{HYPERLINK_UNDERLINE}E{DIVIDING_LINE}"
        )
    }

    #[test]
    fn test_convert_rewrites_in_place() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.txt");
        fs::write(&path, hyperlinked_text()).unwrap();

        let converter = DocumentConverter::new(MemoryFormat::failing(0));
        let outcome = converter.convert(&path).unwrap();

        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            format!("A<w:hyperlink>BC</w:hyperlink>D{HYPERLINK_UNDERLINE}E{DASHES}")
        );
        assert_eq!(outcome.path, path);
        assert_eq!(outcome.stats.dividing_lines, 1);
        assert_eq!(outcome.stats.underlines_removed, 1);
    }

    #[test]
    fn test_convert_open_failure_leaves_nothing_behind() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("missing.txt");

        let converter = DocumentConverter::new(MemoryFormat::failing(0));
        let err = converter.convert(&path).unwrap_err();

        assert!(matches!(err, ConversionError::Open { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_convert_remove_failure_discards_new_content() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("vanished.txt");

        let format = MemoryFormat {
            fixed_text: Some(hyperlinked_text()),
            failing_saves: Rc::new(Cell::new(0)),
        };
        let err = DocumentConverter::new(format).convert(&path).unwrap_err();

        assert!(matches!(err, ConversionError::Remove { .. }));
        assert!(!path.exists());
    }

    #[test]
    fn test_convert_write_failure_restores_original() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.txt");
        let original = hyperlinked_text();
        fs::write(&path, &original).unwrap();

        let converter = DocumentConverter::new(MemoryFormat::failing(1));
        let err = converter.convert(&path).unwrap_err();

        match &err {
            ConversionError::Write { rollback, .. } => assert!(rollback.is_restored()),
            other => panic!("expected Write error, got {other:?}"),
        }
        assert_eq!(fs::read_to_string(&path).unwrap(), original);
    }

    #[test]
    fn test_convert_write_and_rollback_failure_loses_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("doc.txt");
        fs::write(&path, hyperlinked_text()).unwrap();

        let converter = DocumentConverter::new(MemoryFormat::failing(2));
        let err = converter.convert(&path).unwrap_err();

        assert!(matches!(
            err.rollback(),
            Some(Rollback::Failed(_))
        ));
        // Known data-loss window: the original was removed before the
        // failed writes.
        assert!(!path.exists());
    }

    #[test]
    fn test_convert_real_docx() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.docx");
        fs::write(&path, create_test_docx(&sample_document_xml())).unwrap();

        let converter = DocumentConverter::docx();
        let outcome = converter.convert(&path).unwrap();
        assert_eq!(outcome.stats.dividing_lines, 1);
        assert_eq!(outcome.stats.underlines_removed, 1);

        let package = DocxFormat::new().open(&path).unwrap();
        let text = package.text();
        assert!(!text.contains(DIVIDING_LINE));
        assert!(text.contains(DASHES));
        assert_eq!(text.matches(HYPERLINK_UNDERLINE).count(), 1);
    }

    #[test]
    fn test_convert_invalid_docx_is_untouched() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("broken.docx");
        fs::write(&path, b"garbage").unwrap();

        let err = DocumentConverter::docx().convert(&path).unwrap_err();
        assert!(matches!(err, ConversionError::Open { .. }));
        assert_eq!(fs::read(&path).unwrap(), b"garbage");
    }
}

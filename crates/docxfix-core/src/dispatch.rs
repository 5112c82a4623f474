//! Path classification and recursive processing.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;
use std::time::Instant;

use tracing::debug;
use tracing::info;

use crate::ArchiveManager;
use crate::ConversionError;
use crate::DocumentConverter;
use crate::ProcessConfig;
use crate::Result;
use crate::config::ExtensionRule;
use crate::config::ExtractionLayout;
use crate::docx::DocxFormat;
use crate::document::DocumentFormat;
use crate::paths::classification_extension;
use crate::paths::clean;
use crate::paths::legacy_extraction_dir;
use crate::report::ProcessObserver;
use crate::report::ProcessReport;

const STAGING_PREFIX: &str = ".docxfix-";

/// What a path is handled as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Every child is processed.
    Directory,
    /// Rewritten in place.
    Document,
    /// Unpacked, processed and packed again.
    Archive,
    /// Left alone.
    Unsupported,
}

/// A stat'ed path with the extension used to classify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Absolute path.
    pub path: PathBuf,
    /// Whether the path is a directory, following symlinks.
    pub is_dir: bool,
    /// Classification extension, empty when there is none.
    pub extension: String,
}

impl FileEntry {
    /// Makes `path` absolute with `.` and `..` resolved, and reads its
    /// metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ConversionError::Stat`] if the path does not exist or its
    /// metadata cannot be read.
    pub fn inspect(path: &Path, rule: ExtensionRule) -> Result<Self> {
        let stat_error = |source: io::Error| ConversionError::Stat {
            path: path.to_path_buf(),
            source,
        };

        let path = clean(&std::path::absolute(path).map_err(stat_error)?);
        let metadata = fs::metadata(&path).map_err(stat_error)?;

        let extension = path
            .file_name()
            .map(|name| classification_extension(&name.to_string_lossy(), rule).to_string())
            .unwrap_or_default();

        Ok(Self {
            is_dir: metadata.is_dir(),
            path,
            extension,
        })
    }

    /// Classifies the entry. Extension matching is case-sensitive.
    #[must_use]
    pub fn kind(&self, config: &ProcessConfig) -> FileKind {
        if self.is_dir {
            FileKind::Directory
        } else if self.extension == config.document_extension {
            FileKind::Document
        } else if self.extension == config.archive_extension {
            FileKind::Archive
        } else {
            FileKind::Unsupported
        }
    }
}

/// Walks paths and dispatches each one by its [`FileKind`].
///
/// # Examples
///
/// ```no_run
/// use docxfix_core::NoopObserver;
/// use docxfix_core::ProcessConfig;
/// use docxfix_core::Processor;
/// use std::path::Path;
///
/// let processor = Processor::new(ProcessConfig::default());
/// let report = processor.process(Path::new("documents"), &mut NoopObserver)?;
/// println!("converted {} documents", report.documents_converted());
/// # Ok::<(), docxfix_core::ConversionError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Processor<F = DocxFormat> {
    config: ProcessConfig,
    converter: DocumentConverter<F>,
    archives: ArchiveManager,
}

impl Processor {
    /// Creates a processor for `.docx` documents.
    #[must_use]
    pub fn new(config: ProcessConfig) -> Self {
        Self::with_format(config, DocxFormat::new())
    }
}

impl Default for Processor {
    fn default() -> Self {
        Self::new(ProcessConfig::default())
    }
}

impl<F: DocumentFormat> Processor<F> {
    /// Creates a processor that opens documents with `format`.
    #[must_use]
    pub fn with_format(config: ProcessConfig, format: F) -> Self {
        let archives = ArchiveManager::new(&config);
        Self {
            config,
            converter: DocumentConverter::new(format),
            archives,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &ProcessConfig {
        &self.config
    }

    /// Processes `path` recursively.
    ///
    /// Failures of directory children are recorded in the report and passed
    /// to `observer`; the walk continues with the next child.
    ///
    /// # Errors
    ///
    /// Returns the error of `path` itself: a failed stat, an unreadable
    /// directory listing, a failed conversion, or a failed archive round
    /// trip wrapped in [`ConversionError::ArchiveHandling`]. The disk may be
    /// left partially processed.
    pub fn process(&self, path: &Path, observer: &mut dyn ProcessObserver) -> Result<ProcessReport> {
        let start = Instant::now();
        let mut report = ProcessReport::new();
        self.visit(path, &mut report, observer)?;
        report.duration = start.elapsed();
        Ok(report)
    }

    fn visit(
        &self,
        path: &Path,
        report: &mut ProcessReport,
        observer: &mut dyn ProcessObserver,
    ) -> Result<()> {
        let entry = FileEntry::inspect(path, self.config.extension_rule)?;

        match entry.kind(&self.config) {
            FileKind::Directory => self.process_directory(&entry.path, report, observer),
            FileKind::Document => {
                let outcome = self.converter.convert(&entry.path)?;
                observer.on_converted(&outcome);
                report.record_conversion(&outcome);
                Ok(())
            }
            FileKind::Archive => {
                self.process_archive(&entry.path, report, observer)
                    .map_err(|source| ConversionError::ArchiveHandling {
                        path: entry.path.clone(),
                        source: Box::new(source),
                    })?;
                observer.on_repacked(&entry.path);
                report.repacked.push(entry.path);
                Ok(())
            }
            FileKind::Unsupported => {
                debug!(path = %entry.path.display(), "skipping unsupported file");
                observer.on_skipped(&entry.path);
                report.skipped.push(entry.path);
                Ok(())
            }
        }
    }

    fn process_directory(
        &self,
        dir: &Path,
        report: &mut ProcessReport,
        observer: &mut dyn ProcessObserver,
    ) -> Result<()> {
        let read_dir_error = |source: io::Error| ConversionError::ReadDir {
            path: dir.to_path_buf(),
            source,
        };

        let mut children = fs::read_dir(dir)
            .map_err(read_dir_error)?
            .map(|entry| entry.map(|entry| entry.path()))
            .collect::<io::Result<Vec<_>>>()
            .map_err(read_dir_error)?;
        children.sort();

        observer.on_directory(dir);
        report.directories_visited += 1;

        for child in children {
            if let Err(err) = self.visit(&child, report, observer) {
                debug!(path = %child.display(), error = %err, "processing failed");
                observer.on_failure(&child, &err);
                report.record_failure(child, err);
            }
        }

        Ok(())
    }

    fn process_archive(
        &self,
        archive: &Path,
        report: &mut ProcessReport,
        observer: &mut dyn ProcessObserver,
    ) -> Result<()> {
        match self.config.extraction_layout {
            ExtractionLayout::Legacy => self.repack_legacy(archive, report, observer),
            ExtractionLayout::Staged => self.repack_staged(archive, report, observer),
        }
    }

    fn repack_legacy(
        &self,
        archive: &Path,
        report: &mut ProcessReport,
        observer: &mut dyn ProcessObserver,
    ) -> Result<()> {
        let dest = legacy_extraction_dir(archive);

        self.archives.unpack(archive, &dest)?;
        self.visit(&dest, report, observer)?;
        let packed = self.archives.pack(&dest)?;

        fs::remove_dir_all(&dest).map_err(|source| ConversionError::Cleanup {
            path: dest.clone(),
            source,
        })?;
        fs::remove_file(archive).map_err(|source| ConversionError::Cleanup {
            path: archive.to_path_buf(),
            source,
        })?;

        info!(
            archive = %archive.display(),
            packed = %packed.display(),
            "repacked archive"
        );
        Ok(())
    }

    fn repack_staged(
        &self,
        archive: &Path,
        report: &mut ProcessReport,
        observer: &mut dyn ProcessObserver,
    ) -> Result<()> {
        let parent = archive.parent().unwrap_or_else(|| Path::new("."));

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(parent)
            .map_err(|source| ConversionError::Unpack {
                archive: archive.to_path_buf(),
                source,
            })?;

        self.archives.unpack(archive, staging.path())?;
        self.visit(staging.path(), report, observer)?;

        let pack_error = |source: io::Error| ConversionError::Pack {
            dir: staging.path().to_path_buf(),
            source,
        };
        let mut packed = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .suffix(".tmp")
            .tempfile_in(parent)
            .map_err(pack_error)?;
        self.archives.pack_into(staging.path(), packed.as_file_mut())?;
        let permissions = fs::metadata(archive).map_err(pack_error)?.permissions();
        packed.as_file().set_permissions(permissions).map_err(pack_error)?;
        packed.as_file().sync_all().map_err(pack_error)?;
        packed.persist(archive).map_err(|e| pack_error(e.error))?;

        let staging_path = staging.path().to_path_buf();
        staging.close().map_err(|source| ConversionError::Cleanup {
            path: staging_path,
            source,
        })?;

        info!(archive = %archive.display(), "repacked archive in place");
        Ok(())
    }
}

//! Error types for document conversion and archive round trips.

use std::path::Path;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using `ConversionError`.
pub type Result<T> = std::result::Result<T, ConversionError>;

/// Outcome of the recovery write attempted after a failed document write.
///
/// The primary write happens after the original file was removed, so the
/// recovery write decides whether the file still exists afterwards.
#[derive(Debug)]
pub enum Rollback {
    /// The original content was written back to the document path.
    Restored,
    /// Writing the original content back failed too. The document may be
    /// missing from disk.
    Failed(std::io::Error),
}

impl Rollback {
    /// Returns `true` if the original content was written back.
    #[must_use]
    pub const fn is_restored(&self) -> bool {
        matches!(self, Self::Restored)
    }
}

impl std::fmt::Display for Rollback {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Restored => write!(f, "original content restored"),
            Self::Failed(err) => write!(f, "restoring original content failed: {err}"),
        }
    }
}

/// Errors that can occur while processing documents, archives and
/// directories.
#[derive(Error, Debug)]
pub enum ConversionError {
    /// The document container could not be read or is not a valid document.
    #[error("error reading document {}: {source}", path.display())]
    Open {
        /// The document path.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The original document could not be removed before rewriting it.
    #[error("error removing document {}: {source}", path.display())]
    Remove {
        /// The path that could not be removed.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// Writing the converted document failed.
    #[error("error writing new content to document {} ({rollback}): {source}", path.display())]
    Write {
        /// The document path.
        path: PathBuf,
        /// Cause of the failed primary write.
        #[source]
        source: std::io::Error,
        /// Result of writing the original content back.
        rollback: Rollback,
    },

    /// An archive entry would be written outside the extraction directory.
    #[error("path traversal detected: entry {} escapes {}", entry.display(), dest.display())]
    PathTraversal {
        /// The entry name as stored in the archive.
        entry: PathBuf,
        /// The extraction directory.
        dest: PathBuf,
    },

    /// Reading the archive or writing its entries to disk failed.
    #[error("error unpacking archive {}: {source}", archive.display())]
    Unpack {
        /// The archive path.
        archive: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// Packing a directory into an archive failed.
    #[error("error packing directory {}: {source}", dir.display())]
    Pack {
        /// The directory being packed.
        dir: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// An extraction directory or replaced archive could not be removed.
    #[error("error removing {}: {source}", path.display())]
    Cleanup {
        /// The path that could not be removed.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// The path does not exist or cannot be inspected.
    #[error("error inspecting path {}: {source}", path.display())]
    Stat {
        /// The inspected path.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// A directory listing could not be read.
    #[error("error reading directory {}: {source}", path.display())]
    ReadDir {
        /// The directory path.
        path: PathBuf,
        /// Underlying cause.
        #[source]
        source: std::io::Error,
    },

    /// A step of the unpack, process, repack, cleanup pipeline failed.
    #[error("error handling archive {}: {source}", path.display())]
    ArchiveHandling {
        /// The archive path.
        path: PathBuf,
        /// The failed step.
        #[source]
        source: Box<ConversionError>,
    },
}

impl ConversionError {
    /// Returns `true` if this error was raised by a path containment check.
    ///
    /// Looks through `ArchiveHandling` wrappers.
    ///
    /// # Examples
    ///
    /// ```
    /// use docxfix_core::ConversionError;
    /// use std::path::PathBuf;
    ///
    /// let err = ConversionError::PathTraversal {
    ///     entry: PathBuf::from("../etc/passwd"),
    ///     dest: PathBuf::from("/tmp/out"),
    /// };
    /// assert!(err.is_security_violation());
    /// ```
    #[must_use]
    pub fn is_security_violation(&self) -> bool {
        match self {
            Self::PathTraversal { .. } => true,
            Self::ArchiveHandling { source, .. } => source.is_security_violation(),
            _ => false,
        }
    }

    /// Returns the path this error is about.
    ///
    /// For `PathTraversal` this is the offending entry name.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Open { path, .. }
            | Self::Remove { path, .. }
            | Self::Write { path, .. }
            | Self::Cleanup { path, .. }
            | Self::Stat { path, .. }
            | Self::ReadDir { path, .. }
            | Self::ArchiveHandling { path, .. } => path,
            Self::PathTraversal { entry, .. } => entry,
            Self::Unpack { archive, .. } => archive,
            Self::Pack { dir, .. } => dir,
        }
    }

    /// Returns the rollback outcome of a failed document write, if any.
    #[must_use]
    pub const fn rollback(&self) -> Option<&Rollback> {
        match self {
            Self::Write { rollback, .. } => Some(rollback),
            _ => None,
        }
    }

    /// Returns the innermost error, unwrapping `ArchiveHandling` layers.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::ArchiveHandling { source, .. } => source.root_cause(),
            _ => self,
        }
    }
}

/// Flattens a `zip` error into an I/O error, keeping the original I/O error
/// when there is one.
pub(crate) fn zip_to_io(err: zip::result::ZipError) -> std::io::Error {
    match err {
        zip::result::ZipError::Io(io_err) => io_err,
        other => std::io::Error::new(std::io::ErrorKind::InvalidData, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    fn io_err(msg: &str) -> io::Error {
        io::Error::new(io::ErrorKind::PermissionDenied, msg)
    }

    #[test]
    fn test_path_traversal_error() {
        let err = ConversionError::PathTraversal {
            entry: PathBuf::from("../etc/passwd"),
            dest: PathBuf::from("/tmp/out"),
        };
        assert!(err.to_string().contains("path traversal"));
        assert!(err.to_string().contains("../etc/passwd"));
        assert!(err.is_security_violation());
        assert_eq!(err.path(), Path::new("../etc/passwd"));
    }

    #[test]
    fn test_write_error_display_includes_rollback() {
        let err = ConversionError::Write {
            path: PathBuf::from("report.docx"),
            source: io_err("disk full"),
            rollback: Rollback::Restored,
        };
        let display = err.to_string();
        assert!(display.contains("report.docx"));
        assert!(display.contains("original content restored"));
        assert!(display.contains("disk full"));
        assert!(err.rollback().is_some_and(Rollback::is_restored));

        let err = ConversionError::Write {
            path: PathBuf::from("report.docx"),
            source: io_err("disk full"),
            rollback: Rollback::Failed(io_err("still full")),
        };
        assert!(err.to_string().contains("restoring original content failed"));
        assert!(!err.rollback().is_some_and(Rollback::is_restored));
    }

    #[test]
    fn test_archive_handling_wraps_cause() {
        use std::error::Error;

        let inner = ConversionError::PathTraversal {
            entry: PathBuf::from("../evil"),
            dest: PathBuf::from("/tmp/archive"),
        };
        let err = ConversionError::ArchiveHandling {
            path: PathBuf::from("/tmp/archive.zip"),
            source: Box::new(inner),
        };

        assert!(err.to_string().contains("/tmp/archive.zip"));
        assert!(err.is_security_violation());
        assert!(err.source().is_some());
        assert!(matches!(
            err.root_cause(),
            ConversionError::PathTraversal { .. }
        ));
        assert_eq!(err.path(), Path::new("/tmp/archive.zip"));
    }

    #[test]
    fn test_io_errors_are_not_security_violations() {
        let err = ConversionError::Stat {
            path: PathBuf::from("missing"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert!(!err.is_security_violation());
        assert!(err.rollback().is_none());
        assert!(err.to_string().contains("missing"));
    }
}

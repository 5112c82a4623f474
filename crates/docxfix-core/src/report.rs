//! Processing reports and observer callbacks.

use std::path::Path;
use std::path::PathBuf;
use std::time::Duration;

use crate::ConversionError;
use crate::document::ConversionOutcome;

/// A failure recorded while walking a directory.
///
/// Failures of directory children do not stop the walk; they end up here.
#[derive(Debug)]
pub struct ProcessFailure {
    /// The child path that failed.
    pub path: PathBuf,
    /// Why it failed.
    pub error: ConversionError,
}

/// Report of one [`Processor::process`](crate::Processor::process) call.
#[derive(Debug, Default)]
pub struct ProcessReport {
    /// Number of directories walked, including extraction directories.
    pub directories_visited: usize,

    /// Documents rewritten in place.
    pub converted: Vec<PathBuf>,

    /// Files left alone because their type is not handled.
    pub skipped: Vec<PathBuf>,

    /// Archives unpacked, processed and packed again. Holds the original
    /// archive paths.
    pub repacked: Vec<PathBuf>,

    /// Per-child failures collected during directory walks.
    pub failures: Vec<ProcessFailure>,

    /// Total dividing lines replaced across all converted documents.
    pub dividing_lines: usize,

    /// Total hyperlink underlines removed across all converted documents.
    pub underlines_removed: usize,

    /// Duration of the whole call.
    pub duration: Duration,
}

impl ProcessReport {
    /// Creates a new empty report.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents converted.
    #[must_use]
    pub fn documents_converted(&self) -> usize {
        self.converted.len()
    }

    /// Number of archives repacked.
    #[must_use]
    pub fn archives_repacked(&self) -> usize {
        self.repacked.len()
    }

    /// Number of unsupported files skipped.
    #[must_use]
    pub fn files_skipped(&self) -> usize {
        self.skipped.len()
    }

    /// Returns whether any child failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }

    pub(crate) fn record_conversion(&mut self, outcome: &ConversionOutcome) {
        self.converted.push(outcome.path.clone());
        self.dividing_lines += outcome.stats.dividing_lines;
        self.underlines_removed += outcome.stats.underlines_removed;
    }

    pub(crate) fn record_failure(&mut self, path: PathBuf, error: ConversionError) {
        self.failures.push(ProcessFailure { path, error });
    }
}

/// Receives notifications while a path is processed.
///
/// Every method has an empty default, so implementors only override what
/// they display.
///
/// # Examples
///
/// ```
/// use docxfix_core::ProcessObserver;
/// use docxfix_core::document::ConversionOutcome;
///
/// struct PrintObserver;
///
/// impl ProcessObserver for PrintObserver {
///     fn on_converted(&mut self, outcome: &ConversionOutcome) {
///         println!("Successfully converted: {}", outcome.path.display());
///     }
/// }
/// ```
pub trait ProcessObserver {
    /// Called before the children of a directory are processed.
    fn on_directory(&mut self, _path: &Path) {}

    /// Called after a document was rewritten.
    fn on_converted(&mut self, _outcome: &ConversionOutcome) {}

    /// Called for a file whose type is not handled.
    fn on_skipped(&mut self, _path: &Path) {}

    /// Called after an archive was replaced by its processed copy.
    fn on_repacked(&mut self, _archive: &Path) {}

    /// Called when a directory child fails. The walk continues afterwards.
    fn on_failure(&mut self, _path: &Path, _error: &ConversionError) {}
}

/// Observer that ignores every notification.
#[derive(Debug, Default)]
pub struct NoopObserver;

impl ProcessObserver for NoopObserver {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::TransformStats;

    #[test]
    fn test_new_report() {
        let report = ProcessReport::new();
        assert_eq!(report.documents_converted(), 0);
        assert_eq!(report.archives_repacked(), 0);
        assert_eq!(report.files_skipped(), 0);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_record_conversion_sums_stats() {
        let mut report = ProcessReport::new();
        for (lines, underlines) in [(2, 1), (3, 0)] {
            report.record_conversion(&ConversionOutcome {
                path: PathBuf::from("doc.docx"),
                stats: TransformStats {
                    dividing_lines: lines,
                    underlines_removed: underlines,
                },
            });
        }
        assert_eq!(report.documents_converted(), 2);
        assert_eq!(report.dividing_lines, 5);
        assert_eq!(report.underlines_removed, 1);
    }

    #[test]
    fn test_record_failure() {
        let mut report = ProcessReport::new();
        report.record_failure(
            PathBuf::from("bad.docx"),
            ConversionError::Stat {
                path: PathBuf::from("bad.docx"),
                source: std::io::Error::other("gone"),
            },
        );
        assert!(report.has_failures());
        assert_eq!(report.failures[0].path, Path::new("bad.docx"));
    }
}

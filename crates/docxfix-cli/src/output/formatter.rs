//! Output formatter trait for CLI results.

use anyhow::Result;
use docxfix_core::ConversionError;
use docxfix_core::ProcessReport;
use docxfix_core::document::ConversionOutcome;
use serde::Serialize;
use std::path::Path;

/// Common output formatter trait
///
/// The per-item methods are called while processing runs; the result method
/// once at the end.
pub trait OutputFormatter {
    /// Directory about to be walked
    fn format_directory(&self, path: &Path);

    /// Document rewritten
    fn format_converted(&self, outcome: &ConversionOutcome);

    /// File of an unsupported type
    fn format_skipped(&self, path: &Path);

    /// Archive replaced by its processed copy
    fn format_repacked(&self, archive: &Path);

    /// Directory child that failed; processing continues
    fn format_failure(&self, path: &Path, error: &ConversionError);

    /// Format the final report
    fn format_process_result(&self, root: &Path, report: &ProcessReport) -> Result<()>;

    /// Format the error that ended the run
    ///
    /// The error is also returned from `main`, so formatters that write to
    /// the terminal leave it alone.
    fn format_fatal(&self, _error: &anyhow::Error) {}
}

/// Generic JSON output structure
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub operation: String,
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn success(operation: impl Into<String>, data: T) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Success,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(operation: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            status: Status::Error,
            data: None,
            error: Some(error.into()),
        }
    }
}

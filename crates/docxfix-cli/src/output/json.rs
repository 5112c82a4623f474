//! JSON output formatter for machine-readable results.
//!
//! Nothing is printed while processing runs; the whole run is described by
//! one document written at the end.

use super::formatter::JsonOutput;
use super::formatter::OutputFormatter;
use anyhow::Result;
use docxfix_core::ConversionError;
use docxfix_core::ProcessReport;
use docxfix_core::document::ConversionOutcome;
use serde::Serialize;
use std::io::Write;
use std::io::{self};
use std::path::Path;
use std::path::PathBuf;

const OPERATION: &str = "process";

pub struct JsonFormatter;

#[derive(Debug, Serialize)]
struct FailureOutput {
    path: String,
    error: String,
    security_violation: bool,
}

#[derive(Debug, Serialize)]
struct ProcessOutput {
    path: String,
    directories_visited: usize,
    documents_converted: usize,
    archives_repacked: usize,
    files_skipped: usize,
    dividing_lines: usize,
    underlines_removed: usize,
    converted: Vec<String>,
    repacked: Vec<String>,
    skipped: Vec<String>,
    failures: Vec<FailureOutput>,
    duration_ms: u128,
}

impl ProcessOutput {
    fn new(root: &Path, report: &ProcessReport) -> Self {
        Self {
            path: root.display().to_string(),
            directories_visited: report.directories_visited,
            documents_converted: report.documents_converted(),
            archives_repacked: report.archives_repacked(),
            files_skipped: report.files_skipped(),
            dividing_lines: report.dividing_lines,
            underlines_removed: report.underlines_removed,
            converted: display_all(&report.converted),
            repacked: display_all(&report.repacked),
            skipped: display_all(&report.skipped),
            failures: report
                .failures
                .iter()
                .map(|failure| FailureOutput {
                    path: failure.path.display().to_string(),
                    error: failure.error.to_string(),
                    security_violation: failure.error.is_security_violation(),
                })
                .collect(),
            duration_ms: report.duration.as_millis(),
        }
    }
}

fn display_all(paths: &[PathBuf]) -> Vec<String> {
    paths.iter().map(|p| p.display().to_string()).collect()
}

impl JsonFormatter {
    fn output<T: Serialize>(value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value)?;
        writeln!(io::stdout(), "{json}")?;
        Ok(())
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_directory(&self, _path: &Path) {}

    fn format_converted(&self, _outcome: &ConversionOutcome) {}

    fn format_skipped(&self, _path: &Path) {}

    fn format_repacked(&self, _archive: &Path) {}

    fn format_failure(&self, _path: &Path, _error: &ConversionError) {}

    fn format_process_result(&self, root: &Path, report: &ProcessReport) -> Result<()> {
        Self::output(&JsonOutput::success(OPERATION, ProcessOutput::new(root, report)))
    }

    fn format_fatal(&self, error: &anyhow::Error) {
        let output = JsonOutput::<()>::error(OPERATION, format!("{error:#}"));
        let _ = Self::output(&output);
    }
}

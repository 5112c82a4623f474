//! Error conversion utilities for CLI.
//!
//! Converts docxfix-core's typed errors (thiserror) into user-friendly
//! contextual errors (anyhow) with actionable guidance.

use anyhow::anyhow;
use docxfix_core::ConversionError;
use docxfix_core::Rollback;
use std::path::Path;

/// Returns guidance for errors the user can act on.
pub fn hint(err: &ConversionError) -> Option<&'static str> {
    match err.root_cause() {
        ConversionError::PathTraversal { .. } => Some(
            "This archive may be malicious. Nothing was written outside the extraction directory.",
        ),
        ConversionError::Open { .. } => {
            Some("The file may be corrupted or not a Word document. It was left unchanged.")
        }
        ConversionError::Write {
            rollback: Rollback::Failed(_),
            ..
        } => Some("The original document could not be restored and may be missing from disk."),
        ConversionError::Stat { .. } => Some("Check that the path exists and is readable."),
        _ => None,
    }
}

/// Converts `ConversionError` to user-friendly anyhow error with context
pub fn convert_process_error(err: ConversionError, path: &Path) -> anyhow::Error {
    if err.is_security_violation()
        && let ConversionError::PathTraversal { entry, dest } = err.root_cause()
    {
        return anyhow!(
            "Security violation while processing '{}': entry '{}' escapes '{}'\n\
             HINT: {}",
            path.display(),
            entry.display(),
            dest.display(),
            hint(&err).unwrap_or_default()
        );
    }

    match hint(&err) {
        Some(hint) => anyhow!("{err}\nHINT: {hint}"),
        None => anyhow::Error::from(err).context(format!("Error processing '{}'", path.display())),
    }
}

/// Adds context to a processing result
pub fn add_process_context<T>(
    result: Result<T, ConversionError>,
    path: &Path,
) -> anyhow::Result<T> {
    result.map_err(|e| convert_process_error(e, path))
}

//! Human-readable output formatter with colors and styling.

use super::formatter::OutputFormatter;
use crate::error::hint;
use anyhow::Result;
use console::Term;
use console::style;
use docxfix_core::ConversionError;
use docxfix_core::ProcessReport;
use docxfix_core::document::ConversionOutcome;
use std::path::Path;

pub struct HumanFormatter {
    verbose: bool,
    quiet: bool,
    use_colors: bool,
    term: Term,
}

impl HumanFormatter {
    pub fn new(verbose: bool, quiet: bool) -> Self {
        Self {
            verbose,
            quiet,
            use_colors: console::colors_enabled(),
            term: Term::stdout(),
        }
    }

    fn format_number(n: usize) -> String {
        let s = n.to_string();
        let mut result = String::with_capacity(s.len() + s.len() / 3);

        for (i, c) in s.chars().enumerate() {
            if i > 0 && (s.len() - i) % 3 == 0 {
                result.push(',');
            }
            result.push(c);
        }

        result
    }

    fn plural(n: usize, one: &'static str, many: &'static str) -> String {
        format!("{} {}", Self::format_number(n), if n == 1 { one } else { many })
    }

    fn line(&self, message: &str) {
        let _ = self.term.write_line(message);
    }

    fn summary_line(report: &ProcessReport) -> String {
        format!(
            "{} converted, {} repacked, {} skipped",
            Self::plural(report.documents_converted(), "document", "documents"),
            Self::plural(report.archives_repacked(), "archive", "archives"),
            Self::plural(report.files_skipped(), "file", "files"),
        )
    }
}

impl OutputFormatter for HumanFormatter {
    fn format_directory(&self, path: &Path) {
        if self.verbose {
            self.line(&format!("Opening directory: {}", path.display()));
        }
    }

    fn format_converted(&self, outcome: &ConversionOutcome) {
        if self.quiet {
            return;
        }

        let message = format!("Successfully converted: {}", outcome.path.display());
        if self.use_colors {
            self.line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            self.line(&message);
        }

        if self.verbose {
            self.line(&format!(
                "  dividing lines: {}, hyperlink underlines: {}",
                outcome.stats.dividing_lines, outcome.stats.underlines_removed
            ));
        }
    }

    fn format_skipped(&self, path: &Path) {
        if self.quiet {
            return;
        }

        let message = format!("Skipping not supported file type: {}", path.display());
        if self.use_colors {
            self.line(&style(message).dim().to_string());
        } else {
            self.line(&message);
        }
    }

    fn format_repacked(&self, archive: &Path) {
        if self.quiet {
            return;
        }

        let message = format!("Repacked archive: {}", archive.display());
        if self.use_colors {
            self.line(&format!("{} {message}", style("✓").green().bold()));
        } else {
            self.line(&message);
        }
    }

    fn format_failure(&self, _path: &Path, error: &ConversionError) {
        // Always show errors, even in quiet mode
        if self.use_colors {
            self.line(&format!("{} {error}", style("ERROR:").red().bold()));
        } else {
            self.line(&format!("ERROR: {error}"));
        }

        if let Some(hint) = hint(error) {
            self.line(&format!("  HINT: {hint}"));
        }
    }

    fn format_process_result(&self, root: &Path, report: &ProcessReport) -> Result<()> {
        if self.quiet {
            return Ok(());
        }

        self.line("");
        if report.has_failures() {
            let header = format!(
                "Finished {} with {}",
                root.display(),
                Self::plural(report.failures.len(), "error", "errors")
            );
            if self.use_colors {
                self.line(&style(header).yellow().bold().to_string());
            } else {
                self.line(&header);
            }
        } else if self.use_colors {
            self.line(&format!(
                "{} Finished {}",
                style("✓").green().bold(),
                root.display()
            ));
        } else {
            self.line(&format!("Finished {}", root.display()));
        }

        self.line(&format!("  {}", Self::summary_line(report)));

        if self.verbose {
            self.line(&format!(
                "  Directories: {}",
                Self::format_number(report.directories_visited)
            ));
            self.line(&format!(
                "  Dividing lines replaced: {}",
                Self::format_number(report.dividing_lines)
            ));
            self.line(&format!(
                "  Hyperlink underlines removed: {}",
                Self::format_number(report.underlines_removed)
            ));
            self.line(&format!("  Duration: {:?}", report.duration));
        }

        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_format_number_small() {
        assert_eq!(HumanFormatter::format_number(0), "0");
        assert_eq!(HumanFormatter::format_number(42), "42");
        assert_eq!(HumanFormatter::format_number(999), "999");
    }

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(HumanFormatter::format_number(1000), "1,000");
        assert_eq!(HumanFormatter::format_number(12_345), "12,345");
        assert_eq!(HumanFormatter::format_number(1_234_567), "1,234,567");
    }

    #[test]
    fn test_plural() {
        assert_eq!(HumanFormatter::plural(1, "file", "files"), "1 file");
        assert_eq!(HumanFormatter::plural(0, "file", "files"), "0 files");
        assert_eq!(HumanFormatter::plural(2000, "file", "files"), "2,000 files");
    }

    #[test]
    fn test_summary_line() {
        let mut report = ProcessReport::new();
        report.converted.push(PathBuf::from("a.docx"));
        report.skipped.push(PathBuf::from("b.txt"));
        report.skipped.push(PathBuf::from("c.txt"));
        assert_eq!(
            HumanFormatter::summary_line(&report),
            "1 document converted, 0 archives repacked, 2 files skipped"
        );
    }
}

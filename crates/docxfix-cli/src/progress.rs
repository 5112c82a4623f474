//! Spinner for CLI processing runs.

use console::Term;
use indicatif::ProgressBar;
use indicatif::ProgressStyle;
use std::path::Path;
use std::time::Duration;

/// Spinner showing the path currently being processed.
///
/// Shown only on a terminal. Clears itself on drop.
pub struct ProcessSpinner {
    bar: ProgressBar,
}

impl ProcessSpinner {
    /// Creates and starts a spinner.
    #[must_use]
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        // Template: "⠋ [12 done] /data/letters/report.docx"
        bar.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} [{pos} done] {wide_msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.enable_steady_tick(Duration::from_millis(100));

        Self { bar }
    }

    /// Checks if we should show the spinner (TTY detection).
    #[must_use]
    pub fn should_show() -> bool {
        Term::stderr().is_term()
    }

    /// Shows `path` as the current item.
    pub fn set_current(&self, path: &Path) {
        self.bar.set_message(path.display().to_string());
    }

    /// Counts one finished item.
    pub fn inc(&self) {
        self.bar.inc(1);
    }

    /// Hides the spinner while `f` writes to the terminal.
    pub fn suspend<F: FnOnce()>(&self, f: F) {
        self.bar.suspend(f);
    }
}

impl Default for ProcessSpinner {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ProcessSpinner {
    fn drop(&mut self) {
        self.bar.finish_and_clear();
    }
}

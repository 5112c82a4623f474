//! Process command implementation.

use crate::cli::Cli;
use crate::error::add_process_context;
use crate::output::OutputFormatter;
use crate::progress::ProcessSpinner;
use anyhow::Result;
use docxfix_core::ConversionError;
use docxfix_core::ProcessObserver;
use docxfix_core::Processor;
use docxfix_core::document::ConversionOutcome;
use std::path::Path;

/// Forwards processing events to the formatter, keeping the spinner out of
/// the way of printed lines.
struct CliObserver<'a> {
    formatter: &'a dyn OutputFormatter,
    spinner: Option<ProcessSpinner>,
}

impl CliObserver<'_> {
    fn emit(&self, path: &Path, print: impl FnOnce()) {
        match &self.spinner {
            Some(spinner) => {
                spinner.suspend(print);
                spinner.set_current(path);
                spinner.inc();
            }
            None => print(),
        }
    }
}

impl ProcessObserver for CliObserver<'_> {
    fn on_directory(&mut self, path: &Path) {
        if let Some(spinner) = &self.spinner {
            spinner.suspend(|| self.formatter.format_directory(path));
            spinner.set_current(path);
        } else {
            self.formatter.format_directory(path);
        }
    }

    fn on_converted(&mut self, outcome: &ConversionOutcome) {
        self.emit(&outcome.path, || self.formatter.format_converted(outcome));
    }

    fn on_skipped(&mut self, path: &Path) {
        self.emit(path, || self.formatter.format_skipped(path));
    }

    fn on_repacked(&mut self, archive: &Path) {
        self.emit(archive, || self.formatter.format_repacked(archive));
    }

    fn on_failure(&mut self, path: &Path, error: &ConversionError) {
        self.emit(path, || self.formatter.format_failure(path, error));
    }
}

pub fn execute(path: &Path, cli: &Cli, formatter: &dyn OutputFormatter) -> Result<()> {
    let processor = Processor::new(cli.process_config());

    // Spinner only for interactive human output
    let spinner =
        (!cli.json && !cli.quiet && ProcessSpinner::should_show()).then(ProcessSpinner::new);
    let mut observer = CliObserver { formatter, spinner };

    let report = add_process_context(processor.process(path, &mut observer), path)?;
    drop(observer);

    formatter.format_process_result(path, &report)?;

    Ok(())
}

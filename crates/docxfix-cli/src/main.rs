//! docxfix CLI - rewrites DOCX markup in files, directories and ZIP archives.

mod cli;
mod commands;
mod error;
mod logging;
mod output;
mod progress;

use anyhow::Result;
use clap::CommandFactory;
use clap::Parser;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    let [path] = cli.paths.as_slice() else {
        println!("{}", cli::USAGE_MESSAGE);
        println!("{}", cli::Cli::command().render_usage());
        return Ok(());
    };

    logging::init(cli.verbose);

    let formatter = output::formatter_for(&cli);
    let result = commands::process::execute(path, &cli, &*formatter);
    if let Err(err) = &result {
        formatter.format_fatal(err);
    }
    result
}

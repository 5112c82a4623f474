//! CLI argument parsing using clap.

use clap::Parser;
use docxfix_core::ProcessConfig;
use docxfix_core::config::ExtensionRule;
use docxfix_core::config::ExtractionLayout;
use std::path::PathBuf;

/// Message printed when the number of positional arguments is wrong.
pub const USAGE_MESSAGE: &str = "Please provide one argument: path to file or directory";

#[derive(Parser)]
#[command(name = "docxfix")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// File or directory to process; `.zip` archives are processed inside
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output a JSON summary
    #[arg(short, long)]
    pub json: bool,

    /// Classify files by the text after the last dot instead of the first
    #[arg(long)]
    pub last_dot: bool,

    /// Unpack archives into a temporary directory and replace them in place
    #[arg(long)]
    pub staged: bool,

    /// Compression level for repacked archives (0 stores entries)
    #[arg(short = 'l', long, value_parser = clap::value_parser!(u8).range(0..=9))]
    pub compression_level: Option<u8>,
}

impl Cli {
    /// Builds the processing configuration from the flags.
    pub fn process_config(&self) -> ProcessConfig {
        let mut config = ProcessConfig::default();
        if self.last_dot {
            config = config.with_extension_rule(ExtensionRule::LastDot);
        }
        if self.staged {
            config = config.with_extraction_layout(ExtractionLayout::Staged);
        }
        if let Some(level) = self.compression_level {
            config = config.with_compression_level(level);
        }
        config
    }
}

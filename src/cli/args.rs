//! CLI argument definitions using clap
//!
//! Commands:
//! - surveycut validate --data <dir> --batch <file>
//! - surveycut execute --data <dir> --batch <file> [--config <file>] [--format json|csv]

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// surveycut - deterministic survey cut engine
#[derive(Parser, Debug)]
#[command(name = "surveycut")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate a batch of segments and cuts against the catalog
    Validate {
        /// Data directory holding questions.json and responses.json
        #[arg(long)]
        data: PathBuf,

        /// Batch file with segments and cuts
        #[arg(long)]
        batch: PathBuf,
    },

    /// Execute a batch and print the results
    Execute {
        /// Data directory holding questions.json and responses.json
        #[arg(long)]
        data: PathBuf,

        /// Batch file with segments and cuts
        #[arg(long)]
        batch: PathBuf,

        /// Engine configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

/// Output format of `execute`
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Csv,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

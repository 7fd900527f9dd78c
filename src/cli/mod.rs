//! CLI module for surveycut
//!
//! Provides command-line interface for:
//! - validate: Check a batch against the question catalog
//! - execute: Run a batch and print tables as JSON or CSV

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command, OutputFormat};
pub use commands::{execute, render_csv, run, run_command, validate, validation_report};
pub use errors::{CliError, CliErrorCode, CliResult};
pub use io::{error_envelope, ok_envelope, write_error, write_response, write_text};

//! surveycut CLI entry point
//!
//! Parses arguments and dispatches via `cli::run`. Exit codes:
//! - 0: every segment and cut succeeded
//! - 1: fatal error (config, load, I/O)
//! - 2: the batch ran but some segments or cuts failed

use surveycut::cli;

fn main() {
    match cli::run() {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    }
}

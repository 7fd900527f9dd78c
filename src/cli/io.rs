//! Output handling for the CLI
//!
//! - JSON output: a single `{status, ...}` object on stdout
//! - CSV output: one block per table on stdout
//! - Logs never go to stdout

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

/// Success envelope
pub fn ok_envelope(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

/// Error envelope
pub fn error_envelope(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&ok_envelope(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_value(&error_envelope(code, message))
}

/// Write raw text to stdout
pub fn write_text(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;

    Ok(())
}

fn write_value(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        let ok = ok_envelope(json!({"tables": []}));
        assert_eq!(ok["status"], "ok");
        assert!(ok["data"]["tables"].is_array());

        let err = error_envelope("SURVEYCUT_CLI_IO_ERROR", "boom");
        assert_eq!(err, json!({"status": "error", "code": "SURVEYCUT_CLI_IO_ERROR", "message": "boom"}));
    }
}

//! Validation and formatting of generated Go source.

use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};

use fake_parsers::GoParser;

use crate::error::FormatError;

/// Check that `source` parses, then run it through `gofmt` when asked to.
///
/// A parse failure means the emitter produced broken code. A missing `gofmt`
/// binary leaves the source as emitted.
pub fn format_source(source: String, use_gofmt: bool) -> Result<String, FormatError> {
    GoParser::new()
        .check_syntax(&source)
        .map_err(FormatError::Syntax)?;
    if !use_gofmt {
        return Ok(source);
    }
    match gofmt(&source) {
        Err(FormatError::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!("gofmt not found on PATH, keeping emitted layout");
            Ok(source)
        }
        other => other,
    }
}

fn gofmt(source: &str) -> Result<String, FormatError> {
    let mut child = Command::new("gofmt")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()?;
    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(source.as_bytes())?;
    }
    let output = child.wait_with_output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(FormatError::Gofmt(stderr.trim().to_string()));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

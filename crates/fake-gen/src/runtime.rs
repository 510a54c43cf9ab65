//! Go support code shared by every mock in an output directory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use fake_core::paths::{GENERATED_HEADER, RUNTIME_FILENAME};

const SOURCE: &str = include_str!("runtime/mock.go");

/// Runtime source declared in `package`.
pub fn runtime_source(package: &str) -> String {
    let body = SOURCE.strip_prefix("package mocks\n").unwrap_or(SOURCE);
    format!("{GENERATED_HEADER}package {package}\n{body}")
}

/// Write the runtime next to a mock in `dir` unless it is already current.
/// Returns the path when the file was (re)written.
pub fn ensure_runtime(dir: &Path, package: &str) -> io::Result<Option<PathBuf>> {
    let path = dir.join(RUNTIME_FILENAME);
    let source = runtime_source(package);
    if fs::read_to_string(&path).is_ok_and(|existing| existing == source) {
        return Ok(None);
    }
    fs::create_dir_all(dir)?;
    fs::write(&path, source)?;
    Ok(Some(path))
}

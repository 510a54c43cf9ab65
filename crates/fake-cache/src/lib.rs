//! Incremental build cache for fake.
//!
//! Each source file is keyed by two digests: its own content and a fingerprint
//! of the module versions it imports. Both are kept in `fake.lock.json` at the
//! root of the output directory; a file is regenerated when either changes.

pub mod dependencies;
pub mod lockfile;
pub mod uncached;

use std::path::PathBuf;

use fake_parsers::{ModuleError, ParseError, WalkError};

pub use dependencies::Dependencies;
pub use lockfile::{read_lock_file, write_lock_file, LockEntry, LockHandle};
pub use uncached::{get_uncached_files, remove_mock, LockSet};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("no input directories given")]
    NoInputs,
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error("listing go files: {0}")]
    Walk(#[from] WalkError),
    #[error("reading imports: {0}")]
    Parse(#[from] ParseError),
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid lock file {path}: {source}")]
    LockFile {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl CacheError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| CacheError::Io { path, source }
    }
}

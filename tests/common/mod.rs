/// Shared helpers for the fake integration tests.
///
/// Import from any integration test file with:
///   `#[path = "common/mod.rs"] mod common;`
use std::fs;
use std::path::{Path, PathBuf};

use fake_gen::RunOptions;
use tempfile::TempDir;

pub const MODULE: &str = "example.com/app";

/// A Go module in a temp directory. Hold the value to keep the directory alive.
pub struct GoProject {
    _dir: TempDir,
    pub root: PathBuf,
}

#[allow(dead_code)]
impl GoProject {
    pub fn new() -> Self {
        Self::with_go_mod(&format!("module {MODULE}\n\ngo 1.22\n"))
    }

    pub fn with_go_mod(go_mod: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let root = dir.path().canonicalize().unwrap();
        fs::write(root.join("go.mod"), go_mod).unwrap();
        Self { _dir: dir, root }
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn remove(&self, rel: &str) {
        fs::remove_file(self.root.join(rel)).unwrap();
    }

    pub fn output(&self) -> PathBuf {
        self.root.join("mocks")
    }

    /// Options for a run over the whole module, without gofmt.
    pub fn options(&self) -> RunOptions {
        RunOptions {
            inputs: vec![self.root.clone()],
            output: self.output(),
            ignore: vec![],
            package_name: "mocks".into(),
            gofmt: false,
        }
    }

    pub fn read_mock(&self, rel: &str) -> String {
        read(&self.output().join(rel))
    }
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

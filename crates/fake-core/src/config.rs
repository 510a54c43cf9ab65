//! Configuration file loading for fake.
//!
//! Reads `.fake.json` from the project directory. Falls back to defaults when
//! the file is missing or cannot be parsed; command-line flags override it.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub const CONFIG_FILENAME: &str = ".fake.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FakeConfig {
    /// Directories scanned recursively for Go sources.
    #[serde(default = "default_inputs")]
    pub inputs: Vec<PathBuf>,
    /// Root directory of generated mocks and of `fake.lock.json`.
    #[serde(default = "default_output")]
    pub output: PathBuf,
    /// Package clause written into every generated file.
    #[serde(default = "default_package_name")]
    pub package_name: String,
    /// Path prefixes or glob patterns excluded from scanning.
    #[serde(default)]
    pub ignore: Vec<String>,
    /// Pipe generated files through `gofmt` when it is on PATH.
    #[serde(default = "default_true")]
    pub gofmt: bool,
}

fn default_inputs() -> Vec<PathBuf> {
    vec![PathBuf::from(".")]
}
fn default_output() -> PathBuf {
    PathBuf::from("mocks")
}
fn default_package_name() -> String {
    "mocks".to_string()
}
fn default_true() -> bool {
    true
}

impl Default for FakeConfig {
    fn default() -> Self {
        Self {
            inputs: default_inputs(),
            output: default_output(),
            package_name: default_package_name(),
            ignore: vec![],
            gofmt: true,
        }
    }
}

impl FakeConfig {
    /// Load `.fake.json` from `dir`.
    /// Returns defaults if the file doesn't exist or can't be parsed.
    pub fn load(dir: &Path) -> Self {
        let config_path = dir.join(CONFIG_FILENAME);
        let content = match std::fs::read_to_string(&config_path) {
            Ok(c) => c,
            Err(_) => return Self::default(),
        };
        match serde_json::from_str(&content) {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::warn!(
                    "failed to parse {}: {}, using defaults",
                    config_path.display(),
                    e
                );
                Self::default()
            }
        }
    }
}

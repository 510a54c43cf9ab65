use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use fake_core::paths::LOCK_FILENAME;

use crate::dependencies::Dependencies;
use crate::CacheError;

/// Persisted digests of one source file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockEntry {
    pub hash: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dependencies: String,
}

#[derive(Debug)]
enum State {
    /// Not in the previous lock file; digests are computed after generation.
    Unhashed(Arc<Dependencies>),
    Hashed { entry: LockEntry, changed: bool },
}

/// Per-file cache decision handed to the generation pipeline.
#[derive(Debug)]
pub struct LockHandle {
    path: PathBuf,
    state: State,
    exists: bool,
}

impl LockHandle {
    pub fn unhashed(path: PathBuf, dependencies: Arc<Dependencies>) -> Self {
        Self {
            path,
            state: State::Unhashed(dependencies),
            exists: true,
        }
    }

    pub fn hashed(path: PathBuf, entry: LockEntry, changed: bool) -> Self {
        Self {
            path,
            state: State::Hashed { entry, changed },
            exists: true,
        }
    }

    /// Whether the file must be regenerated.
    pub fn changed(&self) -> bool {
        match &self.state {
            State::Unhashed(_) => true,
            State::Hashed { changed, .. } => *changed,
        }
    }

    /// Whether the entry is written to the next lock file.
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Drop the entry from the next lock file so the file is retried.
    pub fn discard(&mut self) {
        self.exists = false;
    }

    pub fn absolute_path(&self) -> &Path {
        &self.path
    }

    pub fn compute(&self) -> Result<LockEntry, CacheError> {
        match &self.state {
            State::Unhashed(dependencies) => dependencies.hash_file(&self.path),
            State::Hashed { entry, .. } => Ok(entry.clone()),
        }
    }
}

/// Reads `path`; a missing file is an empty cache.
pub fn read_lock_file(path: &Path) -> Result<BTreeMap<String, LockEntry>, CacheError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(err) => return Err(CacheError::io(path)(err)),
    };
    serde_json::from_str(&data).map_err(|source| CacheError::LockFile {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the entries of every surviving handle to `<output>/fake.lock.json`.
pub fn write_lock_file(
    output: &Path,
    handles: &BTreeMap<String, LockHandle>,
) -> Result<(), CacheError> {
    let mut entries = BTreeMap::new();
    for (rel_path, handle) in handles {
        if handle.exists() {
            entries.insert(rel_path.as_str(), handle.compute()?);
        }
    }

    let mut data = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
    let mut serializer = serde_json::Serializer::with_formatter(&mut data, formatter);
    entries
        .serialize(&mut serializer)
        .map_err(|source| CacheError::LockFile {
            path: output.join(LOCK_FILENAME),
            source,
        })?;
    data.push(b'\n');

    fs::create_dir_all(output).map_err(CacheError::io(output))?;
    let path = output.join(LOCK_FILENAME);
    fs::write(&path, data).map_err(CacheError::io(&path))?;
    tracing::debug!("wrote {} lock entries to {}", entries.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(hash: &str) -> LockEntry {
        LockEntry {
            hash: hash.into(),
            dependencies: String::new(),
        }
    }

    #[test]
    fn test_missing_lock_file_is_empty() {
        let entries = read_lock_file(Path::new("/nonexistent/fake.lock.json")).unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_invalid_lock_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(LOCK_FILENAME);
        fs::write(&path, "[1, 2").unwrap();
        assert!(matches!(
            read_lock_file(&path),
            Err(CacheError::LockFile { .. })
        ));
    }

    #[test]
    fn test_write_skips_discarded_handles() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("mocks");
        let mut handles = BTreeMap::new();
        handles.insert(
            "a.go".to_string(),
            LockHandle::hashed(PathBuf::from("/src/a.go"), entry("AAA"), false),
        );
        let mut failed = LockHandle::hashed(PathBuf::from("/src/b.go"), entry("BBB"), true);
        failed.discard();
        handles.insert("b.go".to_string(), failed);

        write_lock_file(&output, &handles).unwrap();
        let written = read_lock_file(&output.join(LOCK_FILENAME)).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written["a.go"], entry("AAA"));
    }

    #[test]
    fn test_empty_dependencies_not_serialized() {
        let json = serde_json::to_string(&entry("AAA")).unwrap();
        assert_eq!(json, r#"{"hash":"AAA"}"#);
        let parsed: LockEntry = serde_json::from_str(r#"{"hash":"X","dependencies":"Y"}"#).unwrap();
        assert_eq!(parsed.dependencies, "Y");
    }

    #[test]
    fn test_handle_flags() {
        let unchanged = LockHandle::hashed(PathBuf::from("a.go"), entry("A"), false);
        assert!(!unchanged.changed());
        assert!(unchanged.exists());
        assert_eq!(unchanged.compute().unwrap(), entry("A"));
    }
}

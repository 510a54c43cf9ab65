use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fake_core::paths::{is_generated, mock_file_path, LOCK_FILENAME, RUNTIME_FILENAME};
use fake_parsers::{GoFileWalker, GoModule};

use crate::dependencies::Dependencies;
use crate::lockfile::{read_lock_file, write_lock_file, LockHandle};
use crate::CacheError;

/// Outcome of comparing the source tree against the previous lock file.
#[derive(Debug)]
pub struct LockSet {
    pub module: GoModule,
    pub output: PathBuf,
    /// Source path relative to the module root → cache decision.
    pub handles: BTreeMap<String, LockHandle>,
    /// Mocks deleted because their source no longer exists.
    pub removed: Vec<PathBuf>,
}

impl LockSet {
    pub fn changed(&self) -> impl Iterator<Item = (&String, &LockHandle)> {
        self.handles.iter().filter(|(_, h)| h.changed())
    }

    pub fn write(&self) -> Result<(), CacheError> {
        write_lock_file(&self.output, &self.handles)
    }
}

/// Decide which Go files under `inputs` need their mocks regenerated.
///
/// The module is the one enclosing the first input. Files already in the lock
/// file are hashed now; new files are hashed after generation. Entries whose
/// source disappeared have their mock deleted.
pub fn get_uncached_files(
    inputs: &[PathBuf],
    ignore: &[String],
    output: &Path,
) -> Result<LockSet, CacheError> {
    let first = inputs.first().ok_or(CacheError::NoInputs)?;
    let module = GoModule::find(first)?;
    let dependencies = Arc::new(Dependencies::load(&module)?);
    let previous = read_lock_file(&output.join(LOCK_FILENAME))?;

    let mut ignore = ignore.to_vec();
    ignore.push(output.to_string_lossy().to_string());
    let files = GoFileWalker::new(inputs, &ignore)?.walk()?;

    let mut handles = BTreeMap::new();
    for path in files {
        let Some(rel_path) = relative_to(&module.root, &path) else {
            tracing::warn!("{} is outside module {}, skipping", path.display(), module.path);
            continue;
        };
        let handle = match previous.get(&rel_path) {
            None => LockHandle::unhashed(path, Arc::clone(&dependencies)),
            Some(cached) => {
                let current = dependencies.hash_file(&path)?;
                let changed = current != *cached;
                if !changed {
                    tracing::debug!("{rel_path} is up to date");
                }
                LockHandle::hashed(path, current, changed)
            }
        };
        handles.insert(rel_path, handle);
    }

    let mut removed = Vec::new();
    for rel_path in previous.keys() {
        if handles.contains_key(rel_path) {
            continue;
        }
        if let Some(mock) = remove_mock(output, Path::new(rel_path))? {
            tracing::info!("removing legacy mock from {}", mock.display());
            removed.push(mock);
        }
    }

    let changed = handles.values().filter(|h| h.changed()).count();
    tracing::info!(
        "{} go files found, {} need generation",
        handles.len(),
        changed
    );

    Ok(LockSet {
        module,
        output: output.to_path_buf(),
        handles,
        removed,
    })
}

/// Delete the mock generated for `rel_source`, and the runtime file of its
/// directory once no other mock is left there.
pub fn remove_mock(output: &Path, rel_source: &Path) -> Result<Option<PathBuf>, CacheError> {
    let mock = mock_file_path(output, rel_source, None);
    if !mock.is_file() {
        return Ok(None);
    }
    fs::remove_file(&mock).map_err(CacheError::io(&mock))?;

    if let Some(dir) = mock.parent() {
        let runtime = dir.join(RUNTIME_FILENAME);
        if runtime.is_file() && !has_other_mocks(dir)? {
            fs::remove_file(&runtime).map_err(CacheError::io(&runtime))?;
            tracing::debug!("removed {}", runtime.display());
        }
    }
    Ok(Some(mock))
}

fn has_other_mocks(dir: &Path) -> Result<bool, CacheError> {
    let entries = fs::read_dir(dir).map_err(CacheError::io(dir))?;
    Ok(entries.filter_map(Result::ok).any(|entry| {
        let path = entry.path();
        is_generated(&path) && path.file_name().is_some_and(|n| n != RUNTIME_FILENAME)
    }))
}

/// Module-relative path with `/` separators.
fn relative_to(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    Some(parts.join("/"))
}

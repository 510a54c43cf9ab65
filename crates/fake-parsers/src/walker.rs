use std::fs;
use std::path::{Path, PathBuf};

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;

use fake_core::paths::is_generated;

#[derive(Debug, thiserror::Error)]
pub enum WalkError {
    #[error("input directory {0} does not exist")]
    MissingRoot(PathBuf),
    #[error("invalid ignore pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        source: globset::Error,
    },
}

/// Lists the Go sources mocks can be generated from.
///
/// Test files, generated files and anything under an ignore entry are
/// skipped. Entries containing glob metacharacters are matched as globs
/// against the path relative to the walk root; all others are path prefixes,
/// relative to the walk root or to the working directory. Returned paths are
/// canonical.
pub struct GoFileWalker {
    roots: Vec<PathBuf>,
    prefixes: Vec<PathBuf>,
    globs: GlobSet,
}

impl GoFileWalker {
    pub fn new(roots: &[PathBuf], ignore: &[String]) -> Result<Self, WalkError> {
        let mut prefixes = Vec::new();
        let mut builder = GlobSetBuilder::new();
        for entry in ignore {
            if entry.contains(['*', '?', '[', '{']) {
                let glob = Glob::new(entry).map_err(|source| WalkError::InvalidPattern {
                    pattern: entry.clone(),
                    source,
                })?;
                builder.add(glob);
            } else {
                let prefix = PathBuf::from(entry.trim_end_matches('/'));
                prefixes.push(absolutize(&prefix));
                prefixes.push(prefix);
            }
        }
        let globs = builder.build().map_err(|source| WalkError::InvalidPattern {
            pattern: ignore.join(","),
            source,
        })?;
        Ok(Self {
            roots: roots.to_vec(),
            prefixes,
            globs,
        })
    }

    pub fn walk(&self) -> Result<Vec<PathBuf>, WalkError> {
        let mut files = Vec::new();
        for root in &self.roots {
            let root = match fs::canonicalize(root) {
                Ok(dir) if dir.is_dir() => dir,
                _ => return Err(WalkError::MissingRoot(root.clone())),
            };
            let walker = WalkBuilder::new(&root)
                .hidden(true)
                .git_ignore(true)
                .git_global(false)
                .git_exclude(true)
                .add_custom_ignore_filename(".fakeignore")
                .filter_entry(|entry| !is_skipped_dir(entry.path(), entry.depth()))
                .build();

            for result in walker {
                let entry = match result {
                    Ok(e) => e,
                    Err(err) => {
                        tracing::debug!("skipping unreadable entry: {err}");
                        continue;
                    }
                };
                if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                    continue;
                }
                let path = entry.into_path();
                if is_go_source(&path) && !self.is_ignored(&root, &path) {
                    files.push(path);
                }
            }
        }
        files.sort();
        files.dedup();
        Ok(files)
    }

    fn is_ignored(&self, root: &Path, path: &Path) -> bool {
        let relative = path.strip_prefix(root).unwrap_or(path);
        if self.globs.is_match(relative) || self.globs.is_match(path) {
            return true;
        }
        self.prefixes
            .iter()
            .any(|prefix| path.starts_with(prefix) || relative.starts_with(prefix))
    }
}

/// Ignore prefixes are compared against canonical walk results.
fn absolutize(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    match std::env::current_dir() {
        Ok(cwd) if path.is_relative() => cwd.join(path),
        _ => path.to_path_buf(),
    }
}

/// Directories the go tool never builds from.
fn is_skipped_dir(path: &Path, depth: usize) -> bool {
    if depth == 0 || !path.is_dir() {
        return false;
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n == "testdata" || n == "vendor" || n.starts_with('_'))
}

fn is_go_source(path: &Path) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    name.ends_with(".go") && !name.ends_with("_test.go") && !is_generated(path)
}

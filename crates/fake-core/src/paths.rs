//! Naming conventions for generated files.

use std::path::{Component, Path, PathBuf};

/// Suffix of every file fake writes.
pub const GENERATED_SUFFIX: &str = ".gen.go";
/// First lines of every file fake writes, ahead of the package clause.
pub const GENERATED_HEADER: &str = "// Code generated by fake. DO NOT EDIT.\n\n";
/// Lock file kept at the root of the output directory.
pub const LOCK_FILENAME: &str = "fake.lock.json";
/// Call-expectation runtime written next to the mocks of each package.
pub const RUNTIME_FILENAME: &str = "fake_runtime.gen.go";

/// Whether `path` names a file produced by a generator.
pub fn is_generated(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(GENERATED_SUFFIX))
}

/// Mirror a source directory (relative to the module root) into the output tree.
///
/// `internal` components are renamed to `internal_` so that the mocks package
/// is not itself treated as an internal package.
pub fn mirror_dir(rel_dir: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in rel_dir.components() {
        match component {
            Component::Normal(name) if name == "internal" => out.push("internal_"),
            Component::Normal(name) => out.push(name),
            _ => {}
        }
    }
    out
}

/// Path of the mock generated for `rel_source` (relative to the module root).
///
/// `store/repo.go` becomes `<output>/store/repo.gen.go`, or
/// `<output>/store/repo.Repository.gen.go` when a single interface is targeted.
pub fn mock_file_path(output: &Path, rel_source: &Path, interface: Option<&str>) -> PathBuf {
    let stem = rel_source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let file_name = match interface {
        Some(name) => format!("{stem}.{name}{GENERATED_SUFFIX}"),
        None => format!("{stem}{GENERATED_SUFFIX}"),
    };
    let dir = rel_source.parent().map(mirror_dir).unwrap_or_default();
    output.join(dir).join(file_name)
}

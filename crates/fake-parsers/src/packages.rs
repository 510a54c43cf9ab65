//! Import path → on-disk package lookup.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fake_core::paths::is_generated;

use crate::gomod::GoModule;

/// A Go package as seen from the main module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageInfo {
    /// Declared package name, or a name inferred from the import path when
    /// the sources are unavailable.
    pub name: String,
    /// Import path.
    pub path: String,
    /// Source directory, when found.
    pub dir: Option<PathBuf>,
    /// Non-test `.go` files, sorted.
    pub files: Vec<PathBuf>,
}

/// Finds package sources for the main module.
///
/// Lookups go through, in order: the main module tree, local `replace`
/// targets, `vendor/`, the module cache, and `$GOROOT/src`. Results are cached
/// per import path for the lifetime of the locator.
pub struct PackageLocator {
    module: GoModule,
    mod_cache: Option<PathBuf>,
    goroot: Option<PathBuf>,
    cache: HashMap<String, Arc<PackageInfo>>,
}

impl PackageLocator {
    /// Locator using the module cache and GOROOT from the environment.
    pub fn new(module: GoModule) -> Self {
        Self::with_search_roots(module, default_mod_cache(), default_goroot())
    }

    pub fn with_search_roots(
        module: GoModule,
        mod_cache: Option<PathBuf>,
        goroot: Option<PathBuf>,
    ) -> Self {
        Self {
            module,
            mod_cache,
            goroot,
            cache: HashMap::new(),
        }
    }

    pub fn module(&self) -> &GoModule {
        &self.module
    }

    pub fn locate(&mut self, import_path: &str) -> Arc<PackageInfo> {
        if let Some(info) = self.cache.get(import_path) {
            return Arc::clone(info);
        }
        let info = Arc::new(self.lookup(import_path));
        match &info.dir {
            Some(dir) => tracing::debug!("package {import_path} found in {}", dir.display()),
            None => tracing::debug!(
                "package {import_path} not found on disk, assuming name `{}`",
                info.name
            ),
        }
        self.cache.insert(import_path.to_string(), Arc::clone(&info));
        info
    }

    /// Package of the directory `dir` inside the main module.
    pub fn locate_dir(&mut self, dir: &Path) -> Option<Arc<PackageInfo>> {
        let import_path = self.module.package_path_for(dir)?;
        Some(self.locate(&import_path))
    }

    fn lookup(&self, import_path: &str) -> PackageInfo {
        let dir = self.candidates(import_path).into_iter().find_map(|dir| {
            let files = list_package_files(&dir);
            (!files.is_empty()).then_some((dir, files))
        });
        match dir {
            Some((dir, files)) => {
                let name = files
                    .iter()
                    .find_map(|f| read_package_clause(f))
                    .unwrap_or_else(|| infer_package_name(import_path));
                PackageInfo {
                    name,
                    path: import_path.to_string(),
                    dir: Some(dir),
                    files,
                }
            }
            None => PackageInfo {
                name: infer_package_name(import_path),
                path: import_path.to_string(),
                dir: None,
                files: Vec::new(),
            },
        }
    }

    fn candidates(&self, import_path: &str) -> Vec<PathBuf> {
        let module = &self.module;
        let mut dirs = Vec::new();

        if module.owns(import_path) {
            dirs.push(join_import(&module.root, subpath(import_path, &module.path)));
        }

        if let Some((replaced, replacement)) = module.replacement_for(import_path) {
            let rest = subpath(import_path, replaced);
            if replacement.is_local() {
                dirs.push(join_import(&module.root.join(&replacement.path), rest));
            } else if let (Some(cache), Some(version)) = (&self.mod_cache, &replacement.version) {
                let base = cache.join(format!(
                    "{}@{version}",
                    escape_module_path(&replacement.path)
                ));
                dirs.push(join_import(&base, rest));
            }
        }

        dirs.push(join_import(&module.root.join("vendor"), import_path));

        if let (Some(cache), Some((required, version))) =
            (&self.mod_cache, module.requirement_for(import_path))
        {
            let base = cache.join(format!("{}@{version}", escape_module_path(required)));
            dirs.push(join_import(&base, subpath(import_path, required)));
        }

        if let Some(goroot) = &self.goroot {
            dirs.push(join_import(&goroot.join("src"), import_path));
        }
        dirs
    }
}

fn subpath<'a>(import_path: &'a str, module: &str) -> &'a str {
    import_path
        .strip_prefix(module)
        .unwrap_or("")
        .trim_start_matches('/')
}

fn join_import(base: &Path, rest: &str) -> PathBuf {
    rest.split('/')
        .filter(|s| !s.is_empty())
        .fold(base.to_path_buf(), |dir, part| dir.join(part))
}

fn default_mod_cache() -> Option<PathBuf> {
    if let Some(dir) = std::env::var_os("GOMODCACHE").filter(|v| !v.is_empty()) {
        return Some(PathBuf::from(dir));
    }
    if let Some(gopath) = std::env::var_os("GOPATH").filter(|v| !v.is_empty()) {
        let first = std::env::split_paths(&gopath).next()?;
        return Some(first.join("pkg").join("mod"));
    }
    let home = std::env::var_os("HOME").or_else(|| std::env::var_os("USERPROFILE"))?;
    Some(PathBuf::from(home).join("go").join("pkg").join("mod"))
}

fn default_goroot() -> Option<PathBuf> {
    std::env::var_os("GOROOT")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Module cache directories escape upper-case letters as `!` + lower case.
pub fn escape_module_path(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    for c in path.chars() {
        if c.is_ascii_uppercase() {
            out.push('!');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Non-test, non-generated `.go` files of a package directory, sorted.
pub fn list_package_files(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file())
        .filter(|p| {
            p.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(".go") && !n.ends_with("_test.go"))
        })
        .filter(|p| !is_generated(p))
        .collect();
    files.sort();
    files
}

/// Name from the `package` clause of a Go file, without a full parse.
pub fn read_package_clause(file: &Path) -> Option<String> {
    let content = fs::read_to_string(file).ok()?;
    let mut in_block_comment = false;
    for line in content.lines() {
        let mut line = line.trim();
        if in_block_comment {
            match line.find("*/") {
                Some(end) => {
                    in_block_comment = false;
                    line = line[end + 2..].trim();
                }
                None => continue,
            }
        }
        if line.starts_with("/*") && !line.contains("*/") {
            in_block_comment = true;
            continue;
        }
        if let Some(rest) = line.strip_prefix("package ") {
            let name = rest.split(|c: char| c.is_whitespace() || c == ';' || c == '/').next()?;
            return (!name.is_empty()).then(|| name.to_string());
        }
    }
    None
}

/// Best guess at a package name from its import path.
///
/// `github.com/org/go-thing/v2` → `thing`, `gopkg.in/yaml.v3` → `yaml`,
/// `example.com/my-lib` → `my_lib`.
pub fn infer_package_name(import_path: &str) -> String {
    let parts: Vec<&str> = import_path.split('/').filter(|p| !p.is_empty()).collect();
    let mut last = parts.last().copied().unwrap_or(import_path);
    if parts.len() > 1 && is_major_version(last) {
        last = parts[parts.len() - 2];
    }
    if let Some((base, version)) = last.rsplit_once('.') {
        if is_major_version(version) {
            last = base;
        }
    }
    let last = last.strip_prefix("go-").unwrap_or(last);
    last.replace(['-', '.'], "_")
}

fn is_major_version(segment: &str) -> bool {
    segment
        .strip_prefix('v')
        .is_some_and(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::gomod::Replacement;

    fn module(root: &Path) -> GoModule {
        GoModule {
            root: root.to_path_buf(),
            path: "example.com/app".into(),
            go_version: Some("1.22".into()),
            requires: BTreeMap::from([(
                "github.com/Acme/Kit".to_string(),
                "v1.2.0".to_string(),
            )]),
            replaces: BTreeMap::from([(
                "example.com/shared".to_string(),
                Replacement {
                    path: "../shared".into(),
                    version: None,
                },
            )]),
        }
    }

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_infer_package_name() {
        assert_eq!(infer_package_name("context"), "context");
        assert_eq!(infer_package_name("net/http"), "http");
        assert_eq!(infer_package_name("github.com/org/go-thing/v2"), "thing");
        assert_eq!(infer_package_name("gopkg.in/yaml.v3"), "yaml");
        assert_eq!(infer_package_name("example.com/my-lib"), "my_lib");
    }

    #[test]
    fn test_escape_module_path() {
        assert_eq!(escape_module_path("github.com/Acme/Kit"), "github.com/!acme/!kit");
    }

    #[test]
    fn test_read_package_clause() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("a.go");
        write(
            &file,
            "// Copyright\n/*\n package nope\n*/\n//go:build linux\n\npackage store // docs\n",
        );
        assert_eq!(read_package_clause(&file).as_deref(), Some("store"));
    }

    #[test]
    fn test_locate_in_main_module() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("store/repo.go"), "package storage\n");
        write(&dir.path().join("store/repo_test.go"), "package storage_test\n");

        let mut locator = PackageLocator::with_search_roots(module(dir.path()), None, None);
        let info = locator.locate("example.com/app/store");
        assert_eq!(info.name, "storage");
        assert_eq!(info.files, vec![dir.path().join("store/repo.go")]);
    }

    #[test]
    fn test_locate_local_replace() {
        let dir = tempfile::tempdir().unwrap();
        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        write(&dir.path().join("shared/util/util.go"), "package util\n");

        let mut locator = PackageLocator::with_search_roots(module(&app), None, None);
        let info = locator.locate("example.com/shared/util");
        assert_eq!(info.name, "util");
        assert!(info.dir.is_some());
    }

    #[test]
    fn test_locate_module_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = dir.path().join("modcache");
        write(
            &cache.join("github.com/!acme/!kit@v1.2.0/log/log.go"),
            "package logging\n",
        );

        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        let mut locator = PackageLocator::with_search_roots(module(&app), Some(cache), None);
        let info = locator.locate("github.com/Acme/Kit/log");
        assert_eq!(info.name, "logging");
    }

    #[test]
    fn test_locate_goroot_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        let goroot = dir.path().join("goroot");
        write(&goroot.join("src/context/context.go"), "package context\n");

        let app = dir.path().join("app");
        fs::create_dir_all(&app).unwrap();
        let mut locator =
            PackageLocator::with_search_roots(module(&app), None, Some(goroot.clone()));
        assert!(locator.locate("context").dir.is_some());

        let missing = locator.locate("github.com/nowhere/go-pkg");
        assert_eq!(missing.name, "pkg");
        assert!(missing.dir.is_none());
    }

    #[test]
    fn test_locate_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        write(&dir.path().join("svc/svc.go"), "package svc\n");
        let mut locator = PackageLocator::with_search_roots(module(dir.path()), None, None);
        let first = locator.locate("example.com/app/svc");
        fs::remove_dir_all(dir.path().join("svc")).unwrap();
        let second = locator.locate("example.com/app/svc");
        assert!(Arc::ptr_eq(&first, &second));
    }
}

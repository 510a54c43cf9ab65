//! `go.mod` reader.
//!
//! Only the directives the generator needs are interpreted: `module`, `go`,
//! `require` and `replace`, each in single-line or block form. Everything
//! else (`exclude`, `retract`, `toolchain`, ...) is skipped.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const GO_MOD: &str = "go.mod";
pub const GO_SUM: &str = "go.sum";

#[derive(Debug, thiserror::Error)]
pub enum ModuleError {
    #[error("no go.mod found in {0} or any parent directory")]
    NotFound(PathBuf),
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path}:{line}: {message}")]
    Malformed {
        path: PathBuf,
        line: usize,
        message: String,
    },
    #[error("{0} has no module directive")]
    MissingModulePath(PathBuf),
    #[error("go.sum is required next to {0} because it declares requirements")]
    MissingGoSum(PathBuf),
}

/// Target of a `replace` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replacement {
    pub path: String,
    pub version: Option<String>,
}

impl Replacement {
    /// A filesystem replacement rather than another module.
    pub fn is_local(&self) -> bool {
        self.path.starts_with("./") || self.path.starts_with("../") || self.path.starts_with('/')
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoModule {
    /// Directory containing `go.mod`.
    pub root: PathBuf,
    /// Declared module path.
    pub path: String,
    pub go_version: Option<String>,
    /// Required module path → version.
    pub requires: BTreeMap<String, String>,
    /// Replaced module path → replacement.
    pub replaces: BTreeMap<String, Replacement>,
}

impl GoModule {
    /// Nearest `go.mod` at or above `dir`.
    pub fn find(dir: &Path) -> Result<Self, ModuleError> {
        let start = fs::canonicalize(dir).map_err(|source| ModuleError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let mut current = Some(start.as_path());
        while let Some(candidate) = current {
            let manifest = candidate.join(GO_MOD);
            if manifest.is_file() {
                return Self::load(&manifest);
            }
            current = candidate.parent();
        }
        Err(ModuleError::NotFound(start))
    }

    pub fn load(manifest: &Path) -> Result<Self, ModuleError> {
        let content = fs::read_to_string(manifest).map_err(|source| ModuleError::Io {
            path: manifest.to_path_buf(),
            source,
        })?;
        let parent = manifest.parent().unwrap_or(Path::new("."));
        let root = fs::canonicalize(parent).unwrap_or_else(|_| parent.to_path_buf());
        Self::parse(root, manifest, &content)
    }

    fn parse(root: PathBuf, manifest: &Path, content: &str) -> Result<Self, ModuleError> {
        let mut module = GoModule {
            root,
            path: String::new(),
            go_version: None,
            requires: BTreeMap::new(),
            replaces: BTreeMap::new(),
        };
        let mut block: Option<&str> = None;

        for (index, raw) in content.lines().enumerate() {
            let line = strip_comment(raw).trim();
            if line.is_empty() {
                continue;
            }
            let malformed = |message: &str| ModuleError::Malformed {
                path: manifest.to_path_buf(),
                line: index + 1,
                message: message.to_string(),
            };

            if let Some(directive) = block {
                if line == ")" {
                    block = None;
                    continue;
                }
                module.apply(directive, line).map_err(malformed)?;
                continue;
            }

            let (directive, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
            let rest = rest.trim();
            if rest == "(" {
                block = Some(directive);
                continue;
            }
            module.apply(directive, rest).map_err(malformed)?;
        }

        if module.path.is_empty() {
            return Err(ModuleError::MissingModulePath(manifest.to_path_buf()));
        }
        Ok(module)
    }

    fn apply(&mut self, directive: &str, args: &str) -> Result<(), &'static str> {
        match directive {
            "module" => self.path = unquote(args).to_string(),
            "go" => self.go_version = Some(args.to_string()),
            "require" => {
                let mut parts = args.split_whitespace();
                let (Some(path), Some(version)) = (parts.next(), parts.next()) else {
                    return Err("require needs a module path and a version");
                };
                self.requires
                    .insert(unquote(path).to_string(), version.to_string());
            }
            "replace" => {
                let Some((old, new)) = args.split_once("=>") else {
                    return Err("replace needs `=>`");
                };
                let Some(old_path) = old.split_whitespace().next() else {
                    return Err("replace needs a module path");
                };
                let mut new_parts = new.split_whitespace();
                let Some(new_path) = new_parts.next() else {
                    return Err("replace needs a target");
                };
                self.replaces.insert(
                    unquote(old_path).to_string(),
                    Replacement {
                        path: unquote(new_path).to_string(),
                        version: new_parts.next().map(str::to_string),
                    },
                );
            }
            _ => {}
        }
        Ok(())
    }

    /// Import path of the package in `dir`, or `None` outside the module tree.
    pub fn package_path_for(&self, dir: &Path) -> Option<String> {
        let dir = fs::canonicalize(dir).unwrap_or_else(|_| dir.to_path_buf());
        let relative = dir.strip_prefix(&self.root).ok()?;
        let suffix: Vec<_> = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().to_string())
            .collect();
        if suffix.is_empty() {
            Some(self.path.clone())
        } else {
            Some(format!("{}/{}", self.path, suffix.join("/")))
        }
    }

    /// Whether `import_path` belongs to this module.
    pub fn owns(&self, import_path: &str) -> bool {
        is_within(import_path, &self.path)
    }

    /// Required module that provides `import_path` (longest match).
    pub fn requirement_for(&self, import_path: &str) -> Option<(&str, &str)> {
        self.requires
            .iter()
            .filter(|(module, _)| is_within(import_path, module))
            .max_by_key(|(module, _)| module.len())
            .map(|(module, version)| (module.as_str(), version.as_str()))
    }

    /// Replacement that applies to `import_path` (longest match).
    pub fn replacement_for(&self, import_path: &str) -> Option<(&str, &Replacement)> {
        self.replaces
            .iter()
            .filter(|(module, _)| is_within(import_path, module))
            .max_by_key(|(module, _)| module.len())
            .map(|(module, replacement)| (module.as_str(), replacement))
    }
}

/// `a/b/c` is within `a/b` and `a/b`, not within `a/bc`.
pub fn is_within(import_path: &str, module: &str) -> bool {
    import_path == module
        || import_path
            .strip_prefix(module)
            .is_some_and(|rest| rest.starts_with('/'))
}

fn strip_comment(line: &str) -> &str {
    match line.find("//") {
        Some(pos) => &line[..pos],
        None => line,
    }
}

fn unquote(s: &str) -> &str {
    s.trim().trim_matches(|c| c == '"' || c == '`')
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
module github.com/acme/shop

go 1.22

require github.com/single/dep v0.1.0

require (
    github.com/google/uuid v1.6.0
    golang.org/x/sync v0.7.0 // indirect
    github.com/acme/shop/tools v1.0.0
)

replace github.com/acme/local => ../local

replace (
    golang.org/x/sync v0.7.0 => golang.org/x/sync v0.8.0
)

exclude github.com/bad/dep v1.0.0
"#;

    fn parse(content: &str) -> GoModule {
        GoModule::parse(PathBuf::from("/src/shop"), Path::new("go.mod"), content).unwrap()
    }

    #[test]
    fn test_parse_module_and_go_version() {
        let module = parse(MANIFEST);
        assert_eq!(module.path, "github.com/acme/shop");
        assert_eq!(module.go_version.as_deref(), Some("1.22"));
    }

    #[test]
    fn test_parse_requires() {
        let module = parse(MANIFEST);
        assert_eq!(module.requires.len(), 4);
        assert_eq!(module.requires["github.com/single/dep"], "v0.1.0");
        assert_eq!(module.requires["golang.org/x/sync"], "v0.7.0");
    }

    #[test]
    fn test_parse_replaces() {
        let module = parse(MANIFEST);
        let local = &module.replaces["github.com/acme/local"];
        assert_eq!(local.path, "../local");
        assert!(local.is_local());
        let sync = &module.replaces["golang.org/x/sync"];
        assert_eq!(sync.version.as_deref(), Some("v0.8.0"));
        assert!(!sync.is_local());
    }

    #[test]
    fn test_requirement_longest_match() {
        let module = parse(MANIFEST);
        assert_eq!(
            module.requirement_for("github.com/acme/shop/tools/lint"),
            Some(("github.com/acme/shop/tools", "v1.0.0"))
        );
        assert_eq!(
            module.requirement_for("github.com/google/uuid"),
            Some(("github.com/google/uuid", "v1.6.0"))
        );
        assert_eq!(module.requirement_for("github.com/google/uuidx"), None);
    }

    #[test]
    fn test_missing_module_directive() {
        let err = GoModule::parse(PathBuf::new(), Path::new("go.mod"), "go 1.21\n").unwrap_err();
        assert!(matches!(err, ModuleError::MissingModulePath(_)));
    }

    #[test]
    fn test_malformed_require() {
        let err =
            GoModule::parse(PathBuf::new(), Path::new("go.mod"), "module x\nrequire y\n").unwrap_err();
        assert!(matches!(err, ModuleError::Malformed { line: 2, .. }));
    }

    #[test]
    fn test_find_walks_upward() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(GO_MOD), "module example.com/app\n").unwrap();
        let nested = dir.path().join("internal/store");
        fs::create_dir_all(&nested).unwrap();

        let module = GoModule::find(&nested).unwrap();
        assert_eq!(module.path, "example.com/app");
        assert_eq!(
            module.package_path_for(&nested).as_deref(),
            Some("example.com/app/internal/store")
        );
        assert_eq!(
            module.package_path_for(dir.path()).as_deref(),
            Some("example.com/app")
        );
    }

    #[test]
    fn test_find_without_manifest() {
        let dir = tempfile::tempdir().unwrap();
        // A go.mod above the temp dir would be found; only assert when none exists.
        if let Err(err) = GoModule::find(dir.path()) {
            assert!(matches!(err, ModuleError::NotFound(_)));
        }
    }

    #[test]
    fn test_is_within() {
        assert!(is_within("a/b", "a/b"));
        assert!(is_within("a/b/c", "a/b"));
        assert!(!is_within("a/bc", "a/b"));
    }
}

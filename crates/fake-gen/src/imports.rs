//! Import resolution for parsed files and the import block of generated files.

use std::collections::{BTreeMap, HashMap};

use fake_core::syntax::ImportSpec;
use fake_parsers::PackageLocator;

use crate::source::SourceFile;

/// One import of a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportEntry {
    /// Declared package name.
    pub name: String,
    /// Import path.
    pub path: String,
    /// Explicit alias, only when it differs from the package name.
    pub alias: Option<String>,
}

impl ImportEntry {
    /// Name the file's source uses for this package.
    pub fn local_name(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }
}

/// Resolve import specs to packages. Blank and dot imports are skipped since
/// no qualified identifier can refer to them.
pub fn resolve_imports(specs: &[ImportSpec], locator: &mut PackageLocator) -> Vec<ImportEntry> {
    specs
        .iter()
        .filter(|spec| !spec.is_blank() && !spec.is_dot())
        .map(|spec| {
            let info = locator.locate(&spec.path);
            let alias = spec.name.clone().filter(|alias| *alias != info.name);
            ImportEntry {
                name: info.name.clone(),
                path: spec.path.clone(),
                alias,
            }
        })
        .collect()
}

#[derive(Debug, Clone)]
struct Claim {
    local: String,
    package: String,
    used: bool,
}

/// Import block of one generated file.
///
/// Every import path gets exactly one local name. The first path to ask for a
/// name gets it; a later path asking for a taken name gets the first free
/// numbered variant (`util1`, `util2`, ...). Only paths marked as used are
/// rendered.
#[derive(Debug, Default)]
pub struct ImportTable {
    by_path: BTreeMap<String, Claim>,
    by_local: HashMap<String, String>,
}

pub const FMT: &str = "fmt";
pub const TESTING: &str = "testing";

impl ImportTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table for the mocks of `file`: `fmt` and `testing` first, then the
    /// file's own imports in source order, then the file's package.
    pub fn seeded(file: &SourceFile) -> Self {
        let mut table = Self::new();
        table.claim(FMT, FMT, FMT);
        table.claim(TESTING, TESTING, TESTING);
        for entry in &file.imports {
            table.claim(entry.local_name(), &entry.name, &entry.path);
        }
        table.claim(&file.package.name, &file.package.name, &file.package.path);
        table
    }

    /// Local name for `path`, claiming `preferred` (or a numbered variant)
    /// on first sight.
    pub fn claim(&mut self, preferred: &str, package: &str, path: &str) -> String {
        if let Some(claim) = self.by_path.get(path) {
            return claim.local.clone();
        }
        let mut local = preferred.to_string();
        let mut suffix = 1;
        while self.by_local.contains_key(&local) {
            local = format!("{preferred}{suffix}");
            suffix += 1;
        }
        self.by_local.insert(local.clone(), path.to_string());
        self.by_path.insert(
            path.to_string(),
            Claim {
                local: local.clone(),
                package: package.to_string(),
                used: false,
            },
        );
        local
    }

    /// Like [`claim`](Self::claim), and marks the import for rendering.
    pub fn use_import(&mut self, preferred: &str, package: &str, path: &str) -> String {
        let local = self.claim(preferred, package, path);
        if let Some(claim) = self.by_path.get_mut(path) {
            claim.used = true;
        }
        local
    }

    /// Whether `name` is the local name of some import.
    pub fn is_taken(&self, name: &str) -> bool {
        self.by_local.contains_key(name)
    }

    pub fn local_name(&self, path: &str) -> Option<&str> {
        self.by_path.get(path).map(|claim| claim.local.as_str())
    }

    /// `import (...)` block of the used imports, sorted by path.
    pub fn render(&self) -> String {
        let lines: Vec<String> = self
            .by_path
            .iter()
            .filter(|(_, claim)| claim.used)
            .map(|(path, claim)| {
                if claim.local == claim.package {
                    format!("\t\"{path}\"\n")
                } else {
                    format!("\t{} \"{path}\"\n", claim.local)
                }
            })
            .collect();
        if lines.is_empty() {
            return String::new();
        }
        format!("import (\n{})\n\n", lines.concat())
    }
}

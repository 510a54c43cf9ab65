use std::path::{Path, PathBuf};

use fake_core::syntax::SyntaxFile;

use crate::imports::ImportEntry;

/// Name and import path of a Go package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRef {
    pub name: String,
    pub path: String,
}

/// A parsed Go file with its imports resolved to packages.
#[derive(Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub package: PackageRef,
    /// Resolved imports in source order; blank and dot imports are left out.
    pub imports: Vec<ImportEntry>,
    pub syntax: SyntaxFile,
}

impl SourceFile {
    /// Import bound to `local` (alias or package name) in this file.
    pub fn import(&self, local: &str) -> Option<&ImportEntry> {
        self.imports.iter().find(|entry| entry.local_name() == local)
    }

    pub fn dir(&self) -> &Path {
        self.path.parent().unwrap_or(Path::new("."))
    }
}

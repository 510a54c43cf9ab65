use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fake_core::syntax::InterfaceSpec;
use fake_parsers::{GoModule, PackageLocator};

use crate::resolve::MethodSetResolver;
use crate::scope::Scope;
use crate::source::SourceFile;

pub(crate) const MODULE: &str = "example.com/app";

/// A throwaway Go module rooted in a temp directory.
pub(crate) struct GoModuleFixture {
    _dir: tempfile::TempDir,
    pub root: PathBuf,
}

impl GoModuleFixture {
    pub fn new() -> Self {
        Self::with_go_mod(&format!("module {MODULE}\n\ngo 1.22\n"))
    }

    pub fn with_go_mod(go_mod: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
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

    /// Locator that never looks outside the fixture.
    pub fn locator(&self) -> PackageLocator {
        let module = GoModule::find(&self.root).unwrap();
        PackageLocator::with_search_roots(module, None, None)
    }

    pub fn resolver(&self) -> MethodSetResolver {
        MethodSetResolver::new(self.locator())
    }
}

/// Load `path` and return the declaration scope of `interface`.
pub(crate) fn declared(resolver: &mut MethodSetResolver, path: &Path, interface: &str) -> Scope {
    let file: Arc<SourceFile> = resolver.load_file(path, None).unwrap();
    let spec: InterfaceSpec = file.syntax.find_interface(interface).unwrap().1.clone();
    Scope::declaration(file, &spec)
}

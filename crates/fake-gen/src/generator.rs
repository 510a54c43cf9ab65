use std::fs;
use std::path::Path;
use std::sync::Arc;

use fake_core::paths::GENERATED_HEADER;
use fake_core::syntax::InterfaceSpec;
use fake_parsers::PackageLocator;

use crate::emit::MockEmitter;
use crate::error::GenerateError;
use crate::format::format_source;
use crate::imports::ImportTable;
use crate::printer::Printer;
use crate::resolve::MethodSetResolver;
use crate::scope::Scope;
use crate::source::SourceFile;

/// Generates mock files for one run.
///
/// Parsed files, located packages and resolved method sets are shared by
/// every file generated through the same instance.
pub struct Generator {
    resolver: MethodSetResolver,
    package_name: String,
    gofmt: bool,
}

impl Generator {
    pub fn new(locator: PackageLocator, package_name: impl Into<String>, gofmt: bool) -> Self {
        Self {
            resolver: MethodSetResolver::new(locator),
            package_name: package_name.into(),
            gofmt,
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// Mocks for every interface declared in `path`, or `None` when it
    /// declares none.
    pub fn generate_file(&mut self, path: &Path) -> Result<Option<String>, GenerateError> {
        let file = self.load(path)?;
        if file.syntax.interfaces.is_empty() {
            tracing::debug!("{} declares no interfaces", path.display());
            return Ok(None);
        }
        let specs: Vec<&InterfaceSpec> = file.syntax.interfaces.iter().collect();
        self.render(&file, &specs).map(Some)
    }

    /// Mock for the interface `name` declared in `path`.
    pub fn generate_interface(&mut self, path: &Path, name: &str) -> Result<String, GenerateError> {
        let file = self.load(path)?;
        let Some((_, spec)) = file.syntax.find_interface(name) else {
            return Err(GenerateError::InterfaceNotFound {
                name: name.to_string(),
                path: path.to_path_buf(),
            });
        };
        self.render(&file, &[spec])
    }

    fn load(&mut self, path: &Path) -> Result<Arc<SourceFile>, GenerateError> {
        let path = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        Ok(self.resolver.load_file(&path, None)?)
    }

    fn render(
        &mut self,
        file: &Arc<SourceFile>,
        specs: &[&InterfaceSpec],
    ) -> Result<String, GenerateError> {
        let mut imports = ImportTable::seeded(file);
        let mut body = String::new();
        {
            let mut printer = Printer::new(&mut self.resolver, &mut imports);
            let mut emitter = MockEmitter::new(&mut printer);
            for spec in specs {
                let scope = Scope::declaration(Arc::clone(file), spec);
                emitter.emit(spec, &scope, &mut body)?;
            }
        }
        let source = format!(
            "{GENERATED_HEADER}package {}\n\n{}{}\n",
            self.package_name,
            imports.render(),
            body.trim_end()
        );
        Ok(format_source(source, self.gofmt)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::GoModuleFixture;

    #[test]
    fn test_file_without_interfaces() {
        let fixture = GoModuleFixture::new();
        let path = fixture.write("model/user.go", "package model\n\ntype User struct{ ID string }\n");
        let mut generator = Generator::new(fixture.locator(), "mocks", false);
        assert!(generator.generate_file(&path).unwrap().is_none());
    }

    #[test]
    fn test_generated_file_layout() {
        let fixture = GoModuleFixture::new();
        let path = fixture.write(
            "store/store.go",
            "package store\n\nimport \"context\"\n\ntype Store interface {\n\tGet(ctx context.Context, id string) (*User, error)\n\tClose()\n}\n\ntype User struct{}\n",
        );
        let mut generator = Generator::new(fixture.locator(), "mocks", false);
        let out = generator.generate_file(&path).unwrap().unwrap();
        assert!(out.starts_with("// Code generated by fake. DO NOT EDIT.\n\npackage mocks\n\n"));
        assert!(out.contains(
            "import (\n\t\"context\"\n\t\"example.com/app/store\"\n\t\"fmt\"\n\t\"testing\"\n)\n"
        ));
        assert!(out.contains("func (m *Store) Get(ctx context.Context, id string) (*store.User, error) {"));
        assert!(out.contains("func (m *Store) Close() {"));
        assert!(out.ends_with("}\n"));
    }

    #[test]
    fn test_generate_single_interface() {
        let fixture = GoModuleFixture::new();
        let path = fixture.write(
            "api/api.go",
            "package api\n\ntype Reader interface{ Read() string }\n\ntype Writer interface{ Write(s string) }\n",
        );
        let mut generator = Generator::new(fixture.locator(), "mocks", false);
        let out = generator.generate_interface(&path, "Writer").unwrap();
        assert!(out.contains("type Writer struct"));
        assert!(!out.contains("type Reader struct"));

        let err = generator.generate_interface(&path, "Closer").unwrap_err();
        assert!(matches!(err, GenerateError::InterfaceNotFound { .. }));
    }
}

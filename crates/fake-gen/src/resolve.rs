//! Interface method-set resolution.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fake_core::syntax::{
    FuncSignature, InterfaceMember, InterfaceSpec, InterfaceType, ParamGroup, TypeExpr,
};
use fake_parsers::{GoParser, PackageLocator};

use crate::error::ResolveError;
use crate::imports::resolve_imports;
use crate::scope::{Binding, Scope};
use crate::source::{PackageRef, SourceFile};

/// One method of a flattened interface.
#[derive(Debug, Clone)]
pub struct MethodField {
    pub name: String,
    pub signature: Arc<FuncSignature>,
    /// Scope the signature's types are printed in.
    pub scope: Scope,
}

/// Flattens interfaces across embedding, packages and generic instantiation.
///
/// Owns the package locator and a cache of parsed files for one generator
/// run. Method sets are memoized per [`Scope::key`].
pub struct MethodSetResolver {
    locator: PackageLocator,
    parser: GoParser,
    files: HashMap<PathBuf, Arc<SourceFile>>,
    memo: HashMap<String, Arc<[MethodField]>>,
    stack: Vec<String>,
}

impl MethodSetResolver {
    pub fn new(locator: PackageLocator) -> Self {
        Self {
            locator,
            parser: GoParser::new(),
            files: HashMap::new(),
            memo: HashMap::new(),
            stack: Vec::new(),
        }
    }

    pub fn locator(&self) -> &PackageLocator {
        &self.locator
    }

    /// Parse `path` (once per run) and resolve its imports.
    ///
    /// `package_path` is the import path when the caller already knows it;
    /// otherwise it is derived from the module layout.
    pub fn load_file(
        &mut self,
        path: &Path,
        package_path: Option<&str>,
    ) -> Result<Arc<SourceFile>, ResolveError> {
        if let Some(file) = self.files.get(path) {
            return Ok(Arc::clone(file));
        }
        let source = fs::read_to_string(path).map_err(|source| ResolveError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let syntax = self
            .parser
            .parse(&source)
            .map_err(|source| ResolveError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let package_path = match package_path {
            Some(p) => p.to_string(),
            None => path
                .parent()
                .and_then(|dir| self.locator.module().package_path_for(dir))
                .unwrap_or_else(|| syntax.package.clone()),
        };
        let imports = resolve_imports(&syntax.imports, &mut self.locator);
        let file = Arc::new(SourceFile {
            path: path.to_path_buf(),
            package: PackageRef {
                name: syntax.package.clone(),
                path: package_path,
            },
            imports,
            syntax,
        });
        self.files.insert(path.to_path_buf(), Arc::clone(&file));
        Ok(file)
    }

    /// Flattened, de-duplicated method set of the interface `scope` refers to.
    /// Own methods come first, then embedded sets in declaration order; the
    /// first method of a given name wins.
    pub fn resolve(&mut self, scope: &Scope) -> Result<Arc<[MethodField]>, ResolveError> {
        if let Some(methods) = self.memo.get(scope.key()) {
            return Ok(Arc::clone(methods));
        }
        let id = scope.declaration_id();
        if self.stack.contains(&id) {
            return Err(ResolveError::EmbeddingCycle(scope.interface().to_string()));
        }

        let file = Arc::clone(scope.file());
        let (_, spec) = file
            .syntax
            .find_interface(scope.interface())
            .ok_or_else(|| ResolveError::InterfaceNotFound {
                name: scope.interface().to_string(),
                package: file.package.path.clone(),
            })?;

        self.stack.push(id);
        let mut methods = Vec::new();
        let collected = self.collect(&spec.body, scope, &mut methods);
        self.stack.pop();
        collected?;

        let methods: Arc<[MethodField]> = dedup(methods).into();
        self.memo
            .insert(scope.key().to_string(), Arc::clone(&methods));
        Ok(methods)
    }

    /// Method set of an anonymous interface written inside `scope`.
    pub fn resolve_inline(
        &mut self,
        body: &InterfaceType,
        scope: &Scope,
    ) -> Result<Vec<MethodField>, ResolveError> {
        let mut methods = Vec::new();
        self.collect(body, scope, &mut methods)?;
        Ok(dedup(methods))
    }

    fn collect(
        &mut self,
        body: &InterfaceType,
        scope: &Scope,
        out: &mut Vec<MethodField>,
    ) -> Result<(), ResolveError> {
        for member in &body.members {
            if let InterfaceMember::Method { names, signature } = member {
                let signature = Arc::new(signature.clone());
                out.extend(names.iter().map(|name| MethodField {
                    name: name.clone(),
                    signature: Arc::clone(&signature),
                    scope: scope.clone(),
                }));
            }
        }
        for member in &body.members {
            if let InterfaceMember::Embedded(ty) = member {
                self.embed(ty, scope, out)?;
            }
        }
        Ok(())
    }

    fn embed(
        &mut self,
        ty: &TypeExpr,
        scope: &Scope,
        out: &mut Vec<MethodField>,
    ) -> Result<(), ResolveError> {
        match ty {
            TypeExpr::Ident(name) if scope.type_param(name).is_some() => {
                tracing::debug!("skipping embedded type parameter {name}");
            }
            TypeExpr::Ident(name) if name == "error" => out.push(error_method(scope)),
            TypeExpr::Ident(name) if name == "any" || name == "comparable" => {}
            TypeExpr::Ident(_) | TypeExpr::Qualified { .. } => {
                let (file, name) = self.find_target(ty, scope)?;
                let spec = declared_interface(&file, &name)?;
                let target = Scope::declaration(Arc::clone(&file), spec);
                out.extend(self.resolve(&target)?.iter().cloned());
            }
            TypeExpr::Generic { base, args } => {
                let (file, name) = self.find_target(base, scope)?;
                let spec = declared_interface(&file, &name)?;
                if spec.type_params.len() != args.len() {
                    return Err(ResolveError::ArityMismatch {
                        name,
                        expected: spec.type_params.len(),
                        found: args.len(),
                    });
                }
                if let [arg] = args.as_slice() {
                    if arg.as_ident().is_none() {
                        return Err(ResolveError::UnsupportedInstantiation {
                            name,
                            argument: format!("{arg:?}"),
                        });
                    }
                }
                let bindings = args
                    .iter()
                    .map(|arg| Binding {
                        expr: arg.clone(),
                        scope: scope.clone(),
                    })
                    .collect();
                let target = Scope::instantiation(Arc::clone(&file), spec, bindings);
                out.extend(self.resolve(&target)?.iter().cloned());
            }
            TypeExpr::Paren(inner) => self.embed(inner, scope, out)?,
            TypeExpr::Interface(body) => self.collect(body, scope, out)?,
            other => tracing::debug!("skipping type-set element {other:?}"),
        }
        Ok(())
    }

    /// File declaring the interface named by `ty` (`Name` or `pkg.Name`).
    fn find_target(
        &mut self,
        ty: &TypeExpr,
        scope: &Scope,
    ) -> Result<(Arc<SourceFile>, String), ResolveError> {
        match ty {
            TypeExpr::Ident(name) => {
                let file = Arc::clone(scope.file());
                if file.syntax.find_interface(name).is_some() {
                    return Ok((file, name.clone()));
                }
                let package = file.package.path.clone();
                let found = self.find_in_package(&package, name, Some(&file.path))?;
                Ok((found, name.clone()))
            }
            TypeExpr::Qualified { package, name } => {
                let file = scope.file();
                let entry = file
                    .import(package)
                    .ok_or_else(|| ResolveError::UnknownPackage {
                        package: package.clone(),
                        file: file.path.clone(),
                    })?;
                let import_path = entry.path.clone();
                let found = self.find_in_package(&import_path, name, None)?;
                Ok((found, name.clone()))
            }
            other => Err(ResolveError::UnsupportedInstantiation {
                name: scope.interface().to_string(),
                argument: format!("{other:?}"),
            }),
        }
    }

    fn find_in_package(
        &mut self,
        import_path: &str,
        name: &str,
        skip: Option<&Path>,
    ) -> Result<Arc<SourceFile>, ResolveError> {
        let info = self.locator.locate(import_path);
        for path in &info.files {
            if skip == Some(path.as_path()) {
                continue;
            }
            let file = match self.load_file(path, Some(import_path)) {
                Ok(file) => file,
                Err(err) => {
                    tracing::warn!("skipping {}: {err}", path.display());
                    continue;
                }
            };
            if file.syntax.find_interface(name).is_some() {
                return Ok(file);
            }
        }
        Err(ResolveError::InterfaceNotFound {
            name: name.to_string(),
            package: import_path.to_string(),
        })
    }
}

/// Declaration of `name` in `file`, which `find_target` picked for holding it.
fn declared_interface<'f>(
    file: &'f SourceFile,
    name: &str,
) -> Result<&'f InterfaceSpec, ResolveError> {
    file.syntax
        .find_interface(name)
        .map(|(_, spec)| spec)
        .ok_or_else(|| ResolveError::InterfaceNotFound {
            name: name.to_string(),
            package: file.package.path.clone(),
        })
}

/// `error` contributes `Error() string`.
fn error_method(scope: &Scope) -> MethodField {
    MethodField {
        name: "Error".to_string(),
        signature: Arc::new(FuncSignature {
            params: Vec::new(),
            results: vec![ParamGroup::unnamed(TypeExpr::ident("string"))],
        }),
        scope: scope.clone(),
    }
}

fn dedup(methods: Vec<MethodField>) -> Vec<MethodField> {
    let mut seen = HashSet::new();
    methods
        .into_iter()
        .filter(|m| seen.insert(m.name.clone()))
        .collect()
}

#[cfg(test)]
mod tests;

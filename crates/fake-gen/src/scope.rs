//! Type-parameter scopes for interface resolution.
//!
//! Embedding `B[T]` inside `A[T any]` means `B`'s own parameter must print as
//! whatever `A` calls it. Instead of renaming `B`'s declaration, resolving `B`
//! under `A` creates a new [`Scope`] whose bindings point back at the
//! arguments and at the scope they were written in. Scopes are immutable and
//! cheap to clone, so resolved methods can keep the scope they print in.

use std::fmt;
use std::sync::Arc;

use fake_core::syntax::{InterfaceSpec, TypeExpr};

use crate::source::SourceFile;

/// A type argument and the scope it must be printed in.
#[derive(Debug, Clone)]
pub struct Binding {
    pub expr: TypeExpr,
    pub scope: Scope,
}

/// How a type parameter name resolves in a scope.
pub enum TypeParamRef<'s> {
    /// Declared by the interface being mocked; printed as-is.
    Free(&'s str),
    /// Instantiated by an embedding interface.
    Bound(&'s Binding),
}

#[derive(Clone)]
pub struct Scope {
    inner: Arc<Inner>,
}

struct Inner {
    file: Arc<SourceFile>,
    interface: String,
    params: Vec<String>,
    bindings: Option<Vec<Binding>>,
    key: String,
}

impl Scope {
    /// Scope of an interface declaration with unbound type parameters.
    pub fn declaration(file: Arc<SourceFile>, spec: &InterfaceSpec) -> Self {
        Self::build(file, spec, None)
    }

    /// Scope of `spec` instantiated with `bindings`, one per type parameter.
    pub fn instantiation(file: Arc<SourceFile>, spec: &InterfaceSpec, bindings: Vec<Binding>) -> Self {
        Self::build(file, spec, Some(bindings))
    }

    fn build(file: Arc<SourceFile>, spec: &InterfaceSpec, bindings: Option<Vec<Binding>>) -> Self {
        let id = declaration_id(&file, &spec.name);
        let key = match &bindings {
            None => id,
            Some(bindings) => {
                let args: Vec<String> = bindings
                    .iter()
                    .map(|b| format!("{:?}@{}", b.expr, b.scope.key()))
                    .collect();
                format!("{id}[{}]", args.join(";"))
            }
        };
        Self {
            inner: Arc::new(Inner {
                params: spec.type_params.iter().map(|p| p.name.clone()).collect(),
                interface: spec.name.clone(),
                file,
                bindings,
                key,
            }),
        }
    }

    pub fn file(&self) -> &Arc<SourceFile> {
        &self.inner.file
    }

    pub fn interface(&self) -> &str {
        &self.inner.interface
    }

    /// Memoization key: declaration identity plus the binding tuple.
    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Identity of the declaration alone.
    pub fn declaration_id(&self) -> String {
        declaration_id(&self.inner.file, &self.inner.interface)
    }

    pub fn type_param(&self, name: &str) -> Option<TypeParamRef<'_>> {
        let index = self.inner.params.iter().position(|p| p == name)?;
        match &self.inner.bindings {
            Some(bindings) => bindings.get(index).map(TypeParamRef::Bound),
            None => Some(TypeParamRef::Free(&self.inner.params[index])),
        }
    }
}

impl fmt::Debug for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Scope").field(&self.inner.key).finish()
    }
}

fn declaration_id(file: &SourceFile, interface: &str) -> String {
    format!("{}#{interface}", file.path.display())
}

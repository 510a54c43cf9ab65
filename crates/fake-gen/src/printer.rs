//! Prints type expressions as Go source for the generated file.
//!
//! Every package qualifier goes through the output [`ImportTable`], so the
//! printed name always matches the import block and the import is marked as
//! used. Type parameters are looked up in the [`Scope`] the expression was
//! written in; a bound parameter prints its argument in the argument's own
//! scope.

use fake_core::syntax::{
    is_exported, ChanDir, FuncSignature, InterfaceMember, ParamGroup, StructField, TypeExpr,
};

use crate::error::ResolveError;
use crate::imports::ImportTable;
use crate::resolve::MethodSetResolver;
use crate::scope::{Scope, TypeParamRef};

pub struct Printer<'a> {
    resolver: &'a mut MethodSetResolver,
    imports: &'a mut ImportTable,
}

impl<'a> Printer<'a> {
    pub fn new(resolver: &'a mut MethodSetResolver, imports: &'a mut ImportTable) -> Self {
        Self { resolver, imports }
    }

    pub fn resolver(&mut self) -> &mut MethodSetResolver {
        self.resolver
    }

    pub fn imports(&mut self) -> &mut ImportTable {
        self.imports
    }

    pub fn print_type(&mut self, ty: &TypeExpr, scope: &Scope) -> Result<String, ResolveError> {
        Ok(match ty {
            TypeExpr::Ident(name) => match scope.type_param(name) {
                Some(TypeParamRef::Bound(binding)) => {
                    return self.print_type(&binding.expr, &binding.scope)
                }
                Some(TypeParamRef::Free(name)) => name.to_string(),
                None if !is_exported(name) => name.clone(),
                None => {
                    let package = &scope.file().package;
                    let local = self
                        .imports
                        .use_import(&package.name, &package.name, &package.path);
                    format!("{local}.{name}")
                }
            },
            TypeExpr::Qualified { package, name } => {
                let file = scope.file();
                let entry = file
                    .import(package)
                    .ok_or_else(|| ResolveError::UnknownPackage {
                        package: package.clone(),
                        file: file.path.clone(),
                    })?;
                let local = self
                    .imports
                    .use_import(entry.local_name(), &entry.name, &entry.path);
                format!("{local}.{name}")
            }
            TypeExpr::Generic { base, args } => {
                let base = self.print_type(base, scope)?;
                format!("{base}[{}]", self.print_list(args, scope)?)
            }
            TypeExpr::Pointer(elem) => format!("*{}", self.print_type(elem, scope)?),
            TypeExpr::Slice(elem) => format!("[]{}", self.print_type(elem, scope)?),
            TypeExpr::Array { len, elem } => format!("[{len}]{}", self.print_type(elem, scope)?),
            TypeExpr::Variadic(elem) => format!("...{}", self.print_type(elem, scope)?),
            TypeExpr::Map { key, value } => format!(
                "map[{}]{}",
                self.print_type(key, scope)?,
                self.print_type(value, scope)?
            ),
            TypeExpr::Chan { dir, elem } => {
                let elem_text = self.print_type(elem, scope)?;
                match dir {
                    ChanDir::Send => format!("chan<- {elem_text}"),
                    ChanDir::Recv => format!("<-chan {elem_text}"),
                    // `chan <-chan T` would parse as `chan<- chan T`.
                    ChanDir::Both if is_recv_chan(elem) => format!("chan ({elem_text})"),
                    ChanDir::Both => format!("chan {elem_text}"),
                }
            }
            TypeExpr::Func(signature) => format!("func{}", self.print_signature(signature, scope)?),
            TypeExpr::Interface(body) => {
                if body.is_empty() {
                    return Ok("interface{}".to_string());
                }
                let mut elements = Vec::new();
                for method in self.resolver.resolve_inline(body, scope)? {
                    let signature = self.print_signature(&method.signature, &method.scope)?;
                    elements.push(format!("{}{signature}", method.name));
                }
                for member in &body.members {
                    if let InterfaceMember::Embedded(elem @ (TypeExpr::Union(_) | TypeExpr::Tilde(_))) =
                        member
                    {
                        elements.push(self.print_type(elem, scope)?);
                    }
                }
                if elements.is_empty() {
                    "interface{}".to_string()
                } else {
                    format!("interface{{ {} }}", elements.join("; "))
                }
            }
            TypeExpr::Struct(fields) => self.print_struct(fields, scope)?,
            TypeExpr::Paren(inner) => format!("({})", self.print_type(inner, scope)?),
            TypeExpr::Tilde(inner) => format!("~{}", self.print_type(inner, scope)?),
            TypeExpr::Union(terms) => {
                let terms: Result<Vec<_>, _> =
                    terms.iter().map(|t| self.print_type(t, scope)).collect();
                terms?.join(" | ")
            }
        })
    }

    /// `(params) results` with names as declared.
    pub fn print_signature(
        &mut self,
        signature: &FuncSignature,
        scope: &Scope,
    ) -> Result<String, ResolveError> {
        let params = self.print_groups(&signature.params, scope)?;
        let results = self.print_groups(&signature.results, scope)?;
        let single = matches!(signature.results.as_slice(), [group] if group.names.is_empty());
        Ok(match (results.is_empty(), single) {
            (true, _) => format!("({params})"),
            (false, true) => format!("({params}) {results}"),
            (false, false) => format!("({params}) ({results})"),
        })
    }

    fn print_groups(&mut self, groups: &[ParamGroup], scope: &Scope) -> Result<String, ResolveError> {
        let mut out = Vec::with_capacity(groups.len());
        for group in groups {
            let ty = self.print_type(&group.ty, scope)?;
            if group.names.is_empty() {
                out.push(ty);
            } else {
                out.push(format!("{} {ty}", group.names.join(", ")));
            }
        }
        Ok(out.join(", "))
    }

    fn print_list(&mut self, types: &[TypeExpr], scope: &Scope) -> Result<String, ResolveError> {
        let mut out = Vec::with_capacity(types.len());
        for ty in types {
            out.push(self.print_type(ty, scope)?);
        }
        Ok(out.join(", "))
    }

    fn print_struct(&mut self, fields: &[StructField], scope: &Scope) -> Result<String, ResolveError> {
        if fields.is_empty() {
            return Ok("struct{}".to_string());
        }
        let mut out = Vec::with_capacity(fields.len());
        for field in fields {
            let mut text = self.print_type(&field.ty, scope)?;
            if !field.names.is_empty() {
                text = format!("{} {text}", field.names.join(", "));
            }
            if let Some(tag) = &field.tag {
                text = format!("{text} {tag}");
            }
            out.push(text);
        }
        Ok(format!("struct{{ {} }}", out.join("; ")))
    }
}

fn is_recv_chan(ty: &TypeExpr) -> bool {
    matches!(ty, TypeExpr::Chan { dir: ChanDir::Recv, .. })
}

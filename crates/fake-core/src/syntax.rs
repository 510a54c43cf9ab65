//! Syntax model for the subset of Go that mock generation needs.
//!
//! The parser in `fake-parsers` produces these types; the resolver and printer
//! in `fake-gen` consume them. Every type-expression shape is a variant of the
//! closed [`TypeExpr`] union, so a shape the printer does not handle is a
//! compile-time gap rather than a silent fallback.

/// A parsed Go source file, reduced to what the generator consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxFile {
    /// Declared package name (`package foo`).
    pub package: String,
    /// Import specs in source order.
    pub imports: Vec<ImportSpec>,
    /// Top-level interface type declarations in source order.
    pub interfaces: Vec<InterfaceSpec>,
}

impl SyntaxFile {
    pub fn find_interface(&self, name: &str) -> Option<(usize, &InterfaceSpec)> {
        self.interfaces
            .iter()
            .enumerate()
            .find(|(_, spec)| spec.name == name)
    }
}

/// One `import` spec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Explicit name: an alias, `_` or `.`.
    pub name: Option<String>,
    /// Unquoted import path.
    pub path: String,
}

impl ImportSpec {
    pub fn is_blank(&self) -> bool {
        self.name.as_deref() == Some("_")
    }

    pub fn is_dot(&self) -> bool {
        self.name.as_deref() == Some(".")
    }
}

/// `type Name[T constraint] interface { ... }`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceSpec {
    pub name: String,
    /// One entry per declared name; `[K, V any]` yields two entries.
    pub type_params: Vec<TypeParam>,
    pub body: InterfaceType,
}

impl InterfaceSpec {
    pub fn is_generic(&self) -> bool {
        !self.type_params.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub constraint: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InterfaceType {
    pub members: Vec<InterfaceMember>,
}

impl InterfaceType {
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceMember {
    /// A method signature. Several names may share one signature.
    Method {
        names: Vec<String>,
        signature: FuncSignature,
    },
    /// An embedded interface or a type-set element.
    Embedded(TypeExpr),
}

/// Parameter and result lists of a function or method.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FuncSignature {
    pub params: Vec<ParamGroup>,
    pub results: Vec<ParamGroup>,
}

/// One parameter declaration: `a, b int`, `int`, or `rest ...string`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamGroup {
    /// Empty for unnamed parameters.
    pub names: Vec<String>,
    pub ty: TypeExpr,
}

impl ParamGroup {
    pub fn unnamed(ty: TypeExpr) -> Self {
        Self { names: Vec::new(), ty }
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.ty, TypeExpr::Variadic(_))
    }

    /// Number of values this group declares (at least one).
    pub fn arity(&self) -> usize {
        self.names.len().max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructField {
    /// Empty for an embedded field.
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Raw tag literal including quotes.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    /// `Foo`, `int`, `T`
    Ident(String),
    /// `pkg.Foo`
    Qualified { package: String, name: String },
    /// `Foo[A]`, `pkg.Foo[A, B]`
    Generic {
        base: Box<TypeExpr>,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    /// `[N]T`; the length expression is kept verbatim.
    Array { len: String, elem: Box<TypeExpr> },
    /// `...T` in the last parameter position.
    Variadic(Box<TypeExpr>),
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan { dir: ChanDir, elem: Box<TypeExpr> },
    Func(FuncSignature),
    Interface(InterfaceType),
    Struct(Vec<StructField>),
    Paren(Box<TypeExpr>),
    /// `~T` inside a constraint.
    Tilde(Box<TypeExpr>),
    /// `A | B` inside a constraint.
    Union(Vec<TypeExpr>),
}

impl TypeExpr {
    pub fn ident(name: impl Into<String>) -> Self {
        TypeExpr::Ident(name.into())
    }

    pub fn qualified(package: impl Into<String>, name: impl Into<String>) -> Self {
        TypeExpr::Qualified {
            package: package.into(),
            name: name.into(),
        }
    }

    pub fn as_ident(&self) -> Option<&str> {
        match self {
            TypeExpr::Ident(name) => Some(name),
            _ => None,
        }
    }
}

/// Go exports identifiers whose first character is upper case.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(|c| c.is_uppercase())
}

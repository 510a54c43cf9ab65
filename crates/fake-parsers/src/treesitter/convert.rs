//! Conversion of tree-sitter-go nodes into the `fake_core::syntax` model.

use tree_sitter::Node;

use fake_core::syntax::{
    ChanDir, FuncSignature, InterfaceMember, InterfaceType, ParamGroup, StructField, TypeExpr,
    TypeParam,
};

use super::{node_text, ParseError};

pub(super) struct Converter<'s> {
    source: &'s [u8],
}

/// Named children without comments, which tree-sitter reports as extras.
fn named_children(node: Node<'_>) -> Vec<Node<'_>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|n| n.kind() != "comment")
        .collect()
}

fn line(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

fn malformed(node: Node<'_>) -> ParseError {
    ParseError::Malformed {
        kind: node.kind().to_string(),
        line: line(node),
    }
}

impl<'s> Converter<'s> {
    pub(super) fn new(source: &'s [u8]) -> Self {
        Self { source }
    }

    fn text(&self, node: Node<'_>) -> String {
        node_text(node, self.source).to_string()
    }

    fn field<'t>(&self, node: Node<'t>, name: &str) -> Result<Node<'t>, ParseError> {
        node.child_by_field_name(name).ok_or_else(|| malformed(node))
    }

    fn field_names(&self, node: Node<'_>) -> Vec<String> {
        let mut cursor = node.walk();
        node.children_by_field_name("name", &mut cursor)
            .map(|n| self.text(n))
            .collect()
    }

    fn first_named<'t>(&self, node: Node<'t>) -> Result<Node<'t>, ParseError> {
        named_children(node)
            .into_iter()
            .next()
            .ok_or_else(|| malformed(node))
    }

    fn boxed(&self, node: Node<'_>) -> Result<Box<TypeExpr>, ParseError> {
        Ok(Box::new(self.type_expr(node)?))
    }

    pub(super) fn type_expr(&self, node: Node<'_>) -> Result<TypeExpr, ParseError> {
        let ty = match node.kind() {
            "type_identifier" | "identifier" => TypeExpr::Ident(self.text(node)),
            "qualified_type" => TypeExpr::Qualified {
                package: self.text(self.field(node, "package")?),
                name: self.text(self.field(node, "name")?),
            },
            "generic_type" => {
                let base = self.boxed(self.field(node, "type")?)?;
                let args = named_children(self.field(node, "type_arguments")?)
                    .into_iter()
                    .map(|arg| self.type_expr(arg))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeExpr::Generic { base, args }
            }
            "pointer_type" => TypeExpr::Pointer(self.boxed(self.first_named(node)?)?),
            "slice_type" => TypeExpr::Slice(self.boxed(self.field(node, "element")?)?),
            "array_type" => TypeExpr::Array {
                len: self.text(self.field(node, "length")?),
                elem: self.boxed(self.field(node, "element")?)?,
            },
            "map_type" => TypeExpr::Map {
                key: self.boxed(self.field(node, "key")?)?,
                value: self.boxed(self.field(node, "value")?)?,
            },
            "channel_type" => TypeExpr::Chan {
                dir: chan_dir(node),
                elem: self.boxed(self.field(node, "value")?)?,
            },
            "function_type" => TypeExpr::Func(self.signature(
                self.field(node, "parameters")?,
                node.child_by_field_name("result"),
            )?),
            "interface_type" => TypeExpr::Interface(self.interface(node)?),
            "struct_type" => TypeExpr::Struct(self.struct_fields(node)?),
            "parenthesized_type" => TypeExpr::Paren(self.boxed(self.first_named(node)?)?),
            "negated_type" => TypeExpr::Tilde(self.boxed(self.first_named(node)?)?),
            "type_elem" | "type_constraint" | "constraint_elem" | "interface_type_name"
            | "union_type" => self.type_set(node)?,
            other => {
                return Err(ParseError::UnsupportedType {
                    kind: other.to_string(),
                    line: line(node),
                })
            }
        };
        Ok(ty)
    }

    /// `A | ~B | C` collapses to a single type when it has one term.
    fn type_set(&self, node: Node<'_>) -> Result<TypeExpr, ParseError> {
        let mut terms = Vec::new();
        for child in named_children(node) {
            match self.type_expr(child)? {
                TypeExpr::Union(nested) => terms.extend(nested),
                term => terms.push(term),
            }
        }
        match terms.len() {
            0 => Err(malformed(node)),
            1 => Ok(terms.remove(0)),
            _ => Ok(TypeExpr::Union(terms)),
        }
    }

    pub(super) fn interface(&self, node: Node<'_>) -> Result<InterfaceType, ParseError> {
        let mut members = Vec::new();
        for child in named_children(node) {
            let member = match child.kind() {
                "method_elem" | "method_spec" => InterfaceMember::Method {
                    names: vec![self.text(self.field(child, "name")?)],
                    signature: self.signature(
                        self.field(child, "parameters")?,
                        child.child_by_field_name("result"),
                    )?,
                },
                _ => InterfaceMember::Embedded(self.type_expr(child)?),
            };
            members.push(member);
        }
        Ok(InterfaceType { members })
    }

    pub(super) fn signature(
        &self,
        params: Node<'_>,
        result: Option<Node<'_>>,
    ) -> Result<FuncSignature, ParseError> {
        let params = self.param_list(params)?;
        let results = match result {
            None => Vec::new(),
            Some(node) if node.kind() == "parameter_list" => self.param_list(node)?,
            Some(node) => vec![ParamGroup::unnamed(self.type_expr(node)?)],
        };
        Ok(FuncSignature { params, results })
    }

    fn param_list(&self, node: Node<'_>) -> Result<Vec<ParamGroup>, ParseError> {
        let mut groups = Vec::new();
        for child in named_children(node) {
            let ty = self.type_expr(self.field(child, "type")?)?;
            let group = match child.kind() {
                "parameter_declaration" => ParamGroup {
                    names: self.field_names(child),
                    ty,
                },
                "variadic_parameter_declaration" => ParamGroup {
                    names: self.field_names(child),
                    ty: TypeExpr::Variadic(Box::new(ty)),
                },
                _ => return Err(malformed(child)),
            };
            groups.push(group);
        }
        Ok(groups)
    }

    pub(super) fn type_params(&self, node: Node<'_>) -> Result<Vec<TypeParam>, ParseError> {
        let mut params = Vec::new();
        for decl in named_children(node) {
            let constraint = self.type_expr(self.field(decl, "type")?)?;
            for name in self.field_names(decl) {
                params.push(TypeParam {
                    name,
                    constraint: constraint.clone(),
                });
            }
        }
        Ok(params)
    }

    fn struct_fields(&self, node: Node<'_>) -> Result<Vec<StructField>, ParseError> {
        let Some(list) = named_children(node)
            .into_iter()
            .find(|n| n.kind() == "field_declaration_list")
        else {
            return Ok(Vec::new());
        };
        let mut fields = Vec::new();
        for decl in named_children(list) {
            let mut ty = self.type_expr(self.field(decl, "type")?)?;
            let names = self.field_names(decl);
            if names.is_empty() && has_token(decl, "*") {
                ty = TypeExpr::Pointer(Box::new(ty));
            }
            fields.push(StructField {
                names,
                ty,
                tag: decl.child_by_field_name("tag").map(|t| self.text(t)),
            });
        }
        Ok(fields)
    }
}

fn has_token(node: Node<'_>, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|c| c.kind() == token);
    found
}

/// `<-chan T` receives, `chan<- T` sends, `chan T` does both.
fn chan_dir(node: Node<'_>) -> ChanDir {
    let mut cursor = node.walk();
    let tokens: Vec<&str> = node
        .children(&mut cursor)
        .filter(|c| !c.is_named())
        .map(|c| c.kind())
        .collect();
    match tokens.as_slice() {
        ["<-", "chan", ..] => ChanDir::Recv,
        ["chan", "<-", ..] => ChanDir::Send,
        _ => ChanDir::Both,
    }
}

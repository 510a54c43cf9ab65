use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Parser, Query, QueryCursor, Tree};

use fake_core::syntax::{ImportSpec, InterfaceSpec, SyntaxFile};

use crate::queries;

mod convert;

use convert::Converter;

/// Go source parser backed by tree-sitter-go.
pub struct GoParser {
    parser: Parser,
    query: Option<Query>,
}

impl GoParser {
    pub fn new() -> Self {
        Self {
            parser: Parser::new(),
            query: None,
        }
    }

    pub fn parse_tree(&mut self, source: &[u8]) -> Result<Tree, ParseError> {
        self.parser
            .set_language(&go_language())
            .map_err(|e| ParseError::Language(format!("{e}")))?;
        self.parser.parse(source, None).ok_or(ParseError::ParseFailed)
    }

    /// Parse `source` and reject it if the tree contains any syntax error.
    pub fn check_syntax(&mut self, source: &str) -> Result<(), ParseError> {
        let tree = self.parse_tree(source.as_bytes())?;
        match first_error(tree.root_node()) {
            Some(node) => Err(syntax_error(node, source.as_bytes())),
            None => Ok(()),
        }
    }

    /// Parse a Go file into the syntax model used by the generator.
    pub fn parse(&mut self, source: &str) -> Result<SyntaxFile, ParseError> {
        let bytes = source.as_bytes();
        let tree = self.parse_tree(bytes)?;
        let root = tree.root_node();
        if let Some(node) = first_error(root) {
            return Err(syntax_error(node, bytes));
        }

        let package = package_name(root, bytes).ok_or(ParseError::MissingPackage)?;
        let query = self.take_query()?;
        let extracted = extract(&query, root, bytes);
        self.query = Some(query);
        let (imports, interfaces) = extracted?;

        Ok(SyntaxFile {
            package,
            imports,
            interfaces,
        })
    }

    /// Import specs of `source`, tolerating syntax errors elsewhere in the file.
    pub fn parse_imports(&mut self, source: &str) -> Result<Vec<ImportSpec>, ParseError> {
        let bytes = source.as_bytes();
        let tree = self.parse_tree(bytes)?;
        let query = self.take_query()?;
        let imports = import_specs(&query, tree.root_node(), bytes);
        self.query = Some(query);
        Ok(imports)
    }

    fn take_query(&mut self) -> Result<Query, ParseError> {
        match self.query.take() {
            Some(q) => Ok(q),
            None => queries::go_query(&go_language()).map_err(ParseError::Query),
        }
    }
}

impl Default for GoParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("language error: {0}")]
    Language(String),
    #[error("query error: {0}")]
    Query(String),
    #[error("parse failed")]
    ParseFailed,
    #[error("syntax error at {line}:{column} near `{snippet}`")]
    Syntax {
        line: usize,
        column: usize,
        snippet: String,
    },
    #[error("missing package clause")]
    MissingPackage,
    #[error("unsupported type expression `{kind}` at line {line}")]
    UnsupportedType { kind: String, line: usize },
    #[error("malformed `{kind}` node at line {line}")]
    Malformed { kind: String, line: usize },
}

pub fn go_language() -> Language {
    tree_sitter_go::LANGUAGE.into()
}

pub(crate) fn node_text<'a>(node: Node<'a>, source: &'a [u8]) -> &'a str {
    node.utf8_text(source).unwrap_or("")
}

fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if !node.has_error() {
        return None;
    }
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    let mut cursor = node.walk();
    let children: Vec<_> = node.children(&mut cursor).collect();
    children.into_iter().find_map(first_error).or(Some(node))
}

fn syntax_error(node: Node<'_>, source: &[u8]) -> ParseError {
    let position = node.start_position();
    let snippet: String = node_text(node, source).chars().take(40).collect();
    ParseError::Syntax {
        line: position.row + 1,
        column: position.column + 1,
        snippet,
    }
}

fn package_name(root: Node<'_>, source: &[u8]) -> Option<String> {
    let mut cursor = root.walk();
    let clause = root
        .named_children(&mut cursor)
        .find(|n| n.kind() == "package_clause")?;
    let mut clause_cursor = clause.walk();
    let name = clause
        .named_children(&mut clause_cursor)
        .find(|n| n.kind() == "package_identifier" || n.kind() == "identifier")?;
    Some(node_text(name, source).to_string())
}

fn is_top_level(spec: Node<'_>) -> bool {
    spec.parent()
        .filter(|decl| decl.kind() == "type_declaration")
        .and_then(|decl| decl.parent())
        .is_some_and(|file| file.kind() == "source_file")
}

fn unquote(literal: &str) -> String {
    literal
        .trim_matches(|c| c == '"' || c == '`')
        .to_string()
}

fn import_spec(node: Node<'_>, path: String, source: &[u8]) -> ImportSpec {
    let name = node
        .child_by_field_name("name")
        .map(|n| node_text(n, source).to_string());
    ImportSpec { name, path }
}

fn import_specs(query: &Query, root: Node<'_>, source: &[u8]) -> Vec<ImportSpec> {
    let capture_names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);
    let mut imports = Vec::new();
    while let Some(m) = matches.next() {
        let mut node = None;
        let mut path = None;
        for cap in m.captures {
            match capture_names[cap.index as usize] {
                "import" => node = Some(cap.node),
                "import.path" => path = Some(unquote(node_text(cap.node, source))),
                _ => {}
            }
        }
        if let (Some(node), Some(path)) = (node, path) {
            imports.push((node.start_byte(), import_spec(node, path, source)));
        }
    }
    imports.sort_by_key(|(start, _)| *start);
    imports.into_iter().map(|(_, i)| i).collect()
}

type Extracted = (Vec<ImportSpec>, Vec<InterfaceSpec>);

fn extract(query: &Query, root: Node<'_>, source: &[u8]) -> Result<Extracted, ParseError> {
    let converter = Converter::new(source);
    let capture_names = query.capture_names();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(query, root, source);

    let mut imports: Vec<(usize, ImportSpec)> = Vec::new();
    let mut interfaces: Vec<(usize, InterfaceSpec)> = Vec::new();

    while let Some(m) = matches.next() {
        let mut import_node = None;
        let mut import_path = None;
        let mut iface_node = None;
        let mut iface_name = None;
        let mut iface_body = None;

        for cap in m.captures {
            match capture_names[cap.index as usize] {
                "import" => import_node = Some(cap.node),
                "import.path" => import_path = Some(unquote(node_text(cap.node, source))),
                "iface" => iface_node = Some(cap.node),
                "iface.name" => iface_name = Some(node_text(cap.node, source).to_string()),
                "iface.body" => iface_body = Some(cap.node),
                _ => {}
            }
        }

        if let (Some(node), Some(path)) = (import_node, import_path) {
            imports.push((node.start_byte(), import_spec(node, path, source)));
            continue;
        }

        if let (Some(node), Some(name), Some(body)) = (iface_node, iface_name, iface_body) {
            if !is_top_level(node) {
                continue;
            }
            let type_params = match node.child_by_field_name("type_parameters") {
                Some(params) => converter.type_params(params)?,
                None => Vec::new(),
            };
            let body = converter.interface(body)?;
            interfaces.push((
                node.start_byte(),
                InterfaceSpec {
                    name,
                    type_params,
                    body,
                },
            ));
        }
    }

    imports.sort_by_key(|(start, _)| *start);
    interfaces.sort_by_key(|(start, _)| *start);
    Ok((
        imports.into_iter().map(|(_, i)| i).collect(),
        interfaces.into_iter().map(|(_, i)| i).collect(),
    ))
}

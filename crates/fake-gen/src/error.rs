use std::path::PathBuf;

use fake_cache::CacheError;
use fake_parsers::{ModuleError, ParseError};

/// Failures while flattening an interface or printing its types.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: ParseError },
    #[error("{file}: package `{package}` is not imported")]
    UnknownPackage { package: String, file: PathBuf },
    #[error("interface {name} not found in package {package}")]
    InterfaceNotFound { name: String, package: String },
    #[error("embedding {name}[{argument}]: a single type argument must be a plain identifier")]
    UnsupportedInstantiation { name: String, argument: String },
    #[error("{name} takes {expected} type arguments, {found} given")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
    },
    #[error("interface {0} embeds itself")]
    EmbeddingCycle(String),
    #[error("mock of {interface} would declare {member} twice: the interface has a method of that name")]
    MemberClash { interface: String, member: String },
}

#[derive(Debug, thiserror::Error)]
pub enum FormatError {
    #[error("generated code does not parse: {0}")]
    Syntax(ParseError),
    #[error("gofmt failed: {0}")]
    Gofmt(String),
    #[error("running gofmt: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("interface {name} not found in {path}")]
    InterfaceNotFound { name: String, path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Cache(#[from] CacheError),
    #[error(transparent)]
    Module(#[from] ModuleError),
    #[error(transparent)]
    Generate(#[from] GenerateError),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

//! Mock generation for Go interfaces.
//!
//! - [`resolve`] — flattens interfaces across embedding, packages and generics
//! - [`printer`] — prints type expressions against the output import table
//! - [`emit`] — writes the mock struct, constructor and methods
//! - [`generator`] — one generated file per source file or interface
//! - [`pipeline`] — lock-file driven run over a source tree

pub mod emit;
pub mod error;
pub mod format;
pub mod generator;
pub mod imports;
pub mod pipeline;
pub mod printer;
pub mod resolve;
pub mod runtime;
pub mod scope;
pub mod source;

#[cfg(test)]
pub(crate) mod test_support;

pub use error::{FormatError, GenerateError, PipelineError, ResolveError};
pub use generator::Generator;
pub use pipeline::{generate_interface_file, run, RunOptions, RunSummary};

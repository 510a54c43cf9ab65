//! Go source parsing and module/package lookup for fake.
//!
//! - [`treesitter`] — tree-sitter-go parser producing the `fake_core::syntax` model
//! - [`walker`] — source discovery honouring ignore lists
//! - [`gomod`] / [`gosum`] — `go.mod` and `go.sum` readers
//! - [`packages`] — import path → package directory, name and files

pub mod gomod;
pub mod gosum;
pub mod packages;
pub mod queries;
pub mod treesitter;
pub mod walker;

pub use gomod::{GoModule, ModuleError};
pub use packages::{PackageInfo, PackageLocator};
pub use treesitter::{GoParser, ParseError};
pub use walker::{GoFileWalker, WalkError};

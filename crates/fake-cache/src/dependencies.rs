use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use fake_core::hash::{content_hash, digest_parts};
use fake_parsers::gomod::{GO_MOD, GO_SUM};
use fake_parsers::gosum::read_go_sum;
use fake_parsers::{GoModule, GoParser, ModuleError};

use crate::lockfile::LockEntry;
use crate::CacheError;

/// Version fingerprints of the modules required by the main module.
pub struct Dependencies {
    module: GoModule,
    sums: BTreeMap<String, String>,
    parser: Mutex<GoParser>,
}

impl Dependencies {
    /// Reads `go.sum` next to `go.mod`. It may only be absent when the module
    /// has no requirements.
    pub fn load(module: &GoModule) -> Result<Self, CacheError> {
        let sum_path = module.root.join(GO_SUM);
        let sums = if sum_path.is_file() {
            read_go_sum(&sum_path, &module.requires)?
        } else if module.requires.is_empty() {
            BTreeMap::new()
        } else {
            return Err(ModuleError::MissingGoSum(module.root.join(GO_MOD)).into());
        };
        Ok(Self::with_sums(module.clone(), sums))
    }

    pub fn with_sums(module: GoModule, sums: BTreeMap<String, String>) -> Self {
        Self {
            module,
            sums,
            parser: Mutex::new(GoParser::new()),
        }
    }

    pub fn module(&self) -> &GoModule {
        &self.module
    }

    /// Fingerprint of a required module: its path, version and checksum.
    pub fn fingerprint(&self, module_path: &str) -> Option<String> {
        let version = self.module.requires.get(module_path)?;
        let sum = self.sums.get(module_path).map(String::as_str).unwrap_or("");
        Some(digest_parts([module_path, version.as_str(), sum]))
    }

    /// Hash of the required modules behind `imports`, in sorted import order.
    ///
    /// Imports served by the standard library or the main module contribute
    /// nothing; a file importing no required module has an empty hash.
    pub fn imports_hash<I, S>(&self, imports: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let sorted: BTreeSet<String> = imports
            .into_iter()
            .map(|i| i.as_ref().to_string())
            .collect();
        let parts: Vec<String> = sorted
            .iter()
            .filter_map(|import| {
                let (module, _) = self.module.requirement_for(import)?;
                self.fingerprint(module)
            })
            .collect();
        if parts.is_empty() {
            String::new()
        } else {
            digest_parts(parts)
        }
    }

    /// Content and dependency hashes of one source file.
    pub fn hash_file(&self, path: &Path) -> Result<LockEntry, CacheError> {
        let source = fs::read_to_string(path).map_err(CacheError::io(path))?;
        let imports = self
            .parser
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .parse_imports(&source)?;
        Ok(LockEntry {
            hash: content_hash(source.as_bytes()),
            dependencies: self.imports_hash(imports.iter().map(|i| i.path.as_str())),
        })
    }
}

impl std::fmt::Debug for Dependencies {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dependencies")
            .field("module", &self.module.path)
            .field("sums", &self.sums.len())
            .finish_non_exhaustive()
    }
}

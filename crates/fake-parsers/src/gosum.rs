use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::gomod::ModuleError;

/// Checksums of the required modules, read from `go.sum`.
///
/// Each module usually has two lines: one for the module zip and one for its
/// `go.mod` (`v1.2.3/go.mod`). The zip checksum is kept when present since it
/// covers the sources the generator reads. Lines for versions other than the
/// required one are ignored.
pub fn read_go_sum(
    path: &Path,
    requires: &BTreeMap<String, String>,
) -> Result<BTreeMap<String, String>, ModuleError> {
    let content = fs::read_to_string(path).map_err(|source| ModuleError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(parse_go_sum(&content, requires))
}

fn parse_go_sum(content: &str, requires: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    let mut sums = BTreeMap::new();
    let mut exact = BTreeMap::new();
    for line in content.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let [module, version, hash] = parts.as_slice() else {
            continue;
        };
        let Some(required) = requires.get(*module) else {
            continue;
        };
        if *version == required.as_str() {
            exact.insert(module.to_string(), hash.to_string());
        } else if version.strip_suffix("/go.mod") == Some(required.as_str()) {
            sums.insert(module.to_string(), hash.to_string());
        }
    }
    sums.extend(exact);
    sums
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUM: &str = "\
github.com/google/uuid v1.5.0 h1:old=
github.com/google/uuid v1.6.0 h1:zip=
github.com/google/uuid v1.6.0/go.mod h1:mod=
golang.org/x/sync v0.7.0/go.mod h1:syncmod=
github.com/unrelated/dep v1.0.0 h1:nope=
malformed line
";

    fn requires() -> BTreeMap<String, String> {
        BTreeMap::from([
            ("github.com/google/uuid".to_string(), "v1.6.0".to_string()),
            ("golang.org/x/sync".to_string(), "v0.7.0".to_string()),
        ])
    }

    #[test]
    fn test_prefers_zip_checksum() {
        let sums = parse_go_sum(SUM, &requires());
        assert_eq!(sums["github.com/google/uuid"], "h1:zip=");
    }

    #[test]
    fn test_falls_back_to_go_mod_checksum() {
        let sums = parse_go_sum(SUM, &requires());
        assert_eq!(sums["golang.org/x/sync"], "h1:syncmod=");
    }

    #[test]
    fn test_ignores_unrequired_modules() {
        let sums = parse_go_sum(SUM, &requires());
        assert_eq!(sums.len(), 2);
        assert!(!sums.contains_key("github.com/unrelated/dep"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read_go_sum(Path::new("/nonexistent/go.sum"), &requires()).unwrap_err();
        assert!(matches!(err, ModuleError::Io { .. }));
    }
}

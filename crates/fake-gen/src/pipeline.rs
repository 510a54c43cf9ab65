//! One generation run over a source tree.

use std::fs;
use std::path::{Path, PathBuf};

use fake_cache::{get_uncached_files, remove_mock};
use fake_core::paths::mock_file_path;
use fake_parsers::{GoModule, PackageLocator};

use crate::error::PipelineError;
use crate::generator::Generator;
use crate::runtime::ensure_runtime;

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub inputs: Vec<PathBuf>,
    pub output: PathBuf,
    pub ignore: Vec<String>,
    pub package_name: String,
    pub gofmt: bool,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    /// Mock files written this run.
    pub generated: Vec<PathBuf>,
    /// Source files skipped because the lock file says they are current.
    pub unchanged: usize,
    /// Mock files deleted this run.
    pub removed: Vec<PathBuf>,
    /// Source files that could not be generated, with the reason.
    pub failed: Vec<(PathBuf, String)>,
}

impl RunSummary {
    pub fn is_noop(&self) -> bool {
        self.generated.is_empty() && self.removed.is_empty() && self.failed.is_empty()
    }
}

/// Regenerate the mocks of every changed file under `options.inputs` and
/// rewrite the lock file.
///
/// A file that fails to parse or resolve is logged and left out of the lock
/// file so the next run retries it; the remaining files are still generated.
pub fn run(options: &RunOptions) -> Result<RunSummary, PipelineError> {
    let mut lock_set = get_uncached_files(&options.inputs, &options.ignore, &options.output)?;
    let locator = PackageLocator::new(lock_set.module.clone());
    let mut generator = Generator::new(locator, options.package_name.clone(), options.gofmt);

    let changed: Vec<String> = lock_set.changed().map(|(rel, _)| rel.clone()).collect();
    let mut summary = RunSummary {
        unchanged: lock_set.handles.len() - changed.len(),
        removed: lock_set.removed.clone(),
        ..RunSummary::default()
    };

    for rel in changed {
        let Some(handle) = lock_set.handles.get_mut(&rel) else {
            continue;
        };
        let source = handle.absolute_path().to_path_buf();
        let rel_path = Path::new(&rel);
        match generator.generate_file(&source) {
            Ok(Some(text)) => {
                let target = mock_file_path(&options.output, rel_path, None);
                write_mock(&target, &text, &options.package_name)?;
                tracing::info!("generated {}", target.display());
                summary.generated.push(target);
            }
            Ok(None) => {
                if let Some(mock) = remove_mock(&options.output, rel_path)? {
                    tracing::info!("removed {}, {rel} declares no interfaces", mock.display());
                    summary.removed.push(mock);
                }
            }
            Err(err) => {
                tracing::warn!("skipping {rel}: {err}");
                handle.discard();
                summary.failed.push((source, err.to_string()));
            }
        }
    }

    lock_set.write()?;
    if summary.is_noop() {
        tracing::info!("nothing to be done");
    } else {
        tracing::info!(
            "{} mocks generated, {} removed, {} failed",
            summary.generated.len(),
            summary.removed.len(),
            summary.failed.len()
        );
    }
    Ok(summary)
}

/// Generate `<output>/<dir>/<stem>.<name>.gen.go` for one interface of `file`.
/// The lock file is not consulted.
pub fn generate_interface_file(
    file: &Path,
    name: &str,
    output: &Path,
    package_name: &str,
    gofmt: bool,
) -> Result<PathBuf, PipelineError> {
    let file = fs::canonicalize(file).map_err(|source| PipelineError::Io {
        path: file.to_path_buf(),
        source,
    })?;
    let dir = file.parent().unwrap_or(Path::new("."));
    let module = GoModule::find(dir)?;
    let rel = file
        .strip_prefix(&module.root)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| file.file_name().map(PathBuf::from).unwrap_or_default());

    let mut generator = Generator::new(PackageLocator::new(module), package_name, gofmt);
    let text = generator.generate_interface(&file, name)?;
    let target = mock_file_path(output, &rel, Some(name));
    write_mock(&target, &text, package_name)?;
    tracing::info!("generated {}", target.display());
    Ok(target)
}

fn write_mock(target: &Path, text: &str, package_name: &str) -> Result<(), PipelineError> {
    let dir = target.parent().unwrap_or(Path::new("."));
    let io = |path: &Path| {
        let path = path.to_path_buf();
        move |source: std::io::Error| PipelineError::Io { path, source }
    };
    fs::create_dir_all(dir).map_err(io(dir))?;
    fs::write(target, text).map_err(io(target))?;
    if let Some(runtime) = ensure_runtime(dir, package_name).map_err(io(dir))? {
        tracing::debug!("wrote {}", runtime.display());
    }
    Ok(())
}

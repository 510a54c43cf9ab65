use std::path::PathBuf;

use fake_core::config::FakeConfig;
use fake_gen::{run as run_pipeline, RunOptions};

use super::{load_config, EXIT_PARTIAL};

/// Run `fake generate`. Flags override `.fake.json`.
pub fn run(
    input: Vec<PathBuf>,
    output: Option<PathBuf>,
    ignore: Vec<String>,
    package: Option<String>,
    no_gofmt: bool,
) -> i32 {
    let config = match load_config("generate") {
        Ok(config) => config,
        Err(code) => return code,
    };
    let options = run_options(config, input, output, ignore, package, no_gofmt);

    match run_pipeline(&options) {
        Ok(summary) => {
            for (path, reason) in &summary.failed {
                eprintln!("fake generate: {}: {reason}", path.display());
            }
            if summary.failed.is_empty() {
                0
            } else {
                EXIT_PARTIAL
            }
        }
        Err(e) => {
            eprintln!("fake generate: {e}");
            1
        }
    }
}

/// Merge flags over `config`. Ignore entries from both are kept.
fn run_options(
    config: FakeConfig,
    input: Vec<PathBuf>,
    output: Option<PathBuf>,
    ignore: Vec<String>,
    package: Option<String>,
    no_gofmt: bool,
) -> RunOptions {
    let mut options = RunOptions {
        inputs: if input.is_empty() { config.inputs } else { input },
        output: output.unwrap_or(config.output),
        ignore: config.ignore,
        package_name: package.unwrap_or(config.package_name),
        gofmt: config.gofmt && !no_gofmt,
    };
    options.ignore.extend(ignore);
    options
}

pub mod generate;
pub mod interface;

use fake_core::config::FakeConfig;

/// Exit code for a run that finished but skipped some files.
pub const EXIT_PARTIAL: i32 = 2;

/// `.fake.json` from the working directory, or defaults.
pub(crate) fn load_config(command: &str) -> Result<FakeConfig, i32> {
    match std::env::current_dir() {
        Ok(cwd) => Ok(FakeConfig::load(&cwd)),
        Err(e) => {
            eprintln!("fake {command}: failed to get current directory: {e}");
            Err(1)
        }
    }
}

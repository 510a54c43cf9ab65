use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "fake", version, about = "Mock generator for Go interfaces")]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Log debug details
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Generate mocks for every changed Go file
    Generate {
        /// Directories to scan (repeatable, default from .fake.json or ".")
        #[arg(long, short)]
        input: Vec<PathBuf>,
        /// Output directory for mocks and fake.lock.json
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Path prefix or glob to skip (repeatable)
        #[arg(long)]
        ignore: Vec<String>,
        /// Package name of the generated files
        #[arg(long, short)]
        package: Option<String>,
        /// Keep the generator's layout instead of running gofmt
        #[arg(long)]
        no_gofmt: bool,
    },

    /// Generate the mock of a single interface
    Interface {
        /// Go file declaring the interface
        #[arg(long, short)]
        file: PathBuf,
        /// Interface name
        #[arg(long, short)]
        name: String,
        /// Output directory
        #[arg(long, short)]
        output: Option<PathBuf>,
        /// Package name of the generated file
        #[arg(long, short)]
        package: Option<String>,
        /// Keep the generator's layout instead of running gofmt
        #[arg(long)]
        no_gofmt: bool,
    },
}

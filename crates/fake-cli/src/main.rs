//! fake CLI: generates mocks for Go interfaces.
//!
//! See `fake --help` for usage.

use clap::Parser;

mod cli_args;
mod commands;
mod logging;

use cli_args::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let exit_code = match cli.command {
        Commands::Generate {
            input,
            output,
            ignore,
            package,
            no_gofmt,
        } => commands::generate::run(input, output, ignore, package, no_gofmt),
        Commands::Interface {
            file,
            name,
            output,
            package,
            no_gofmt,
        } => commands::interface::run(file, name, output, package, no_gofmt),
    };

    std::process::exit(exit_code);
}

//! Silkflow CLI entrypoint.
//!
//! Provides a thin wrapper over the `cli` module: parse args, dispatch to
//! a single stage or the full flow, and exit with appropriate status.
//! For programmatic use, prefer the library API (`silkflow::api`).

use std::process::ExitCode;

use clap::Parser;

mod cli;

fn main() -> ExitCode {
    let args = cli::CliArgs::parse();
    match cli::run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("An unexpected error has occurred: {}", e);
            ExitCode::FAILURE
        }
    }
}

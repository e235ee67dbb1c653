//! Command Line Interface (CLI) layer for Silkflow.
//!
//! This module defines argument parsing (`args`), error types (`errors`),
//! and the dispatch logic (`runner`) that maps each subcommand onto a flow
//! stage, the full flow, or environment setup.
//!
//! If you are embedding Silkflow into another application, prefer using
//! the high-level `silkflow::api` module instead of calling the CLI code.
pub mod args;
pub mod errors;
pub mod runner;

pub use args::CliArgs;
pub use runner::run;

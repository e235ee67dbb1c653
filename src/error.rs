//! Crate-level error type and `Result` alias for stable, structured error handling.
//! Converts underlying I/O and JSON errors, and provides semantic variants
//! for failed tool invocations, unsupported architectures and argument validation.
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to execute `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command had a non-zero exit ({}): {command}", exit_code(.code))]
    CommandFailed { command: String, code: Option<i32> },

    #[error("Tool not found on PATH: {0}")]
    ToolNotFound(String),

    #[error("Unsupported architecture: {0}")]
    UnsupportedArchitecture(String),

    #[error("Missing required argument: {0}")]
    MissingArgument(String),

    #[error("Not yet implemented: {0}")]
    NotImplemented(String),

    #[error("Archive extraction failed: {0}")]
    Extraction(String),
}

fn exit_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "terminated by signal".to_string(),
    }
}

impl Error {
    pub fn missing<S: Into<String>>(arg: S) -> Self {
        Error::MissingArgument(arg.into())
    }
}

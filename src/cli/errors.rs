use thiserror::Error;

/// Application-specific errors for the CLI
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Flow(#[from] silkflow::Error),

    #[error("Could not initialize logging: {0}")]
    Logging(String),
}

use thiserror::Error;

/// Process-level error enum for startup and lifecycle failures
#[derive(Error, Debug)]
pub enum VitalWatchError {
    /// Network communication errors (bind failures, listener errors)
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Server runtime errors
    #[error("Server error: {0}")]
    ServerError(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// Wrapped external errors
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for VitalWatch process operations
pub type Result<T> = std::result::Result<T, VitalWatchError>;

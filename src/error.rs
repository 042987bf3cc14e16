//! Error types for yardtrack

use thiserror::Error;

/// Result type alias for yardtrack operations
pub type Result<T> = std::result::Result<T, YardError>;

/// Main error type shared by the store, the prediction pipeline and auth
#[derive(Error, Debug)]
pub enum YardError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not enough training data: at least {required} valid measurements are required, found {available}")]
    InsufficientTrainingData { required: usize, available: usize },

    #[error("Invalid numeric input: {0}")]
    InvalidNumericInput(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Computation error: {0}")]
    Computation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl YardError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        YardError::NotFound(format!("{} {}", kind, id))
    }
}

impl From<serde_json::Error> for YardError {
    fn from(err: serde_json::Error) -> Self {
        YardError::Serialization(err.to_string())
    }
}

impl From<ndarray::ShapeError> for YardError {
    fn from(err: ndarray::ShapeError) -> Self {
        YardError::Computation(format!("invalid matrix shape: {}", err))
    }
}

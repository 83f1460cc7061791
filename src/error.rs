//! Error types for nestcv

use thiserror::Error;

/// Result type alias for nestcv operations
pub type Result<T> = std::result::Result<T, NestError>;

/// Main error type for dataset loading, model fitting and cross-validation
#[derive(Error, Debug)]
pub enum NestError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("Invalid parameter: {name} = {value}, {reason}")]
    InvalidParameter {
        name: String,
        value: String,
        reason: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<polars::error::PolarsError> for NestError {
    fn from(err: polars::error::PolarsError) -> Self {
        NestError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for NestError {
    fn from(err: serde_json::Error) -> Self {
        NestError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for NestError {
    fn from(err: ndarray::ShapeError) -> Self {
        NestError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

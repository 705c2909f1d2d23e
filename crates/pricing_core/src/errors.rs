//! Error types for the pricing core

use crate::gbdt::ModelError;
use thiserror::Error;

/// Errors that can occur while encoding a record or producing an estimate
#[derive(Error, Debug)]
pub enum PricingError {
    /// A raw field is outside the range the form accepts
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Categorical lookup table is malformed
    #[error("Factorization failed: {0}")]
    Factorization(String),

    /// Min-max scaling could not be applied to the selected columns
    #[error("Error scaling data: {0}")]
    Scaling(String),

    /// Encoded frame cannot be reconciled with the trained column order
    #[error("Feature alignment failed: {0}")]
    Alignment(String),

    /// Tree ensemble failed validation
    #[error("Model validation failed: {0}")]
    ModelValidation(String),

    /// Artifacts are missing or inconsistent with each other
    #[error("Artifact error: {0}")]
    Artifact(String),

    /// Configuration could not be read or is invalid
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<ModelError> for PricingError {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::IoError(e) => PricingError::Io(e),
            ModelError::JsonError(e) => PricingError::Serialization(e),
            other => PricingError::ModelValidation(other.to_string()),
        }
    }
}

/// Result type for pricing operations
pub type Result<T> = std::result::Result<T, PricingError>;

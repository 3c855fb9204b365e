//! Error types for the bloom_forecast crate

use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the bloom_forecast crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The target column declared by a model spec is absent from its feature table
    #[error("missing target column '{column}' in table '{table}'")]
    MissingTarget { table: String, column: String },

    /// The feature table for a model family does not exist in the warehouse
    #[error("feature table '{table}' not found in warehouse")]
    MissingFeatureTable { table: String },

    /// Error related to data validation or processing
    #[error("Data error: {0}")]
    Data(String),

    /// Error from model training or prediction
    #[error("Training error: {0}")]
    Training(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(String),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<PolarsError> for ForecastError {
    fn from(err: PolarsError) -> Self {
        ForecastError::Polars(err.to_string())
    }
}

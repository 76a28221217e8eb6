//! Error types for mcs-classify
//!
//! Toyota Way: Clear error messages with actionable guidance (Respect for People)

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// mcs-classify error types
#[derive(Error, Debug)]
pub enum Error {
    /// Storage error (CSV/Parquet/Arrow)
    #[error("Storage error: {0}")]
    StorageError(String),

    /// Table does not match the trial schema
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    /// Missing or non-finite values where numbers are required
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Invalid argument to an operation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Classifier training did not produce a usable model
    #[error("Model fit failed: {0}")]
    FitFailed(String),

    /// Scatter plot rendering failed
    #[error("Plot error: {0}")]
    PlotError(String),

    /// Configuration rejected by validation
    #[error("Config error: {0}")]
    ConfigError(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    /// JSON (config or summary) error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

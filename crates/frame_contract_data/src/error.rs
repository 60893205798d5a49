//! Data error types

use arrow::error::ArrowError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    #[error("Length mismatch for {what}: expected {expected}, got {got}")]
    LengthMismatch {
        what: String,
        expected: usize,
        got: usize,
    },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Invalid schema definition: {0}")]
    InvalidSchema(String),

    #[error("Unsupported dtype string '{0}'")]
    UnsupportedDtype(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

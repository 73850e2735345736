//! Error types for dsts-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoreError {
    #[error("Invalid color: {0:?}")]
    InvalidColor(String),
}

/// Result type alias for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

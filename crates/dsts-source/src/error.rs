//! Source error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Provider already consumed by an earlier subscription")]
    AlreadyConsumed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Provider task failed: {0}")]
    Task(String),

    #[error("Output channel closed")]
    Closed,
}

pub type SourceResult<T> = Result<T, SourceError>;

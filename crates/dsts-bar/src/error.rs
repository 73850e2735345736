//! Status line error types.

use dsts_source::{Cause, SourceError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BarError {
    #[error("nil notifier")]
    NilNotifier,

    #[error("nil status slot")]
    NilStatusSlot,

    #[error("Status line already started")]
    AlreadyStarted,

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// The root lifetime was cancelled because something failed.
    #[error("Upstream failure: {0}")]
    Upstream(Cause),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BarResult<T> = Result<T, BarError>;

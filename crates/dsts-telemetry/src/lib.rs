//! Structured logging for dsts.
//!
//! Standard output belongs to the i3bar protocol, so every log line goes
//! to standard error.

pub mod error;
pub mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::init_logging;

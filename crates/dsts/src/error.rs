//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Status line error: {0}")]
    Bar(#[from] dsts_bar::BarError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] dsts_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;

//! dsts: an i3bar status line.
//!
//! Wires the bundled feeds into a `StatusLine` writing to standard output:
//! - MPD now playing (optional, scrolled by a marquee)
//! - Tamriel calendar time (optional)
//! - Unix timestamp and local date/time

pub mod app;
pub mod cli;
pub mod config;
pub mod error;

pub use app::Application;
pub use cli::CliArgs;
pub use config::AppConfig;
pub use error::{AppError, AppResult};

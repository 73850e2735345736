//! i3bar status line aggregation.
//!
//! Fans many asynchronously updating sources into one JSON stream:
//!
//! ```text
//! feeds ──▶ Source ──callback──▶ tick ──▶ StatusLine ──snapshot──▶ Board
//!                                             │
//!                                             ▼
//!                                      StreamEncoder ──▶ stdout
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use dsts_bar::StatusLine;
//! use dsts_source::{Lifetime, Source};
//!
//! let lifetime = Lifetime::new();
//! let mut line = StatusLine::new(lifetime.clone(), tokio::io::stdout());
//! line.add_source(&clock)?;
//! line.add_provider(mpd::provider("localhost:6600"))?;
//! line.run().await?;
//! ```

mod board;
mod encoder;
mod error;
mod status_line;

pub use board::Board;
pub use encoder::{StreamEncoder, HEADER};
pub use error::{BarError, BarResult};
pub use status_line::{RunnerState, StatusLine};

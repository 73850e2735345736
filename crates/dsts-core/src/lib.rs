//! Core types for the dsts status line.
//!
//! This crate provides the value types shared by every other crate:
//! - `StatusBlock`: one segment of the bar (text + optional color)
//! - `is_valid_color`: the `#RGB` / `#RRGGBB` color predicate
//! - Default colors used by the bundled feeds

pub mod block;
pub mod color;
pub mod error;

pub use block::StatusBlock;
pub use color::{is_valid_color, DEFAULT_ERROR_COLOR, DEFAULT_STATUS_COLOR};
pub use error::{CoreError, CoreResult};

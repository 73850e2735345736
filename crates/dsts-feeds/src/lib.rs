//! Status feeds bundled with dsts.
//!
//! - `clock`: Unix timestamp and local date/time, one notifier for two slots
//! - `tamriel`: local time in the Elder Scrolls calendar
//! - `mpd`: currently playing song from a Music Player Daemon
//!
//! Feeds that spawn tasks must be subscribed from inside a Tokio runtime.

pub mod clock;
pub mod mpd;
pub mod tamriel;

pub use clock::Clock;

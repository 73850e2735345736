//! Push-based status sources for dsts.
//!
//! A source holds the latest `StatusBlock` of one feed and tells its
//! subscribers when that value changes, so the status line never polls.
//!
//! - `Lifetime`: cancellation token plus a write-once cancellation cause
//! - `StatusSlot`: lock-free cell holding the latest block
//! - `Notifier` / `Subscription`: register-a-callback contract
//! - `Source`: slot + subscriber set, optionally activated lazily
//! - `Provider` / `ProviderSource`: adapt a long-running producer task into a source
//! - `Marquee`: provider decorator that scrolls text wider than a fixed width

pub mod error;
pub mod lifetime;
pub mod marquee;
pub mod notifier;
pub mod provider;
pub mod slot;
pub mod source;
pub mod subscribers;

pub use error::{SourceError, SourceResult};
pub use lifetime::{Cause, Lifetime};
pub use marquee::{Marquee, EDGE_PAUSE, SCROLL_INTERVAL};
pub use notifier::{Notifier, Subscription};
pub use provider::{provider_fn, Provider, ProviderSource, PROVIDER_CHANNEL_CAPACITY};
pub use slot::StatusSlot;
pub use source::Source;
pub use subscribers::{Callback, SubscriberSet};

//! Wall clock feed.

use chrono::{DateTime, Local, TimeZone};
use dsts_core::{StatusBlock, DEFAULT_STATUS_COLOR};
use dsts_source::{Callback, Lifetime, Notifier, Source, SourceResult, StatusSlot, Subscription};
use std::fmt::Display;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// How often the clock republishes.
pub const CLOCK_INTERVAL: Duration = Duration::from_millis(200);

const DATETIME_SUFFIX: &str = " · ";

/// Clock feeding two slots from one ticker.
///
/// The ticker starts on the first subscription and stops with `lifetime`.
/// Both slots are written before subscribers are notified.
pub struct Clock {
    source: Source,
    datetime: StatusSlot,
}

impl Clock {
    pub fn new(lifetime: &Lifetime) -> Self {
        Self::with_interval(lifetime, CLOCK_INTERVAL)
    }

    pub fn with_interval(lifetime: &Lifetime, interval: Duration) -> Self {
        let datetime = StatusSlot::new();
        let lifetime = lifetime.clone();
        let datetime_slot = datetime.clone();

        let source = Source::lazy(move |source| {
            tokio::spawn(tick(source, datetime_slot, lifetime, interval));
        });

        Self { source, datetime }
    }

    /// `@<unix seconds>`.
    pub fn unix_slot(&self) -> StatusSlot {
        self.source.slot()
    }

    /// `YYYY-MM-DD HH:MM:SS · ` in local time.
    pub fn datetime_slot(&self) -> StatusSlot {
        self.datetime.clone()
    }
}

impl Notifier for Clock {
    fn on_update(&self, callback: Callback) -> SourceResult<Subscription> {
        self.source.on_update(callback)
    }
}

async fn tick(source: Source, datetime: StatusSlot, lifetime: Lifetime, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            () = lifetime.cancelled() => break,
            _ = ticker.tick() => {
                let now = Local::now();
                datetime.store(datetime_block(&now));
                source.publish(unix_block(&now));
            }
        }
    }
    debug!("Clock stopped");
}

pub fn unix_block<Tz: TimeZone>(now: &DateTime<Tz>) -> StatusBlock {
    StatusBlock::colored(format!("@{}", now.timestamp()), DEFAULT_STATUS_COLOR)
}

pub fn datetime_block<Tz: TimeZone>(now: &DateTime<Tz>) -> StatusBlock
where
    Tz::Offset: Display,
{
    let text = format!("{}{DATETIME_SUFFIX}", now.format("%Y-%m-%d %H:%M:%S"));
    StatusBlock::colored(text, DEFAULT_STATUS_COLOR)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::sync::Arc;
    use tokio::sync::mpsc;

    #[test]
    fn test_blocks_format() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(unix_block(&now).full_text, "@1700000000");
        assert_eq!(datetime_block(&now).full_text, "2023-11-14 22:13:20 · ");
        assert_eq!(unix_block(&now).color.as_deref(), Some(DEFAULT_STATUS_COLOR));
    }

    #[tokio::test(start_paused = true)]
    async fn test_starts_on_first_subscription() {
        let lifetime = Lifetime::new();
        let clock = Clock::new(&lifetime);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(clock.unix_slot().load().is_none());

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = clock
            .on_update(Arc::new(move || {
                let _ = tx.send(());
            }))
            .unwrap();

        rx.recv().await.unwrap();
        assert!(clock.unix_slot().load().unwrap().full_text.starts_with('@'));
        assert!(clock.datetime_slot().load().unwrap().full_text.ends_with(" · "));

        // Keeps ticking.
        rx.recv().await.unwrap();
        rx.recv().await.unwrap();

        lifetime.cancel();
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_with_lifetime() {
        let lifetime = Lifetime::new();
        let clock = Clock::new(&lifetime);

        let (tx, mut rx) = mpsc::unbounded_channel();
        let _sub = clock
            .on_update(Arc::new(move || {
                let _ = tx.send(());
            }))
            .unwrap();
        rx.recv().await.unwrap();

        lifetime.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(CLOCK_INTERVAL * 5).await;
        assert!(rx.try_recv().is_err());
    }
}

//! Current time in the Tamriel calendar, as shown in Skyrim.
//!
//! See <https://en.uesp.net/wiki/Lore:Calendar>.

use chrono::{DateTime, Datelike, Local, TimeZone, Weekday};
use dsts_core::{StatusBlock, DEFAULT_STATUS_COLOR};
use dsts_source::SourceResult;
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// How often the provider republishes.
pub const TAMRIEL_INTERVAL: Duration = Duration::from_millis(500);

const MONTHS: [&str; 12] = [
    "Morning Star",
    "Sun's Dawn",
    "First Seed",
    "Rain's Hand",
    "Second Seed",
    "Mid Year",
    "Sun's Height",
    "Last Seed",
    "Heartfire",
    "Frostfall",
    "Sun's Dusk",
    "Evening Star",
];

fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Sun => "Sundas",
        Weekday::Mon => "Morndas",
        Weekday::Tue => "Tirdas",
        Weekday::Wed => "Middas",
        Weekday::Thu => "Turdas",
        Weekday::Fri => "Fredas",
        Weekday::Sat => "Loredas",
    }
}

fn day_suffix(day: u32) -> &'static str {
    match day {
        1 | 21 | 31 => "st",
        2 | 22 => "nd",
        3 | 23 => "rd",
        _ => "th",
    }
}

/// Format as `<weekday>, hh:mm:ss AM, <day><suffix> of <month>`.
pub fn format<Tz: TimeZone>(dt: &DateTime<Tz>) -> String
where
    Tz::Offset: Display,
{
    let day = dt.day();
    format!(
        "{}, {}, {}{} of {}",
        weekday_name(dt.weekday()),
        dt.format("%I:%M:%S %p"),
        day,
        day_suffix(day),
        MONTHS[dt.month0() as usize],
    )
}

/// Provider publishing the local Tamriel time.
pub async fn provider(
    cancel: CancellationToken,
    tx: mpsc::Sender<StatusBlock>,
) -> SourceResult<()> {
    let mut ticker = tokio::time::interval(TAMRIEL_INTERVAL);

    loop {
        tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            _ = ticker.tick() => {}
        }

        let block = StatusBlock::colored(format(&Local::now()), DEFAULT_STATUS_COLOR);
        tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            sent = tx.send(block) => {
                if sent.is_err() {
                    return Ok(());
                }
            }
        }
    }
}

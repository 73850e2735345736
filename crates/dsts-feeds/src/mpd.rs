//! Currently playing song from MPD.
//!
//! See <https://mpd.readthedocs.io/en/latest/protocol.html>.

use dsts_core::StatusBlock;
use dsts_source::{provider_fn, Provider, SourceError, SourceResult};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

pub const COLOR_NORMAL: &str = "#ffffff";

/// Wait before reconnecting after a failed session.
pub const RECONNECT_INTERVAL: Duration = Duration::from_secs(1);

/// Time between two polls of the player state.
pub const REFRESH_INTERVAL: Duration = Duration::from_millis(300);

const GREETING_PREFIX: &str = "OK MPD ";

/// Provider for an MPD listening on `addr` (`host:port`).
///
/// Connection and protocol errors are shown in the bar in the error color
/// and the provider reconnects; it only returns on cancellation or when
/// its output closes.
pub fn provider(addr: impl Into<String>) -> impl Provider {
    let addr = addr.into();
    provider_fn(move |cancel, tx| async move { run(addr, cancel, tx).await })
}

async fn run(
    addr: String,
    cancel: CancellationToken,
    tx: mpsc::Sender<StatusBlock>,
) -> SourceResult<()> {
    loop {
        let outcome = tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            outcome = session(&addr, &tx) => outcome,
        };

        match outcome {
            Err(SourceError::Closed) => return Ok(()),
            Err(e) => {
                warn!(addr = %addr, error = %e, "MPD session failed");
                tokio::select! {
                    () = cancel.cancelled() => return Ok(()),
                    sent = tx.send(StatusBlock::error(&e)) => {
                        if sent.is_err() {
                            return Ok(());
                        }
                    }
                }
            }
            Ok(()) => debug!(addr = %addr, "MPD session ended"),
        }

        tokio::select! {
            () = cancel.cancelled() => return Ok(()),
            () = tokio::time::sleep(RECONNECT_INTERVAL) => {}
        }
    }
}

/// One connection: poll until something fails.
async fn session(addr: &str, tx: &mpsc::Sender<StatusBlock>) -> SourceResult<()> {
    let stream = TcpStream::connect(addr).await?;
    let (read, mut write) = stream.into_split();
    let mut lines = BufReader::new(read).lines();

    let greeting = next_line(&mut lines).await?;
    if !greeting.starts_with(GREETING_PREFIX) {
        return Err(SourceError::Protocol("unexpected mpd response".to_string()));
    }
    info!(addr, greeting = %greeting, "Connected to MPD");

    let mut ticker = tokio::time::interval(REFRESH_INTERVAL);
    loop {
        ticker.tick().await;

        let status = command(&mut write, &mut lines, "status").await?;
        let playing = status
            .iter()
            .any(|(key, value)| key == "state" && value.eq_ignore_ascii_case("play"));

        let text = if playing {
            let song = command(&mut write, &mut lines, "currentsong").await?;
            match format_song(&song) {
                Some(text) => text,
                None => continue,
            }
        } else {
            // Hidden while nothing plays.
            String::new()
        };

        let block = StatusBlock::colored(text, COLOR_NORMAL);
        tx.send(block).await.map_err(|_| SourceError::Closed)?;
    }
}

async fn next_line(lines: &mut Lines<BufReader<OwnedReadHalf>>) -> SourceResult<String> {
    lines
        .next_line()
        .await?
        .ok_or_else(|| SourceError::Protocol("unexpected eof".to_string()))
}

/// Send `cmd` and collect the response up to the closing `OK`.
async fn command(
    write: &mut OwnedWriteHalf,
    lines: &mut Lines<BufReader<OwnedReadHalf>>,
    cmd: &str,
) -> SourceResult<Vec<(String, String)>> {
    write.write_all(format!("{cmd}\n").as_bytes()).await?;

    let mut response = Vec::new();
    loop {
        let line = next_line(lines).await?;
        if line == "OK" {
            break;
        }
        if line.starts_with("ACK ") {
            return Err(SourceError::Protocol(line));
        }
        response.push(line);
    }

    Ok(parse_pairs(&response))
}

/// Parse `key: value` lines. Keys are lowercased, both sides trimmed.
pub fn parse_pairs<S: AsRef<str>>(lines: &[S]) -> Vec<(String, String)> {
    lines
        .iter()
        .filter_map(|line| line.as_ref().split_once(':'))
        .map(|(key, value)| (key.trim().to_lowercase(), value.trim().to_string()))
        .collect()
}

/// `Artist (Album) - Title`, leaving out whatever is missing.
///
/// Returns `None` when there's no title.
pub fn format_song(pairs: &[(String, String)]) -> Option<String> {
    let field = |name: &str| {
        pairs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
            .unwrap_or_default()
    };

    let (artist, album, title) = (field("artist"), field("album"), field("title"));
    if title.is_empty() {
        return None;
    }

    let mut text = String::new();
    if !album.is_empty() {
        text = format!("({album})");
    }
    if !artist.is_empty() {
        text = format!("{} -", format!("{artist} {text}").trim());
    }

    Some(format!("{text} {title}").trim().to_string())
}

//! MPD provider tests against an in-process fake server.

use dsts_core::{StatusBlock, DEFAULT_ERROR_COLOR};
use dsts_feeds::mpd;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio::time::{timeout, Duration};
use tokio_util::sync::CancellationToken;

/// Serve one client: greeting, then canned replies per command.
async fn fake_mpd(greeting: &'static str, state: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (read, mut write) = stream.into_split();
        write.write_all(greeting.as_bytes()).await.unwrap();

        let mut lines = BufReader::new(read).lines();
        while let Ok(Some(cmd)) = lines.next_line().await {
            let reply = match cmd.as_str() {
                "status" => format!("volume: 50\nstate: {state}\nOK\n"),
                "currentsong" => {
                    "Artist: Boards of Canada\nAlbum: Geogaddi\nTitle: Alpha and Omega\nOK\n"
                        .to_string()
                }
                _ => "ACK [5@0] {} unknown command\n".to_string(),
            };
            if write.write_all(reply.as_bytes()).await.is_err() {
                break;
            }
        }
    });

    addr
}

async fn first_block(addr: String) -> StatusBlock {
    let cancel = CancellationToken::new();
    let (tx, mut rx) = mpsc::channel(1);
    let provider = Box::new(mpd::provider(addr));
    let task = tokio::spawn(dsts_source::Provider::run(provider, cancel.clone(), tx));

    let block = timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("block within timeout")
        .expect("provider running");

    cancel.cancel();
    drop(rx);
    timeout(Duration::from_secs(2), task)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    block
}

#[tokio::test]
async fn test_playing_song() {
    let addr = fake_mpd("OK MPD 0.23.5\n", "play").await;
    let block = first_block(addr).await;
    assert_eq!(block.full_text, "Boards of Canada (Geogaddi) - Alpha and Omega");
    assert_eq!(block.color.as_deref(), Some(mpd::COLOR_NORMAL));
}

#[tokio::test]
async fn test_stopped_player_is_hidden() {
    let addr = fake_mpd("OK MPD 0.23.5\n", "stop").await;
    let block = first_block(addr).await;
    assert_eq!(block.full_text, "");
}

#[tokio::test]
async fn test_bad_greeting_reported_in_bar() {
    let addr = fake_mpd("HELLO\n", "play").await;
    let block = first_block(addr).await;
    assert_eq!(block.full_text, "Protocol error: unexpected mpd response");
    assert_eq!(block.color.as_deref(), Some(DEFAULT_ERROR_COLOR));
}

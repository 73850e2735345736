//! Marquee transform.
//!
//! Bounds a provider's text to a fixed number of visible characters. Text
//! that fits passes through untouched; longer text is shown as a window
//! that bounces between both ends, holding for `EDGE_PAUSE` at each end
//! and moving one character every `SCROLL_INTERVAL` in between.

use crate::error::{SourceError, SourceResult};
use crate::provider::{Provider, PROVIDER_CHANNEL_CAPACITY};
use dsts_core::StatusBlock;
use futures_util::future::BoxFuture;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Time between two one-character scroll steps.
pub const SCROLL_INTERVAL: Duration = Duration::from_millis(300);

/// Time the window holds still at either end before reversing.
pub const EDGE_PAUSE: Duration = Duration::from_secs(1);

/// Provider decorator that scrolls text wider than `width` characters.
pub struct Marquee<P> {
    inner: P,
    width: usize,
    step: Duration,
    pause: Duration,
}

impl<P: Provider> Marquee<P> {
    /// Wrap `inner`, showing at most `width` characters (minimum 1).
    pub fn new(inner: P, width: usize) -> Self {
        Self {
            inner,
            width: width.max(1),
            step: SCROLL_INTERVAL,
            pause: EDGE_PAUSE,
        }
    }

    /// Override scroll timing.
    pub fn with_timing(mut self, step: Duration, pause: Duration) -> Self {
        self.step = step;
        self.pause = pause;
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    async fn scroll(
        self,
        cancel: CancellationToken,
        tx: mpsc::Sender<StatusBlock>,
    ) -> SourceResult<()> {
        let Marquee {
            inner,
            width,
            step,
            pause,
        } = self;

        // Own token for the inner provider: it must also stop when only the
        // marquee's output goes away.
        let inner_cancel = cancel.child_token();
        let (inner_tx, mut inner_rx) = mpsc::channel(PROVIDER_CHANNEL_CAPACITY);
        let producer = tokio::spawn(Box::new(inner).run(inner_cancel.clone(), inner_tx));

        let mut window = Window::new(width);
        let mut next_step: Option<Instant> = None;

        loop {
            let deadline = next_step;
            let step_due = async move {
                match deadline {
                    Some(at) => tokio::time::sleep_until(at).await,
                    None => std::future::pending().await,
                }
            };

            let out = tokio::select! {
                () = cancel.cancelled() => break,
                block = inner_rx.recv() => {
                    let Some(block) = block else { break };
                    let out = window.accept(block);
                    if out.is_some() {
                        next_step = window.delay(step, pause).map(|d| Instant::now() + d);
                    }
                    out
                }
                () = step_due => {
                    let out = window.advance();
                    next_step = window.delay(step, pause).map(|d| Instant::now() + d);
                    out
                }
            };

            if let Some(block) = out {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    sent = tx.send(block) => {
                        if sent.is_err() {
                            debug!("Marquee output closed");
                            break;
                        }
                    }
                }
            }
        }

        inner_cancel.cancel();
        drop(inner_rx);
        match producer.await {
            Ok(result) => result,
            Err(join_err) => Err(SourceError::Task(join_err.to_string())),
        }
    }
}

impl<P: Provider> Provider for Marquee<P> {
    fn run(
        self: Box<Self>,
        cancel: CancellationToken,
        tx: mpsc::Sender<StatusBlock>,
    ) -> BoxFuture<'static, SourceResult<()>> {
        Box::pin((*self).scroll(cancel, tx))
    }
}

/// Scroll state for one value.
#[derive(Debug)]
struct Window {
    width: usize,
    current: Option<StatusBlock>,
    chars: Vec<char>,
    offset: usize,
    forward: bool,
}

impl Window {
    fn new(width: usize) -> Self {
        Self {
            width,
            current: None,
            chars: Vec::new(),
            offset: 0,
            forward: true,
        }
    }

    /// Take a new upstream value.
    ///
    /// Returns what to display, or `None` if `block` repeats the current
    /// value, in which case the scroll position is kept.
    fn accept(&mut self, block: StatusBlock) -> Option<StatusBlock> {
        if self.current.as_ref() == Some(&block) {
            return None;
        }

        self.chars = block.full_text.chars().collect();
        self.offset = 0;
        self.forward = true;
        self.current = Some(block);

        if self.is_scrolling() {
            Some(self.visible())
        } else {
            self.current.clone()
        }
    }

    fn is_scrolling(&self) -> bool {
        self.chars.len() > self.width
    }

    fn max_offset(&self) -> usize {
        self.chars.len().saturating_sub(self.width)
    }

    fn at_edge(&self) -> bool {
        self.offset == 0 || self.offset == self.max_offset()
    }

    /// Wait before the next `advance`, `None` when nothing scrolls.
    fn delay(&self, step: Duration, pause: Duration) -> Option<Duration> {
        if !self.is_scrolling() {
            return None;
        }
        Some(if self.at_edge() { pause } else { step })
    }

    /// Move one character, turning around at either end.
    fn advance(&mut self) -> Option<StatusBlock> {
        if !self.is_scrolling() {
            return None;
        }

        if self.offset == self.max_offset() {
            self.forward = false;
        } else if self.offset == 0 {
            self.forward = true;
        }

        if self.forward {
            self.offset += 1;
        } else {
            self.offset -= 1;
        }

        Some(self.visible())
    }

    fn visible(&self) -> StatusBlock {
        let end = (self.offset + self.width).min(self.chars.len());
        let full_text = self.chars[self.offset..end].iter().collect();
        match &self.current {
            // Keeps the color the upstream block was built with.
            Some(current) => StatusBlock {
                full_text,
                ..current.clone()
            },
            None => StatusBlock::new(full_text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::provider_fn;

    fn colored(text: &str) -> StatusBlock {
        StatusBlock::with_color(text, "#ffffff").unwrap()
    }

    #[test]
    fn test_short_text_passes_through() {
        let mut window = Window::new(5);
        let block = colored("hello");

        assert_eq!(window.accept(block.clone()), Some(block));
        assert_eq!(window.advance(), None);
        assert_eq!(window.offset, 0);
        assert_eq!(window.delay(SCROLL_INTERVAL, EDGE_PAUSE), None);
    }

    #[test]
    fn test_long_text_bounces() {
        let mut window = Window::new(3);
        let first = window.accept(colored("abcdef")).unwrap();
        assert_eq!(first.full_text, "abc");
        assert_eq!(first.color.as_deref(), Some("#ffffff"));

        let mut offsets = vec![window.offset];
        let mut texts = vec![first.full_text];
        for _ in 0..8 {
            let block = window.advance().unwrap();
            assert_eq!(block.char_len(), 3);
            assert_eq!(block.color.as_deref(), Some("#ffffff"));
            offsets.push(window.offset);
            texts.push(block.full_text);
        }

        assert_eq!(offsets, vec![0, 1, 2, 3, 2, 1, 0, 1, 2]);
        assert_eq!(
            texts,
            vec!["abc", "bcd", "cde", "def", "cde", "bcd", "abc", "bcd", "cde"]
        );
    }

    #[test]
    fn test_pause_only_at_edges() {
        let step = Duration::from_millis(300);
        let pause = Duration::from_secs(1);
        let mut window = Window::new(2);
        window.accept(StatusBlock::new("abcd"));

        let mut delays = vec![window.delay(step, pause).unwrap()];
        for _ in 0..4 {
            window.advance();
            delays.push(window.delay(step, pause).unwrap());
        }
        // offsets 0, 1, 2, 1, 0
        assert_eq!(delays, vec![pause, step, pause, step, pause]);
    }

    #[test]
    fn test_duplicate_keeps_position() {
        let mut window = Window::new(3);
        window.accept(StatusBlock::new("abcdef"));
        window.advance();
        window.advance();
        assert_eq!(window.offset, 2);

        assert_eq!(window.accept(StatusBlock::new("abcdef")), None);
        assert_eq!(window.offset, 2);
        assert_eq!(window.advance().unwrap().full_text, "def");
    }

    #[test]
    fn test_new_value_resets() {
        let mut window = Window::new(3);
        window.accept(StatusBlock::new("abcdef"));
        for _ in 0..4 {
            window.advance();
        }
        assert!(!window.forward);

        let out = window.accept(StatusBlock::new("uvwxyz")).unwrap();
        assert_eq!(out.full_text, "uvw");
        assert_eq!(window.offset, 0);
        assert!(window.forward);
    }

    #[test]
    fn test_color_change_is_a_new_value() {
        let mut window = Window::new(3);
        window.accept(StatusBlock::new("abcdef"));
        window.advance();

        let out = window.accept(colored("abcdef")).unwrap();
        assert_eq!(out.full_text, "abc");
        assert_eq!(out.color.as_deref(), Some("#ffffff"));
    }

    #[test]
    fn test_width_counts_code_points() {
        let mut window = Window::new(2);
        assert_eq!(window.accept(StatusBlock::new("ñáé")).unwrap().full_text, "ñá");
        assert_eq!(window.advance().unwrap().full_text, "áé");
        assert_eq!(window.advance().unwrap().full_text, "ñá");
    }

    #[test]
    fn test_zero_width_clamped() {
        let marquee = Marquee::new(
            provider_fn(|_cancel, _tx| async move { Ok::<(), SourceError>(()) }),
            0,
        );
        assert_eq!(marquee.width(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scroll_timing() {
        let (feed_tx, mut feed_rx) = mpsc::channel::<StatusBlock>(4);
        let inner = provider_fn(move |cancel, tx| async move {
            loop {
                tokio::select! {
                    () = cancel.cancelled() => break,
                    block = feed_rx.recv() => match block {
                        Some(block) => {
                            if tx.send(block).await.is_err() {
                                break;
                            }
                        }
                        None => cancel.cancelled().await,
                    },
                }
            }
            Ok::<(), SourceError>(())
        });

        let cancel = CancellationToken::new();
        let (out_tx, mut out_rx) = mpsc::channel(1);
        let marquee = Box::new(Marquee::new(inner, 3));
        let task = tokio::spawn(marquee.run(cancel.clone(), out_tx));

        feed_tx.send(StatusBlock::new("abcdef")).await.unwrap();

        let mut seen = Vec::new();
        let mut last = None;
        for _ in 0..8 {
            let block = out_rx.recv().await.unwrap();
            let now = Instant::now();
            let gap = last.map(|t| now - t).unwrap_or_default();
            last = Some(now);
            seen.push((block.full_text, gap));
        }

        let expected = [
            ("abc", Duration::ZERO),
            ("bcd", EDGE_PAUSE),
            ("cde", SCROLL_INTERVAL),
            ("def", SCROLL_INTERVAL),
            ("cde", EDGE_PAUSE),
            ("bcd", SCROLL_INTERVAL),
            ("abc", SCROLL_INTERVAL),
            ("bcd", EDGE_PAUSE),
        ];
        for ((text, gap), (want_text, want_gap)) in seen.iter().zip(expected) {
            assert_eq!(text, want_text);
            assert!(*gap >= want_gap, "{text}: {gap:?} < {want_gap:?}");
            assert!(*gap < want_gap + Duration::from_millis(20), "{text}: {gap:?}");
        }

        cancel.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .unwrap()
            .unwrap();
        assert!(result.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_republished_value_does_not_restart_scroll() {
        let (feed_tx, mut feed_rx) = mpsc::channel::<StatusBlock>(4);
        let inner = provider_fn(move |cancel, tx| async move {
            while let Some(block) = feed_rx.recv().await {
                if tx.send(block).await.is_err() {
                    break;
                }
            }
            cancel.cancelled().await;
            Ok::<(), SourceError>(())
        });

        let cancel = CancellationToken::new();
        let (out_tx, mut out_rx) = mpsc::channel(1);
        let task = tokio::spawn(Box::new(Marquee::new(inner, 3)).run(cancel.clone(), out_tx));

        feed_tx.send(StatusBlock::new("abcdef")).await.unwrap();
        assert_eq!(out_rx.recv().await.unwrap().full_text, "abc");
        assert_eq!(out_rx.recv().await.unwrap().full_text, "bcd");

        feed_tx.send(StatusBlock::new("abcdef")).await.unwrap();
        assert_eq!(out_rx.recv().await.unwrap().full_text, "cde");

        feed_tx.send(StatusBlock::new("xy")).await.unwrap();
        assert_eq!(out_rx.recv().await.unwrap().full_text, "xy");

        // Short text never scrolls.
        let quiet = tokio::time::timeout(Duration::from_secs(10), out_rx.recv()).await;
        assert!(quiet.is_err());

        drop(feed_tx);
        cancel.cancel();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_inner_error_propagates() {
        let inner = provider_fn(|_cancel, _tx| async move {
            Err::<(), SourceError>(SourceError::Protocol("connection reset".into()))
        });

        let (out_tx, _out_rx) = mpsc::channel(1);
        let result = tokio::time::timeout(
            Duration::from_secs(1),
            Box::new(Marquee::new(inner, 10)).run(CancellationToken::new(), out_tx),
        )
        .await
        .expect("marquee returns instead of hanging");

        assert!(matches!(result, Err(SourceError::Protocol(msg)) if msg == "connection reset"));
    }

    #[tokio::test]
    async fn test_closed_output_stops_inner_provider() {
        let (done_tx, done_rx) = tokio::sync::oneshot::channel();
        let inner = provider_fn(move |cancel, tx| async move {
            tx.send(StatusBlock::new("now playing"))
                .await
                .map_err(|_| SourceError::Closed)?;
            cancel.cancelled().await;
            let _ = done_tx.send(());
            Ok::<(), SourceError>(())
        });

        let cancel = CancellationToken::new();
        let (out_tx, out_rx) = mpsc::channel(1);
        drop(out_rx);

        let result = tokio::time::timeout(
            Duration::from_secs(1),
            Box::new(Marquee::new(inner, 3)).run(cancel.clone(), out_tx),
        )
        .await
        .expect("marquee returns once its output is gone");

        assert!(result.is_ok());
        done_rx.await.expect("inner provider observed cancellation");
        assert!(!cancel.is_cancelled());
    }
}

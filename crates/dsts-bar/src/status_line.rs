//! Status line runner.
//!
//! Subscribes to every registered notifier, turns their callbacks into
//! refresh ticks, and writes a board snapshot per tick until the root
//! lifetime ends.
//!
//! Ticks are coalesced: the tick channel holds at most one pending
//! refresh and callbacks use `try_send`. A full channel means a refresh
//! that will read the newest values is already queued, so a burst costs
//! one frame, the refresh after the burst is never lost, and publishers
//! never block, not even once the runner stops reading.

use crate::board::Board;
use crate::encoder::StreamEncoder;
use crate::error::{BarError, BarResult};
use dsts_source::{Callback, Lifetime, Notifier, Provider, ProviderSource, Source, StatusSlot};
use std::fmt;
use std::sync::Arc;
use tokio::io::AsyncWrite;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Runner lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    /// Constructed, not started.
    Idle,
    /// Subscribed to every notifier, writing frames.
    Running,
    /// Root lifetime ended; unsubscribing, no more frames.
    Draining,
    /// Terminal.
    Stopped,
}

impl fmt::Display for RunnerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "IDLE"),
            Self::Running => write!(f, "RUNNING"),
            Self::Draining => write!(f, "DRAINING"),
            Self::Stopped => write!(f, "STOPPED"),
        }
    }
}

/// Aggregates sources into an i3bar status line written to `W`.
pub struct StatusLine<W: AsyncWrite + Unpin> {
    lifetime: Lifetime,
    encoder: StreamEncoder<W>,
    notifiers: Vec<Arc<dyn Notifier>>,
    board: Board,
    state: RunnerState,
}

impl<W: AsyncWrite + Unpin> StatusLine<W> {
    /// Create a status line that runs until `lifetime` is cancelled.
    pub fn new(lifetime: Lifetime, writer: W) -> Self {
        Self {
            lifetime,
            encoder: StreamEncoder::new(writer),
            notifiers: Vec::new(),
            board: Board::new(),
            state: RunnerState::Idle,
        }
    }

    /// Register a notifier whose updates trigger a refresh.
    ///
    /// # Errors
    ///
    /// `BarError::NilNotifier` for `None`; nothing is registered.
    pub fn add_notifier(&mut self, notifier: Option<Arc<dyn Notifier>>) -> BarResult<()> {
        let notifier = notifier.ok_or(BarError::NilNotifier)?;
        self.notifiers.push(notifier);
        Ok(())
    }

    /// Append slots to the right end of the board.
    ///
    /// # Errors
    ///
    /// `BarError::NilStatusSlot` if any slot is `None`; in that case no
    /// slot is added.
    pub fn add_slots<I>(&mut self, slots: I) -> BarResult<()>
    where
        I: IntoIterator<Item = Option<StatusSlot>>,
    {
        let slots = slots
            .into_iter()
            .collect::<Option<Vec<_>>>()
            .ok_or(BarError::NilStatusSlot)?;

        for slot in slots {
            self.board.push(slot);
        }
        Ok(())
    }

    /// Register a source as both notifier and slot.
    pub fn add_source(&mut self, source: &Source) -> BarResult<()> {
        self.add_notifier(Some(Arc::new(source.clone())))?;
        self.add_slots([Some(source.slot())])
    }

    /// Adapt `provider` and register it as notifier and slot.
    ///
    /// The provider runs under a child of the status line's lifetime, so
    /// its failure stays local while root cancellation still stops it.
    pub fn add_provider(&mut self, provider: impl Provider) -> BarResult<()> {
        let adapter = ProviderSource::new(&self.lifetime, provider);
        let slot = adapter.slot();
        self.add_notifier(Some(Arc::new(adapter)))?;
        self.add_slots([Some(slot)])
    }

    pub fn state(&self) -> RunnerState {
        self.state
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn notifier_count(&self) -> usize {
        self.notifiers.len()
    }

    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    pub fn frames_written(&self) -> u64 {
        self.encoder.frames_written()
    }

    /// Give back the output writer.
    pub fn into_writer(self) -> W {
        self.encoder.into_inner()
    }

    fn transition(&mut self, next: RunnerState) {
        debug!(from = %self.state, to = %next, "Status line state change");
        self.state = next;
    }

    /// Run until the lifetime is cancelled.
    ///
    /// Returns `Ok(())` on clean cancellation and `BarError::Upstream`
    /// when the lifetime was cancelled with a cause. Every subscription is
    /// removed before returning, whatever the exit path.
    pub async fn run(&mut self) -> BarResult<()> {
        if self.state != RunnerState::Idle {
            return Err(BarError::AlreadyStarted);
        }

        let (tick_tx, mut tick_rx) = mpsc::channel::<()>(1);

        let mut subscriptions = Vec::with_capacity(self.notifiers.len());
        for notifier in &self.notifiers {
            let tick_tx = tick_tx.clone();
            let callback: Callback = Arc::new(move || {
                // Full: a refresh is already pending. Closed: draining.
                let _ = tick_tx.try_send(());
            });

            match notifier.on_update(callback) {
                Ok(subscription) => subscriptions.push(subscription),
                Err(e) => {
                    warn!(error = %e, "Failed to subscribe, stopping status line");
                    drop(subscriptions);
                    self.transition(RunnerState::Stopped);
                    return Err(e.into());
                }
            }
        }
        drop(tick_tx);

        self.transition(RunnerState::Running);
        info!(
            slots = self.board.len(),
            notifiers = self.notifiers.len(),
            "Status line running"
        );

        let lifetime = self.lifetime.clone();
        let result = self.serve(&mut tick_rx, &lifetime).await;

        self.transition(RunnerState::Draining);
        drop(tick_rx);
        drop(subscriptions);

        let outcome = result.and_then(|()| match lifetime.cause() {
            Some(cause) => Err(BarError::Upstream(cause)),
            None => Ok(()),
        });

        self.transition(RunnerState::Stopped);
        match &outcome {
            Ok(()) => info!(frames = self.encoder.frames_written(), "Status line stopped"),
            Err(e) => warn!(error = %e, "Status line stopped with error"),
        }
        outcome
    }

    /// Header, then one frame per tick. Every write races the lifetime, so
    /// a sink that stops draining never holds up shutdown.
    async fn serve(
        &mut self,
        ticks: &mut mpsc::Receiver<()>,
        lifetime: &Lifetime,
    ) -> BarResult<()> {
        // Header first: an already cancelled line still emits a valid stream.
        tokio::select! {
            biased;
            written = self.encoder.write_header() => written?,
            () = lifetime.cancelled() => return Ok(()),
        }

        loop {
            tokio::select! {
                biased;
                () = lifetime.cancelled() => return Ok(()),
                tick = ticks.recv() => {
                    if tick.is_none() {
                        // Nothing can tick anymore; wait for shutdown.
                        lifetime.cancelled().await;
                        return Ok(());
                    }
                }
            }

            let snapshot = self.board.snapshot();
            tokio::select! {
                biased;
                () = lifetime.cancelled() => {
                    debug!("Cancelled while writing a frame, abandoning it");
                    return Ok(());
                }
                written = self.encoder.encode(&snapshot) => {
                    written?;
                }
            }
        }
    }
}

impl<W: AsyncWrite + Unpin> fmt::Debug for StatusLine<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StatusLine")
            .field("state", &self.state)
            .field("slots", &self.board.len())
            .field("notifiers", &self.notifiers.len())
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

//! Provider adapter.
//!
//! A provider is a long-running producer: it pushes `StatusBlock`s into a
//! channel until it is cancelled or can make no further progress.
//! `ProviderSource` turns one into a `Notifier` + `StatusSlot` pair:
//!
//! ```text
//! provider task ──mpsc──▶ forwarder ──publish──▶ Source ──▶ callbacks
//!       ▲                     │
//!       └── Lifetime (child of the status line's root lifetime)
//! ```

use crate::error::{SourceError, SourceResult};
use crate::lifetime::Lifetime;
use crate::notifier::{Notifier, Subscription};
use crate::slot::StatusSlot;
use crate::source::Source;
use crate::subscribers::Callback;
use dsts_core::StatusBlock;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

/// Capacity of the channel between a provider and its consumer.
pub const PROVIDER_CHANNEL_CAPACITY: usize = 1;

/// How long a cancelled provider gets to return before it is aborted.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);

/// A long-running producer of status blocks.
///
/// `run` must return promptly once `cancel` fires: `Ok(())` on graceful
/// stop, an error when it can make no further progress. Any
/// `FnOnce(CancellationToken, Sender<StatusBlock>) -> impl Future` closure
/// is a provider.
pub trait Provider: Send + 'static {
    fn run(
        self: Box<Self>,
        cancel: CancellationToken,
        tx: mpsc::Sender<StatusBlock>,
    ) -> BoxFuture<'static, SourceResult<()>>;
}

impl<F, Fut> Provider for F
where
    F: FnOnce(CancellationToken, mpsc::Sender<StatusBlock>) -> Fut + Send + 'static,
    Fut: Future<Output = SourceResult<()>> + Send + 'static,
{
    fn run(
        self: Box<Self>,
        cancel: CancellationToken,
        tx: mpsc::Sender<StatusBlock>,
    ) -> BoxFuture<'static, SourceResult<()>> {
        Box::pin((*self)(cancel, tx))
    }
}

/// Build a provider from a closure.
///
/// Only pins down the closure's argument types so they needn't be spelled
/// out at the call site.
pub fn provider_fn<F, Fut>(f: F) -> F
where
    F: FnOnce(CancellationToken, mpsc::Sender<StatusBlock>) -> Fut + Send + 'static,
    Fut: Future<Output = SourceResult<()>> + Send + 'static,
{
    f
}

/// Source fed by a [`Provider`].
///
/// The provider starts on the first `on_update` and stops when that
/// subscription is removed or the parent lifetime ends. One adapter serves
/// exactly one subscription cycle: a second `on_update` fails with
/// `SourceError::AlreadyConsumed`.
pub struct ProviderSource {
    source: Source,
    lifetime: Lifetime,
    provider: Mutex<Option<Box<dyn Provider>>>,
}

impl ProviderSource {
    pub fn new(parent: &Lifetime, provider: impl Provider) -> Self {
        Self {
            source: Source::new(),
            lifetime: parent.child(),
            provider: Mutex::new(Some(Box::new(provider))),
        }
    }

    /// Slot holding the latest value produced.
    pub fn slot(&self) -> StatusSlot {
        self.source.slot()
    }

    /// Lifetime of the provider. Its cause is the provider's error, if any.
    pub fn lifetime(&self) -> &Lifetime {
        &self.lifetime
    }

    /// Whether the provider was already started by a subscription.
    pub fn is_consumed(&self) -> bool {
        self.provider.lock().is_none()
    }
}

impl Notifier for ProviderSource {
    fn on_update(&self, callback: Callback) -> SourceResult<Subscription> {
        let provider = self
            .provider
            .lock()
            .take()
            .ok_or(SourceError::AlreadyConsumed)?;

        let subscription = self.source.on_update(callback)?;
        spawn_provider(provider, self.lifetime.clone(), self.source.clone());

        let lifetime = self.lifetime.clone();
        Ok(Subscription::new(move || {
            subscription.remove();
            lifetime.cancel();
        }))
    }
}

impl std::fmt::Debug for ProviderSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderSource")
            .field("source", &self.source)
            .field("lifetime", &self.lifetime)
            .field("consumed", &self.is_consumed())
            .finish()
    }
}

/// Run `provider` and forward everything it produces into `source`.
fn spawn_provider(provider: Box<dyn Provider>, lifetime: Lifetime, source: Source) {
    let (tx, mut rx) = mpsc::channel(PROVIDER_CHANNEL_CAPACITY);
    let mut producer = tokio::spawn(provider.run(lifetime.token().clone(), tx));

    tokio::spawn(async move {
        loop {
            tokio::select! {
                biased;
                () = lifetime.cancelled() => break,
                block = rx.recv() => match block {
                    Some(block) => source.publish(block),
                    None => break,
                },
            }
        }
        // Unblocks a provider stuck on a full channel.
        drop(rx);

        let result = match tokio::time::timeout(SHUTDOWN_GRACE, &mut producer).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(SourceError::Task(join_err.to_string())),
            Err(_) => {
                warn!("Provider ignored cancellation, aborting");
                producer.abort();
                Ok(())
            }
        };

        match result {
            Ok(()) => {
                debug!("Provider stopped");
                lifetime.cancel();
            }
            Err(e) => {
                warn!(error = %e, "Provider failed");
                lifetime.cancel_with(e);
            }
        }
        trace!("Provider forwarder exited");
    });
}

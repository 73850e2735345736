//! Cancellation lifetimes with an attached cause.
//!
//! A `Lifetime` is a `CancellationToken` that also remembers *why* it was
//! cancelled. Plain shutdown leaves the cause empty; a failing provider
//! records its error. Children are cancelled with their parent and report
//! the parent's cause unless they recorded one of their own first.

use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, OnceLock};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Error recorded as the reason a lifetime ended.
pub type Cause = Arc<dyn std::error::Error + Send + Sync>;

#[derive(Clone)]
pub struct Lifetime {
    token: CancellationToken,
    /// `Some(None)` = cancelled cleanly, `Some(Some(e))` = cancelled by `e`.
    cause: Arc<OnceLock<Option<Cause>>>,
    parent: Option<Arc<Lifetime>>,
    /// Serializes "check then record" so a cause never lands after the token fired.
    guard: Arc<Mutex<()>>,
}

impl Lifetime {
    /// Create a root lifetime.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
            cause: Arc::new(OnceLock::new()),
            parent: None,
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Create a lifetime that ends when `self` ends, or earlier on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
            cause: Arc::new(OnceLock::new()),
            parent: Some(Arc::new(self.clone())),
            guard: Arc::new(Mutex::new(())),
        }
    }

    /// Cancel without a cause (clean shutdown).
    pub fn cancel(&self) {
        self.finish(None);
    }

    /// Cancel and record `err` as the cause.
    ///
    /// Only the first cancellation counts: if the lifetime already ended,
    /// cleanly or not, `err` is discarded.
    pub fn cancel_with<E>(&self, err: E)
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cancel_with_cause(Arc::new(err));
    }

    /// Same as [`Lifetime::cancel_with`] for an already shared cause.
    pub fn cancel_with_cause(&self, cause: Cause) {
        self.finish(Some(cause));
    }

    fn finish(&self, cause: Option<Cause>) {
        let _guard = self.guard.lock();
        if self.token.is_cancelled() {
            if let Some(cause) = cause {
                debug!(%cause, "Lifetime already cancelled, discarding cause");
            }
            return;
        }
        let _ = self.cause.set(cause);
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Wait until the lifetime is cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// The underlying token, for handing to producers.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Why the lifetime ended.
    ///
    /// `None` while still alive, or when it ended cleanly.
    pub fn cause(&self) -> Option<Cause> {
        if let Some(own) = self.cause.get() {
            return own.clone();
        }
        self.parent.as_ref().and_then(|parent| parent.cause())
    }
}

impl Default for Lifetime {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Lifetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifetime")
            .field("cancelled", &self.is_cancelled())
            .field("cause", &self.cause().map(|c| c.to_string()))
            .finish()
    }
}

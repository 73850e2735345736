//! Push-based status source.

use crate::error::SourceResult;
use crate::notifier::{Notifier, Subscription};
use crate::slot::StatusSlot;
use crate::subscribers::{Callback, SubscriberSet};
use dsts_core::StatusBlock;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

type Activation = Box<dyn FnOnce(Source) + Send>;

struct SourceInner {
    slot: StatusSlot,
    subscribers: SubscriberSet,
    /// Taken by the first subscriber; `None` once activated or for eager sources.
    activation: Mutex<Option<Activation>>,
}

/// Latest value of one feed plus the callbacks interested in it.
///
/// Cloning gives another handle to the same source.
#[derive(Clone)]
pub struct Source {
    inner: Arc<SourceInner>,
}

impl Source {
    /// Create a source that is fed through [`Source::publish`].
    pub fn new() -> Self {
        Self::build(None)
    }

    /// Create a source that starts producing on its first subscription.
    ///
    /// `activate` runs exactly once, on the first `on_update`, and receives
    /// a handle it can publish through (typically from a spawned task).
    pub fn lazy(activate: impl FnOnce(Source) + Send + 'static) -> Self {
        Self::build(Some(Box::new(activate)))
    }

    fn build(activation: Option<Activation>) -> Self {
        Self {
            inner: Arc::new(SourceInner {
                slot: StatusSlot::new(),
                subscribers: SubscriberSet::new(),
                activation: Mutex::new(activation),
            }),
        }
    }

    /// Store `block` as the latest value and notify every subscriber.
    pub fn publish(&self, block: StatusBlock) {
        trace!(text = %block.full_text, "Publishing block");
        self.inner.slot.store(block);
        self.inner.subscribers.notify_all();
    }

    /// The slot this source writes to.
    pub fn slot(&self) -> StatusSlot {
        self.inner.slot.clone()
    }

    pub fn latest(&self) -> Option<Arc<StatusBlock>> {
        self.inner.slot.load()
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.len()
    }

    fn activate_once(&self) {
        let activation = self.inner.activation.lock().take();
        if let Some(activate) = activation {
            debug!("Activating source on first subscription");
            activate(self.clone());
        }
    }
}

impl Default for Source {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for Source {
    fn on_update(&self, callback: Callback) -> SourceResult<Subscription> {
        let key = self.inner.subscribers.insert(callback);
        self.activate_once();

        let inner = Arc::downgrade(&self.inner);
        Ok(Subscription::new(move || {
            if let Some(inner) = inner.upgrade() {
                inner.subscribers.remove(key);
            }
        }))
    }
}

impl std::fmt::Debug for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Source")
            .field("latest", &self.latest())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

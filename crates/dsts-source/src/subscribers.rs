//! Concurrent subscriber set.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Callback fired after a source publishes a new value.
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Callbacks keyed by a monotonically increasing handle.
///
/// Callbacks are keyed by handle rather than by identity, so the same
/// closure can be registered twice and removed independently.
#[derive(Default)]
pub struct SubscriberSet {
    callbacks: DashMap<u64, Callback>,
    next_key: AtomicU64,
}

impl SubscriberSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `callback`, returning its removal handle.
    pub fn insert(&self, callback: Callback) -> u64 {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        self.callbacks.insert(key, callback);
        key
    }

    /// Remove the callback registered under `key`.
    ///
    /// Returns `false` if it was already removed.
    pub fn remove(&self, key: u64) -> bool {
        self.callbacks.remove(&key).is_some()
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Invoke every registered callback.
    ///
    /// Callbacks are collected first and run without holding any shard
    /// lock, so a callback may add or remove subscriptions itself.
    pub fn notify_all(&self) {
        let snapshot: Vec<Callback> = self
            .callbacks
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();

        for callback in snapshot {
            callback();
        }
    }
}

impl std::fmt::Debug for SubscriberSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriberSet")
            .field("len", &self.len())
            .finish()
    }
}

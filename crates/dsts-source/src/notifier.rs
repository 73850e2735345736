//! Update notification contract.

use crate::error::SourceResult;
use crate::subscribers::Callback;
use parking_lot::Mutex;
use std::sync::Arc;

/// Something that can tell subscribers a new value is available.
pub trait Notifier: Send + Sync {
    /// Register `callback` to run after every subsequent update.
    ///
    /// Must not block. The callback keeps firing until the returned
    /// `Subscription` is removed or dropped.
    fn on_update(&self, callback: Callback) -> SourceResult<Subscription>;
}

impl<T: Notifier + ?Sized> Notifier for Arc<T> {
    fn on_update(&self, callback: Callback) -> SourceResult<Subscription> {
        (**self).on_update(callback)
    }
}

type RemoveFn = Box<dyn FnOnce() + Send>;

/// Handle to a registered callback.
///
/// Dropping the handle unsubscribes. `remove` is idempotent and safe to
/// call after the notifier itself is gone.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    remove: Mutex<Option<RemoveFn>>,
}

impl Subscription {
    pub fn new(remove: impl FnOnce() + Send + 'static) -> Self {
        Self {
            remove: Mutex::new(Some(Box::new(remove))),
        }
    }

    /// A subscription with nothing to undo.
    pub fn inert() -> Self {
        Self {
            remove: Mutex::new(None),
        }
    }

    /// Unsubscribe. Later calls do nothing.
    pub fn remove(&self) {
        let remove = self.remove.lock().take();
        if let Some(remove) = remove {
            remove();
        }
    }

    pub fn is_active(&self) -> bool {
        self.remove.lock().is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.remove();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_remove_runs_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let sub = Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(sub.is_active());
        sub.remove();
        sub.remove();
        assert!(!sub.is_active());
        drop(sub);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_removes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        drop(Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_concurrent_remove() {
        let calls = Arc::new(AtomicUsize::new(0));
        let c = calls.clone();
        let sub = Arc::new(Subscription::new(move || {
            c.fetch_add(1, Ordering::SeqCst);
        }));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let sub = sub.clone();
                std::thread::spawn(move || sub.remove())
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}

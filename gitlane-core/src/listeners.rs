use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::error;

pub type Listener = Arc<dyn Fn() + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
struct Inner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(ListenerId, Listener)>>,
}

/// Ordered set of zero-argument change callbacks.
///
/// Cloning yields another handle to the same set, so a callback may capture a
/// handle and subscribe or unsubscribe while a notification is running. Such
/// changes take effect from the next notification.
#[derive(Clone, Default)]
pub struct ListenerSet {
    inner: Arc<Inner>,
}

impl ListenerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&self, callback: F) -> ListenerId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = ListenerId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(callback)));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Invoke every callback once, in registration order.
    ///
    /// A panicking callback is logged and skipped; the rest still run.
    pub fn notify(&self) {
        let snapshot: Vec<(ListenerId, Listener)> = self.lock().clone();

        for (id, callback) in snapshot {
            if panic::catch_unwind(AssertUnwindSafe(|| callback())).is_err() {
                error!("Change listener {:?} panicked", id);
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener)>> {
        // Callbacks never run under this lock, so poisoning only means a
        // panic inside Vec bookkeeping; the list itself is still usable.
        self.inner
            .listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl std::fmt::Debug for ListenerSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ListenerSet")
            .field("listeners", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_notify_runs_in_registration_order() {
        let listeners = ListenerSet::new();
        let calls = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let calls = Arc::clone(&calls);
            listeners.subscribe(move || calls.lock().unwrap().push(tag));
        }

        listeners.notify();

        assert_eq!(*calls.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_unsubscribe() {
        let listeners = ListenerSet::new();
        let count = Arc::new(AtomicUsize::new(0));

        let counter = Arc::clone(&count);
        let id = listeners.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.notify();
        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));
        listeners.notify();

        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(listeners.is_empty());
    }

    #[test]
    fn test_unsubscribe_from_inside_callback() {
        let listeners = ListenerSet::new();
        let count = Arc::new(AtomicUsize::new(0));
        let own_id = Arc::new(Mutex::new(None));

        let handle = listeners.clone();
        let counter = Arc::clone(&count);
        let slot = Arc::clone(&own_id);
        let id = listeners.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
            if let Some(id) = *slot.lock().unwrap() {
                handle.unsubscribe(id);
            }
        });
        *own_id.lock().unwrap() = Some(id);

        listeners.notify();
        listeners.notify();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_subscribe_from_inside_callback_applies_next_time() {
        let listeners = ListenerSet::new();
        let count = Arc::new(AtomicUsize::new(0));

        let handle = listeners.clone();
        let counter = Arc::clone(&count);
        listeners.subscribe(move || {
            let counter = Arc::clone(&counter);
            handle.subscribe(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        });

        listeners.notify();
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert_eq!(listeners.len(), 2);

        listeners.notify();
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_panicking_listener_does_not_stop_others() {
        let listeners = ListenerSet::new();
        let count = Arc::new(AtomicUsize::new(0));

        listeners.subscribe(|| panic!("listener failure"));
        let counter = Arc::clone(&count);
        listeners.subscribe(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        listeners.notify();

        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}

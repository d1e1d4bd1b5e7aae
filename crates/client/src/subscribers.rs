//! Status-change subscriber registry
//!
//! Subscribers are invoked synchronously, in registration order, with the
//! new status value. Each notification round runs against a snapshot of the
//! registry, so a callback may unsubscribe itself or any other subscriber
//! without disturbing delivery for that round.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use vaclink_protocol::LinkStatus;

/// Callback invoked on every status change.
///
/// On native targets callbacks must be Send + Sync so the client can be
/// shared across tasks. On WASM (single-threaded) the bounds are dropped,
/// allowing closures over Rc and DOM handles.
#[cfg(not(target_arch = "wasm32"))]
pub type StatusCallback = dyn Fn(LinkStatus) + Send + Sync;
#[cfg(target_arch = "wasm32")]
pub type StatusCallback = dyn Fn(LinkStatus);

struct Entry {
    id: u64,
    callback: Arc<StatusCallback>,
}

/// Registry of status subscribers, keyed by monotonically increasing tokens.
pub(crate) struct SubscriberSet {
    entries: Mutex<Vec<Entry>>,
    next_id: AtomicU64,
}

impl SubscriberSet {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Vec<Entry>> {
        // A poisoned lock only means a callback panicked mid-round; the list
        // itself is still structurally sound.
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub(crate) fn insert(set: &Arc<Self>, callback: Arc<StatusCallback>) -> Subscription {
        let id = set.next_id.fetch_add(1, Ordering::Relaxed);
        set.lock().push(Entry { id, callback });
        Subscription {
            id,
            set: Arc::downgrade(set),
        }
    }

    fn remove(&self, id: u64) {
        self.lock().retain(|entry| entry.id != id);
    }

    /// Deliver `status` to every subscriber registered at the start of the
    /// round, in registration order.
    pub(crate) fn notify(&self, status: LinkStatus) {
        let snapshot: Vec<Arc<StatusCallback>> = {
            let entries = self.lock();
            entries.iter().map(|entry| entry.callback.clone()).collect()
        };

        for callback in snapshot {
            callback(status);
        }
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.lock().len()
    }
}

/// Unsubscribe capability returned by
/// [`SerialLinkClient::on_status_change`](crate::SerialLinkClient::on_status_change).
///
/// Cancelling is idempotent and safe at any point, including from inside a
/// notification callback. Dropping a `Subscription` without cancelling it
/// leaves the subscriber registered.
pub struct Subscription {
    id: u64,
    set: Weak<SubscriberSet>,
}

impl Subscription {
    /// Remove the subscriber. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        if let Some(set) = self.set.upgrade() {
            set.remove(self.id);
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn record(log: &Arc<Mutex<Vec<(u32, LinkStatus)>>>, tag: u32) -> Arc<StatusCallback> {
        let log = log.clone();
        Arc::new(move |status| log.lock().unwrap().push((tag, status)))
    }

    #[test]
    fn test_delivery_in_registration_order() {
        let set = SubscriberSet::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let _a = SubscriberSet::insert(&set, record(&log, 1));
        let _b = SubscriberSet::insert(&set, record(&log, 2));
        let _c = SubscriberSet::insert(&set, record(&log, 3));

        set.notify(LinkStatus::Connecting);

        let seen = log.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                (1, LinkStatus::Connecting),
                (2, LinkStatus::Connecting),
                (3, LinkStatus::Connecting),
            ]
        );
    }

    #[test]
    fn test_cancel_removes_subscriber() {
        let set = SubscriberSet::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let a = SubscriberSet::insert(&set, record(&log, 1));
        let _b = SubscriberSet::insert(&set, record(&log, 2));

        a.cancel();
        set.notify(LinkStatus::Connected);

        let seen = log.lock().unwrap().clone();
        assert_eq!(seen, vec![(2, LinkStatus::Connected)]);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let set = SubscriberSet::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        let a = SubscriberSet::insert(&set, record(&log, 1));
        a.cancel();
        a.cancel();

        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_unsubscribe_during_notification_round() {
        let set = SubscriberSet::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        // First subscriber cancels the second mid-round; the second must
        // still receive this round's notification.
        let victim: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let victim_slot = victim.clone();
        let log_a = log.clone();
        let _a = SubscriberSet::insert(&set, Arc::new(move |status| {
            log_a.lock().unwrap().push((1, status));
            if let Some(sub) = victim_slot.lock().unwrap().as_ref() {
                sub.cancel();
            }
        }));

        let b = SubscriberSet::insert(&set, record(&log, 2));
        *victim.lock().unwrap() = Some(b);

        set.notify(LinkStatus::Connecting);

        let seen = log.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![(1, LinkStatus::Connecting), (2, LinkStatus::Connecting)],
            "cancellation mid-round must not skip subscribers already scheduled"
        );

        // Next round runs without the cancelled subscriber
        set.notify(LinkStatus::Connected);
        let seen = log.lock().unwrap().clone();
        assert_eq!(seen.last(), Some(&(1, LinkStatus::Connected)));
    }

    #[test]
    fn test_self_unsubscribe_during_notification_does_not_panic() {
        let set = SubscriberSet::new();
        let slot: Arc<Mutex<Option<Subscription>>> = Arc::new(Mutex::new(None));

        let slot_inner = slot.clone();
        let sub = SubscriberSet::insert(&set, Arc::new(move |_| {
            if let Some(sub) = slot_inner.lock().unwrap().as_ref() {
                sub.cancel();
            }
        }));
        *slot.lock().unwrap() = Some(sub);

        set.notify(LinkStatus::Connecting);
        assert_eq!(set.len(), 0);
    }

    #[test]
    fn test_cancel_after_registry_dropped_is_safe() {
        let set = SubscriberSet::new();
        let a = SubscriberSet::insert(&set, Arc::new(|_| {}));
        drop(set);
        a.cancel();
    }
}

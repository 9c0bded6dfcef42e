//! Live subscription registry for full-snapshot delivery.
//!
//! # Responsibility
//! - Track live observers of the "all notes" query.
//! - Fan out immutable snapshots and prune observers that went away.
//!
//! # Invariants
//! - Releasing a subscription is idempotent and never fails.
//! - Delivering to a dead observer never errors; the observer is dropped.
//! - A sink that panics is treated as dead; the panic never reaches the
//!   store lock.
//! - Sinks are invoked while the store lock is held, so they must not block
//!   or call back into the store.

use crate::model::note::Note;
use log::{debug, warn};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Complete, ordered copy of all notes at one store revision.
///
/// Notes are shared read-only between every subscriber of the same fan-out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    revision: u64,
    notes: Arc<[Note]>,
}

impl Snapshot {
    pub(crate) fn new(revision: u64, notes: Vec<Note>) -> Self {
        Self {
            revision,
            notes: notes.into(),
        }
    }

    /// Number of completed writes the snapshot reflects.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Notes ordered by `createdDate DESC, id DESC`.
    pub fn notes(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }
}

/// Receiving end of a live subscription.
///
/// `deliver` runs while the store holds its write lock. A panic inside it is
/// caught and the sink is pruned like a disconnected observer.
pub trait SnapshotSink: Send + Sync {
    /// Hands one snapshot to the observer.
    ///
    /// Returns `false` when the observer is gone; the registry then forgets it.
    fn deliver(&self, snapshot: Snapshot) -> bool;
}

impl SnapshotSink for Sender<Snapshot> {
    fn deliver(&self, snapshot: Snapshot) -> bool {
        self.send(snapshot).is_ok()
    }
}

/// Registry-unique subscription identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SubscriptionId(u64);

impl Display for SubscriptionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
pub(crate) struct SubscriberRegistry {
    next_id: AtomicU64,
    sinks: Mutex<BTreeMap<SubscriptionId, Arc<dyn SnapshotSink>>>,
}

impl SubscriberRegistry {
    pub(crate) fn register(self: &Arc<Self>, sink: Arc<dyn SnapshotSink>) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.sinks().insert(id, sink);
        debug!("event=subscription_register module=store status=ok subscription_id={id}");

        Subscription {
            id,
            registry: Arc::downgrade(self),
            released: AtomicBool::new(false),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.sinks().len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.sinks().is_empty()
    }

    fn contains(&self, id: SubscriptionId) -> bool {
        self.sinks().contains_key(&id)
    }

    fn remove(&self, id: SubscriptionId) -> bool {
        self.sinks().remove(&id).is_some()
    }

    /// Delivers `snapshot` to every live sink and returns how many accepted it.
    pub(crate) fn publish(&self, snapshot: &Snapshot) -> usize {
        let targets: Vec<(SubscriptionId, Arc<dyn SnapshotSink>)> = self
            .sinks()
            .iter()
            .map(|(id, sink)| (*id, Arc::clone(sink)))
            .collect();

        let mut delivered = 0;
        for (id, sink) in targets {
            if deliver_guarded(id, sink.as_ref(), snapshot.clone()) {
                delivered += 1;
            } else {
                self.prune(id);
            }
        }
        delivered
    }

    /// Delivers `snapshot` to one sink; a released id is a silent no-op.
    pub(crate) fn deliver_to(&self, id: SubscriptionId, snapshot: Snapshot) -> bool {
        let Some(sink) = self.sinks().get(&id).cloned() else {
            return false;
        };

        if deliver_guarded(id, sink.as_ref(), snapshot) {
            true
        } else {
            self.prune(id);
            false
        }
    }

    fn prune(&self, id: SubscriptionId) {
        if self.remove(id) {
            debug!("event=subscription_prune module=store status=ok subscription_id={id} reason=observer_gone");
        }
    }

    fn sinks(&self) -> MutexGuard<'_, BTreeMap<SubscriptionId, Arc<dyn SnapshotSink>>> {
        // The map stays consistent across a panicking holder; keep using it.
        self.sinks.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn deliver_guarded(id: SubscriptionId, sink: &dyn SnapshotSink, snapshot: Snapshot) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(snapshot))) {
        Ok(accepted) => accepted,
        Err(_) => {
            warn!(
                "event=subscription_deliver module=store status=error subscription_id={id} error_code=sink_panicked"
            );
            false
        }
    }
}

/// Cancellation handle for a live "all notes" subscription.
///
/// Dropping the handle releases it as well. The handle only weakly refers to
/// the store, so it may safely outlive it.
pub struct Subscription {
    id: SubscriptionId,
    registry: Weak<SubscriberRegistry>,
    released: AtomicBool,
}

impl Subscription {
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    /// Whether snapshots are still being delivered to this subscription.
    ///
    /// Turns `false` after release, after the store is dropped, or after the
    /// observer was pruned as dead.
    pub fn is_active(&self) -> bool {
        if self.released.load(Ordering::Acquire) {
            return false;
        }
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.contains(self.id))
    }

    /// Stops further deliveries. Calling this more than once is a no-op.
    pub fn unsubscribe(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            if registry.remove(self.id) {
                debug!(
                    "event=subscription_release module=store status=ok subscription_id={}",
                    self.id
                );
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.released.load(Ordering::Relaxed))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::{Snapshot, SnapshotSink, SubscriberRegistry};
    use std::sync::mpsc;
    use std::sync::Arc;

    #[test]
    fn publish_prunes_sinks_whose_receiver_is_gone() {
        let registry = Arc::new(SubscriberRegistry::default());
        let (live_tx, live_rx) = mpsc::channel::<Snapshot>();
        let (dead_tx, dead_rx) = mpsc::channel::<Snapshot>();
        let live = registry.register(Arc::new(live_tx));
        let dead = registry.register(Arc::new(dead_tx));
        drop(dead_rx);

        let delivered = registry.publish(&Snapshot::new(1, Vec::new()));

        assert_eq!(delivered, 1);
        assert_eq!(live_rx.try_recv().unwrap().revision(), 1);
        assert!(live.is_active());
        assert!(!dead.is_active());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unsubscribe_is_idempotent_and_survives_registry_drop() {
        let registry = Arc::new(SubscriberRegistry::default());
        let (tx, _rx) = mpsc::channel::<Snapshot>();
        let subscription = registry.register(Arc::new(tx));

        subscription.unsubscribe();
        subscription.unsubscribe();
        assert!(registry.is_empty());

        let (tx, _rx) = mpsc::channel::<Snapshot>();
        let orphan = registry.register(Arc::new(tx));
        drop(registry);
        assert!(!orphan.is_active());
        orphan.unsubscribe();
    }

    #[test]
    fn deliver_to_released_id_is_noop() {
        let registry = Arc::new(SubscriberRegistry::default());
        let (tx, rx) = mpsc::channel::<Snapshot>();
        let subscription = registry.register(Arc::new(tx));
        let id = subscription.id();
        drop(subscription);

        assert!(!registry.deliver_to(id, Snapshot::new(3, Vec::new())));
        assert!(rx.try_recv().is_err());
    }

    struct PanickingSink;

    impl SnapshotSink for PanickingSink {
        fn deliver(&self, _snapshot: Snapshot) -> bool {
            panic!("observer bug");
        }
    }

    #[test]
    fn panicking_sink_is_pruned_and_others_still_receive() {
        let registry = Arc::new(SubscriberRegistry::default());
        let broken = registry.register(Arc::new(PanickingSink));
        let (tx, rx) = mpsc::channel::<Snapshot>();
        let healthy = registry.register(Arc::new(tx));

        let delivered = registry.publish(&Snapshot::new(4, Vec::new()));

        assert_eq!(delivered, 1);
        assert_eq!(rx.try_recv().unwrap().revision(), 4);
        assert!(!broken.is_active());
        assert!(healthy.is_active());
    }

    #[test]
    fn sender_sink_reports_disconnect() {
        let (tx, rx) = mpsc::channel::<Snapshot>();
        assert!(tx.deliver(Snapshot::new(0, Vec::new())));
        drop(rx);
        assert!(!tx.deliver(Snapshot::new(1, Vec::new())));
    }
}

//! Listener registry and subscription handles.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

type Listener<S> = Arc<dyn Fn(&S, u64) + Send + Sync>;

/// Ordered set of store listeners.
///
/// Notification works on a snapshot of the registered listeners, so a
/// listener may subscribe, unsubscribe or dispatch while being notified.
/// Changes made during a notification round take effect from the next one.
///
/// Listeners receive the snapshot together with its version. Notifications
/// from concurrent dispatches may interleave, so only the version orders them.
pub(crate) struct ListenerRegistry<S> {
    listeners: Mutex<Vec<(u64, Listener<S>)>>,
    next_id: AtomicU64,
}

impl<S> ListenerRegistry<S> {
    pub(crate) fn new() -> Self {
        Self {
            listeners: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    pub(crate) fn register<F>(self: &Arc<Self>, listener: F) -> Subscription<S>
    where
        F: Fn(&S, u64) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((id, Arc::new(listener)));

        Subscription {
            registry: Arc::downgrade(self),
            id,
        }
    }

    fn remove(&self, id: u64) -> bool {
        let mut listeners = self.listeners.lock().unwrap_or_else(PoisonError::into_inner);
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Call every listener, in subscription order, with `state` at `version`.
    ///
    /// Returns the number of listeners notified.
    pub(crate) fn notify(&self, state: &S, version: u64) -> usize {
        let snapshot: Vec<Listener<S>> = self
            .listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in &snapshot {
            listener(state, version);
        }

        snapshot.len()
    }

    pub(crate) fn len(&self) -> usize {
        self.listeners
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Token returned by `Store::subscribe`.
///
/// The listener stays registered until [`Subscription::unsubscribe`] is
/// called; dropping the token does not remove it.
#[must_use = "keep the subscription to be able to unsubscribe the listener"]
pub struct Subscription<S> {
    registry: Weak<ListenerRegistry<S>>,
    id: u64,
}

impl<S> Subscription<S> {
    /// Identifier of the registered listener
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Deregister the listener.
    ///
    /// Returns false if the listener was already gone (or the store dropped).
    pub fn unsubscribe(self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.remove(self.id))
    }
}

impl<S> std::fmt::Debug for Subscription<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &(self.registry.strong_count() > 0))
            .finish()
    }
}

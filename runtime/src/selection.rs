//! Derived, change-tracked views of store state.
//!
//! A [`Selection`] is what a rendering layer binds to: it holds the latest
//! value of one slice of the state, is only updated when that slice actually
//! changes, and unsubscribes itself when dropped.

use crate::StoreError;
use crate::subscription::Subscription;
use tokio::sync::watch;

/// Selected value tagged with the store version it was computed from.
#[derive(Debug)]
pub(crate) struct Selected<T> {
    version: u64,
    value: T,
}

impl<T: PartialEq> Selected<T> {
    pub(crate) const fn new(version: u64, value: T) -> Self {
        Self { version, value }
    }

    /// Move to `value` taken at `version`.
    ///
    /// Older versions are ignored. Returns true only when the value changed,
    /// so watchers are not woken for equal slices.
    pub(crate) fn advance(&mut self, version: u64, value: T) -> bool {
        if version <= self.version {
            return false;
        }
        self.version = version;
        if self.value == value {
            false
        } else {
            self.value = value;
            true
        }
    }
}

/// The latest value of a selected slice of store state.
///
/// Created by `Store::select`.
pub struct Selection<S, T> {
    receiver: watch::Receiver<Selected<T>>,
    subscription: Option<Subscription<S>>,
}

impl<S, T> Selection<S, T> {
    pub(crate) const fn new(
        receiver: watch::Receiver<Selected<T>>,
        subscription: Subscription<S>,
    ) -> Self {
        Self {
            receiver,
            subscription: Some(subscription),
        }
    }

    /// Current value of the slice
    #[must_use]
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.receiver.borrow().value.clone()
    }

    /// Read the current value without cloning it
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.receiver.borrow().value)
    }

    /// Returns true if the slice changed since it was last observed
    #[must_use]
    pub fn has_changed(&self) -> bool {
        self.receiver.has_changed().unwrap_or(false)
    }

    /// Wait for the slice to take a new, different value and return it
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::StoreDropped`] if the store went away.
    pub async fn changed(&mut self) -> Result<T, StoreError>
    where
        T: Clone,
    {
        self.receiver
            .changed()
            .await
            .map_err(|_| StoreError::StoreDropped)?;
        Ok(self.receiver.borrow_and_update().value.clone())
    }
}

impl<S, T> Drop for Selection<S, T> {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            let _ = subscription.unsubscribe();
        }
    }
}

impl<S, T> std::fmt::Debug for Selection<S, T>
where
    T: std::fmt::Debug,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Selection")
            .field("value", &self.receiver.borrow().value)
            .field("subscription", &self.subscription)
            .finish()
    }
}

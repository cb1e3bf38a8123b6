//! Snapshot cache for one entity collection
//!
//! Holds the last full snapshot of a collection and broadcasts every
//! replacement. New observers immediately receive the current snapshot,
//! then every later one in the order `set` was called.

use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures_core::Stream;
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// Immutable, wholesale-replaced copy of a collection
pub type Snapshot<T> = Arc<Vec<T>>;

/// Stream of snapshots as returned by [`EntityCache::observe`]
pub type SnapshotStream<T> = Pin<Box<dyn Stream<Item = Snapshot<T>> + Send>>;

/// Default number of snapshots buffered per observer before it lags
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Current-value holder with a replaying observation stream
pub struct EntityCache<T> {
    current: Mutex<Snapshot<T>>,
    sender: broadcast::Sender<Snapshot<T>>,
}

impl<T: Send + Sync + 'static> Default for EntityCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for EntityCache<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityCache")
            .field("len", &self.lock().len())
            .field("observers", &self.sender.receiver_count())
            .finish()
    }
}

impl<T: Send + Sync + 'static> EntityCache<T> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create an empty cache buffering up to `capacity` snapshots per observer
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            current: Mutex::new(Arc::new(Vec::new())),
            sender,
        }
    }

    /// Replace the held snapshot and notify every observer once
    pub fn set(&self, items: Vec<T>) {
        let snapshot = Arc::new(items);
        let mut current = self.lock();
        *current = Arc::clone(&snapshot);
        // No observers is fine
        let _ = self.sender.send(snapshot);
    }

    /// Derive a replacement from the held snapshot under one lock
    ///
    /// `change` returns `None` to leave the cache as it is. Returns whether
    /// a new snapshot was published.
    pub fn update(&self, change: impl FnOnce(&[T]) -> Option<Vec<T>>) -> bool {
        let mut current = self.lock();
        let Some(items) = change(current.as_slice()) else {
            return false;
        };
        let snapshot = Arc::new(items);
        *current = Arc::clone(&snapshot);
        let _ = self.sender.send(snapshot);
        true
    }

    /// Latest snapshot; never touches the network
    pub fn current(&self) -> Snapshot<T> {
        Arc::clone(&self.lock())
    }

    /// Stream replaying the latest snapshot, then every replacement
    ///
    /// The stream only ends when the cache itself is dropped. An observer
    /// that falls more than the channel capacity behind loses the oldest
    /// snapshots and resumes with the oldest one still buffered, so it still
    /// ends up at the latest value.
    pub fn observe(&self) -> SnapshotStream<T> {
        // Subscribe under the same lock `set` takes so no replacement is
        // missed or delivered twice.
        let (initial, mut receiver) = {
            let current = self.lock();
            (Arc::clone(&current), self.sender.subscribe())
        };

        Box::pin(async_stream::stream! {
            yield initial;
            loop {
                match receiver.recv().await {
                    Ok(snapshot) => yield snapshot,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Cache observer lagged, skipping snapshots");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        })
    }

    /// Number of live observers
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> EntityCache<T> {
    fn lock(&self) -> MutexGuard<'_, Snapshot<T>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

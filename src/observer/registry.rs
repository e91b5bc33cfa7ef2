use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use super::ItemWatcher;
use crate::DetailKind;
use crate::ItemId;

/// One registered watcher binding.
struct WatcherBinding {
    id: u64,
    watcher: Arc<dyn ItemWatcher>,
}

/// Per-item watcher registry.
///
/// Bindings are grouped by item id in a concurrent map, so registration and
/// dispatch contend per shard rather than on one global lock. Dispatch
/// snapshots the bindings of an id and releases the shard before invoking any
/// callback, which makes re-entrant registration and unregistration from
/// inside a callback safe.
pub(crate) struct WatcherRegistry {
    watchers: DashMap<ItemId, Vec<WatcherBinding>>,
    next_id: AtomicU64,
}

impl WatcherRegistry {
    pub(crate) fn new() -> Self {
        Self {
            watchers: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    /// Binds `watcher` to `item_id` and returns the binding token.
    ///
    /// Registering the same watcher object for the same item again does not
    /// create a second binding; the existing token is returned.
    pub(crate) fn register(&self, item_id: ItemId, watcher: Arc<dyn ItemWatcher>) -> u64 {
        let mut bindings = self.watchers.entry(item_id.clone()).or_default();
        if let Some(existing) = bindings
            .iter()
            .find(|binding| Arc::ptr_eq(&binding.watcher, &watcher))
        {
            return existing.id;
        }
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        bindings.push(WatcherBinding { id, watcher });
        trace!(watcher_id = id, item = %item_id, "watcher registered");
        id
    }

    /// Removes one binding. Atomically drops the whole entry when it was the
    /// last binding for the item.
    pub(crate) fn unregister(&self, item_id: &ItemId, id: u64) {
        self.watchers.remove_if_mut(item_id, |_item, bindings| {
            bindings.retain(|binding| binding.id != id);
            bindings.is_empty()
        });
        trace!(watcher_id = id, item = %item_id, "watcher unregistered");
    }

    /// Invokes `item_changed` on every watcher of every id in `ids`.
    pub(crate) fn dispatch_changed(&self, ids: &[ItemId], details: &[DetailKind]) {
        for id in ids {
            for watcher in self.snapshot(id) {
                watcher.item_changed(details);
            }
        }
    }

    /// Invokes `item_removed` on every watcher of every id in `ids`.
    pub(crate) fn dispatch_removed(&self, ids: &[ItemId]) {
        for id in ids {
            for watcher in self.snapshot(id) {
                watcher.item_removed();
            }
        }
    }

    /// The bindings of one id at this instant. The shard guard is released
    /// before this returns, so callers can invoke callbacks freely.
    fn snapshot(&self, item_id: &ItemId) -> Vec<Arc<dyn ItemWatcher>> {
        self.watchers
            .get(item_id)
            .map(|bindings| {
                bindings
                    .iter()
                    .map(|binding| Arc::clone(&binding.watcher))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Test-only count of the bindings for one item.
    #[cfg(test)]
    pub(crate) fn watcher_count(&self, item_id: &ItemId) -> usize {
        self.watchers.get(item_id).map(|b| b.len()).unwrap_or(0)
    }

    /// Test-only count of the items with at least one binding.
    #[cfg(test)]
    pub(crate) fn watched_item_count(&self) -> usize {
        self.watchers.len()
    }
}

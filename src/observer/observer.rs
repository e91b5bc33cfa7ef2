use std::sync::Arc;
use std::sync::Weak;

use tracing::trace;

use super::ItemWatcher;
use crate::manager::ManagerShared;
use crate::ItemId;

/// RAII binding of one [`ItemWatcher`] to one item.
///
/// Created through [`OrganizerManager::observe_item`]; dropping it removes
/// the binding. Holds its manager weakly, so an observer outliving the
/// manager degrades to an inert token instead of keeping the manager alive.
///
/// [`OrganizerManager::observe_item`]: crate::OrganizerManager::observe_item
pub struct ItemObserver {
    item_id: ItemId,
    token: u64,
    manager: Weak<ManagerShared>,
}

impl ItemObserver {
    pub(crate) fn new(
        shared: &Arc<ManagerShared>,
        item_id: ItemId,
        watcher: Arc<dyn ItemWatcher>,
    ) -> Self {
        let token = shared.registry().register(item_id.clone(), watcher);
        Self {
            item_id,
            token,
            manager: Arc::downgrade(shared),
        }
    }

    /// The item this observer is bound to.
    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }
}

impl Drop for ItemObserver {
    fn drop(&mut self) {
        if let Some(shared) = self.manager.upgrade() {
            shared.registry().unregister(&self.item_id, self.token);
        } else {
            trace!(item = %self.item_id, "observer dropped after its manager");
        }
    }
}

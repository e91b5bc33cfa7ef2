use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::Weak;
use std::time::Duration;

use tracing::debug;
use tracing::warn;

use super::ManagerShared;
use crate::requests::CollectionRemoveParams;
use crate::requests::CollectionSaveParams;
use crate::requests::ItemFetchForExportParams;
use crate::requests::ItemFetchParams;
use crate::requests::ItemIdFetchParams;
use crate::requests::ItemOccurrenceFetchParams;
use crate::requests::ItemRemoveParams;
use crate::requests::ItemSaveParams;
use crate::requests::RequestCore;
use crate::ChangeEvent;
use crate::Collection;
use crate::CollectionId;
use crate::DetailKind;
use crate::ErrorKind;
use crate::ErrorMap;
use crate::FetchHint;
use crate::FilterKind;
use crate::Item;
use crate::ItemId;
use crate::ItemKind;
use crate::ItemObserver;
use crate::ItemWatcher;
use crate::ManagerBuilder;
use crate::OperationKind;
use crate::RequestParams;
use crate::RequestResults;

/// Client façade over one engine.
///
/// Offers two levels of access: the typed request types for asynchronous,
/// cancellable operations, and the convenience methods here, each of which
/// drives one request to completion and publishes its outcome in the
/// manager's last-error slot. The slot holds exactly one outcome and is
/// overwritten by every operation, so interrogate it before issuing the next
/// call.
///
/// The manager is the sole owner of its engine wiring: dropping it stops
/// event dispatch, and outstanding requests or observers degrade to inert
/// handles rather than keeping the machinery alive.
pub struct OrganizerManager {
    shared: Arc<ManagerShared>,
}

impl OrganizerManager {
    /// A manager over a fresh in-memory engine with default configuration.
    /// Must be called inside a tokio runtime.
    pub fn new() -> crate::Result<Self> {
        ManagerBuilder::new().build()
    }

    pub fn builder() -> ManagerBuilder {
        ManagerBuilder::new()
    }

    pub(crate) fn from_shared(shared: Arc<ManagerShared>) -> Self {
        Self { shared }
    }

    pub(crate) fn downgrade(&self) -> Weak<ManagerShared> {
        Arc::downgrade(&self.shared)
    }

    /// Name of the engine backing this manager.
    pub fn manager_name(&self) -> String {
        self.shared.engine.manager_name()
    }

    /// Overall outcome of the most recent operation.
    pub fn error(&self) -> ErrorKind {
        self.shared.error()
    }

    /// Per-element outcomes of the most recent batched operation.
    pub fn error_map(&self) -> ErrorMap {
        self.shared.error_map()
    }

    pub fn supported_filters(&self) -> Vec<FilterKind> {
        self.shared.engine.supported_filters()
    }

    pub fn supported_item_types(&self) -> Vec<ItemKind> {
        self.shared.engine.supported_item_types()
    }

    pub fn supported_item_details(&self, kind: ItemKind) -> Vec<DetailKind> {
        self.shared.engine.supported_item_details(kind)
    }

    pub fn default_collection_id(&self) -> CollectionId {
        self.shared.engine.default_collection_id()
    }

    /// Registers a channel that receives every engine change event. Closed
    /// channels are pruned on the next emission.
    pub fn register_change_listener(
        &self,
        listener: tokio::sync::mpsc::UnboundedSender<ChangeEvent>,
    ) {
        self.shared.add_listener(listener);
    }

    /// Binds `watcher` to one item; the returned observer owns the binding
    /// and removes it when dropped.
    pub fn observe_item(&self, item_id: ItemId, watcher: Arc<dyn ItemWatcher>) -> ItemObserver {
        ItemObserver::new(&self.shared, item_id, watcher)
    }

    /// One persisted record by id, or `None` (recording
    /// [`ErrorKind::DoesNotExist`]) when it is unknown.
    pub async fn item(&self, id: &ItemId, hint: FetchHint) -> Option<Item> {
        let params = ItemFetchParams {
            ids: vec![id.clone()],
            hint,
            ..Default::default()
        };
        self.items(params).await.into_iter().next()
    }

    /// Items of the engine's expanded view matching `params`.
    pub async fn items(&self, params: ItemFetchParams) -> Vec<Item> {
        let (core, _) = self
            .run_request(OperationKind::ItemFetch, RequestParams::ItemFetch(params))
            .await;
        result_items(&core)
    }

    /// Ids of the persisted records matching `params`.
    pub async fn item_ids(&self, params: ItemIdFetchParams) -> Vec<ItemId> {
        let (core, _) = self
            .run_request(OperationKind::ItemIdFetch, RequestParams::ItemIdFetch(params))
            .await;
        match core.with_inner(|inner| inner.results.clone()) {
            RequestResults::ItemIds(ids) => ids,
            _ => Vec::new(),
        }
    }

    /// Persisted records for synchronization or export; parents and
    /// exceptions as stored, nothing generated.
    pub async fn items_for_export(&self, params: ItemFetchForExportParams) -> Vec<Item> {
        let (core, _) = self
            .run_request(
                OperationKind::ItemFetchForExport,
                RequestParams::ItemFetchForExport(params),
            )
            .await;
        result_items(&core)
    }

    /// Occurrences of one recurring parent within the window of `params`.
    pub async fn item_occurrences(&self, params: ItemOccurrenceFetchParams) -> Vec<Item> {
        let (core, _) = self
            .run_request(
                OperationKind::ItemOccurrenceFetch,
                RequestParams::ItemOccurrenceFetch(params),
            )
            .await;
        result_items(&core)
    }

    /// Persists one item, writing its assigned id and stored form back into
    /// `item`. Returns whether the save succeeded.
    pub async fn save_item(&self, item: &mut Item) -> bool {
        let mut batch = vec![item.clone()];
        let ok = self.save_items(&mut batch).await;
        if let Some(saved) = batch.into_iter().next() {
            *item = saved;
        }
        ok
    }

    /// Persists one item restricted to the masked detail categories, writing
    /// the stored form back into `item` on success.
    pub async fn save_item_with_mask(
        &self,
        item: &mut Item,
        detail_mask: BTreeSet<DetailKind>,
    ) -> bool {
        let mut batch = vec![item.clone()];
        let ok = self.save_items_with_mask(&mut batch, detail_mask).await;
        if let Some(saved) = batch.into_iter().next() {
            *item = saved;
        }
        ok
    }

    /// Persists a batch wholesale. Successful elements are written back in
    /// place; failed ones keep their input form and get an entry in
    /// [`error_map`](Self::error_map).
    pub async fn save_items(&self, items: &mut [Item]) -> bool {
        self.save_items_inner(items, BTreeSet::new()).await
    }

    /// Persists a batch restricted to the masked detail categories.
    pub async fn save_items_with_mask(
        &self,
        items: &mut [Item],
        detail_mask: BTreeSet<DetailKind>,
    ) -> bool {
        self.save_items_inner(items, detail_mask).await
    }

    async fn save_items_inner(&self, items: &mut [Item], detail_mask: BTreeSet<DetailKind>) -> bool {
        let params = ItemSaveParams {
            items: items.to_vec(),
            detail_mask,
        };
        let (core, error) = self
            .run_request(OperationKind::ItemSave, RequestParams::ItemSave(params))
            .await;
        // Saved records correspond to the successful inputs in order.
        let error_map = core.error_map();
        let mut saved = result_items(&core).into_iter();
        for (index, slot) in items.iter_mut().enumerate() {
            if error_map.contains_key(&index) {
                continue;
            }
            if let Some(record) = saved.next() {
                *slot = record;
            }
        }
        !error.is_error()
    }

    /// Removes one item (and, for recurring parents, its exception records).
    pub async fn remove_item(&self, id: &ItemId) -> bool {
        self.remove_items(std::slice::from_ref(id)).await
    }

    /// Removes a batch of items; per-element failures land in
    /// [`error_map`](Self::error_map).
    pub async fn remove_items(&self, ids: &[ItemId]) -> bool {
        let params = ItemRemoveParams { ids: ids.to_vec() };
        let (_, error) = self
            .run_request(OperationKind::ItemRemove, RequestParams::ItemRemove(params))
            .await;
        !error.is_error()
    }

    pub async fn collections(&self) -> Vec<Collection> {
        let (core, _) = self
            .run_request(OperationKind::CollectionFetch, RequestParams::CollectionFetch)
            .await;
        match core.with_inner(|inner| inner.results.clone()) {
            RequestResults::Collections(collections) => collections,
            _ => Vec::new(),
        }
    }

    /// One collection by id, or `None` (recording
    /// [`ErrorKind::DoesNotExist`]) when it is unknown.
    pub async fn collection(&self, id: &CollectionId) -> Option<Collection> {
        let found = self
            .collections()
            .await
            .into_iter()
            .find(|collection| collection.id.as_ref() == Some(id));
        if found.is_none() {
            self.shared.record_error(ErrorKind::DoesNotExist, ErrorMap::new());
        }
        found
    }

    /// The collection items land in when saved without one.
    pub async fn default_collection(&self) -> Option<Collection> {
        let id = self.default_collection_id();
        self.collection(&id).await
    }

    /// Persists one collection, writing its assigned id back into
    /// `collection`.
    pub async fn save_collection(&self, collection: &mut Collection) -> bool {
        let params = CollectionSaveParams {
            collections: vec![collection.clone()],
        };
        let (core, error) = self
            .run_request(
                OperationKind::CollectionSave,
                RequestParams::CollectionSave(params),
            )
            .await;
        if let RequestResults::Collections(saved) =
            core.with_inner(|inner| inner.results.clone())
        {
            if let Some(record) = saved.into_iter().next() {
                *collection = record;
            }
        }
        !error.is_error()
    }

    /// Removes one collection and every item in it. The default collection
    /// cannot be removed.
    pub async fn remove_collection(&self, id: &CollectionId) -> bool {
        let params = CollectionRemoveParams {
            ids: vec![id.clone()],
        };
        let (_, error) = self
            .run_request(
                OperationKind::CollectionRemove,
                RequestParams::CollectionRemove(params),
            )
            .await;
        !error.is_error()
    }

    /// Drives one request to completion within the configured wait bound and
    /// records its outcome in the last-error slot.
    async fn run_request(
        &self,
        kind: OperationKind,
        params: RequestParams,
    ) -> (Arc<RequestCore>, ErrorKind) {
        let core = RequestCore::new(kind, params);
        core.bind_manager(self.downgrade());
        if let Err(err) = core.start() {
            warn!(request = %kind, error = %err, "request could not start");
            self.shared.record_error(ErrorKind::Unspecified, ErrorMap::new());
            return (core, ErrorKind::Unspecified);
        }
        let timeout = Duration::from_millis(self.shared.config.request.timeout_ms);
        if !core.wait_for_finished(timeout).await {
            core.cancel();
            warn!(request = %kind, ?timeout, "request timed out; cancellation requested");
            self.shared.record_error(ErrorKind::Timeout, core.error_map());
            return (core, ErrorKind::Timeout);
        }
        let error = core.error();
        self.shared.record_error(error, core.error_map());
        (core, error)
    }
}

impl Drop for OrganizerManager {
    fn drop(&mut self) {
        self.shared.shutdown();
        debug!(manager = %self.shared.engine.manager_name(), "organizer manager closed");
    }
}

fn result_items(core: &Arc<RequestCore>) -> Vec<Item> {
    match core.with_inner(|inner| inner.results.clone()) {
        RequestResults::Items(items) => items,
        _ => Vec::new(),
    }
}

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use nanoid::nanoid;
use parking_lot::Mutex;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::debug;
use tracing::trace;

use super::eval::expand_occurrences;
use super::eval::filter_matches;
use super::eval::in_window;
use crate::compare_items;
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
use crate::OrganizerEngine;
use crate::RequestParams;
use crate::RequestProxy;
use crate::RequestResults;
use crate::requests::CollectionRemoveParams;
use crate::requests::CollectionSaveParams;
use crate::requests::ItemFetchForExportParams;
use crate::requests::ItemFetchParams;
use crate::requests::ItemIdFetchParams;
use crate::requests::ItemOccurrenceFetchParams;
use crate::requests::ItemRemoveParams;
use crate::requests::ItemSaveParams;

/// Occurrences generated per series when neither the request nor the
/// engine's constructor says otherwise.
pub(crate) const DEFAULT_EXPANSION_CAP: usize = 1000;

/// Volatile reference engine backed by ordered in-memory maps.
///
/// Every store built here starts with one default collection that cannot be
/// removed. Identifiers carry a per-instance scope, so ids from one engine
/// instance are foreign to every other.
pub struct MemOrganizerEngine {
    scope: String,
    store: RwLock<MemStore>,
    next_id: AtomicU64,
    listeners: Mutex<Vec<mpsc::UnboundedSender<ChangeEvent>>>,
    default_collection_id: CollectionId,
    expansion_cap: usize,
}

#[derive(Default)]
struct MemStore {
    items: BTreeMap<ItemId, Item>,
    collections: BTreeMap<CollectionId, Collection>,
}

impl MemOrganizerEngine {
    pub fn new() -> Self {
        Self::with_expansion_cap(DEFAULT_EXPANSION_CAP)
    }

    /// An engine whose unbounded expansions stop after `cap` generated
    /// occurrences per series.
    pub fn with_expansion_cap(cap: usize) -> Self {
        let scope = nanoid!(8);
        let default_collection_id = CollectionId::new(scope.clone(), 0);
        let mut default_collection = Collection::named("default");
        default_collection.id = Some(default_collection_id.clone());
        let mut store = MemStore::default();
        store
            .collections
            .insert(default_collection_id.clone(), default_collection);
        Self {
            scope,
            store: RwLock::new(store),
            next_id: AtomicU64::new(1),
            listeners: Mutex::new(Vec::new()),
            default_collection_id,
            expansion_cap: cap,
        }
    }

    fn notify(&self, event: ChangeEvent) {
        let mut listeners = self.listeners.lock();
        listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn handle_item_fetch(&self, request: &RequestProxy, params: ItemFetchParams) {
        if !params.ids.is_empty() {
            return self.handle_item_fetch_by_id(request, &params.ids, &params.hint);
        }
        let mut view = {
            let store = self.store.read();
            self.expanded_view(&store, params.start, params.end)
        };
        view.retain(|item| filter_matches(item, &params.filter));
        view.sort_by(|a, b| compare_items(a, b, &params.sorting));
        if params.max_count >= 0 {
            view.truncate(params.max_count as usize);
        }
        apply_hint(&mut view, &params.hint);
        request.update_results(RequestResults::Items(view));
        request.finish(ErrorKind::NoError);
    }

    fn handle_item_fetch_by_id(&self, request: &RequestProxy, ids: &[ItemId], hint: &FetchHint) {
        let mut found = Vec::new();
        let mut error_map = ErrorMap::new();
        {
            let store = self.store.read();
            for (index, id) in ids.iter().enumerate() {
                match store.items.get(id) {
                    Some(item) => found.push(item.clone()),
                    None => {
                        error_map.insert(index, ErrorKind::DoesNotExist);
                    }
                }
            }
        }
        apply_hint(&mut found, hint);
        let overall = first_error(&error_map);
        request.update_results(RequestResults::Items(found));
        request.update_error_map(error_map);
        request.finish(overall);
    }

    fn handle_item_id_fetch(&self, request: &RequestProxy, params: ItemIdFetchParams) {
        let mut records: Vec<Item> = {
            let store = self.store.read();
            store.items.values().cloned().collect()
        };
        records.retain(|item| in_window(item, params.start, params.end));
        records.retain(|item| filter_matches(item, &params.filter));
        records.sort_by(|a, b| compare_items(a, b, &params.sorting));
        let ids = records.into_iter().filter_map(|item| item.id).collect();
        request.update_results(RequestResults::ItemIds(ids));
        request.finish(ErrorKind::NoError);
    }

    fn handle_item_fetch_for_export(
        &self,
        request: &RequestProxy,
        params: ItemFetchForExportParams,
    ) {
        let mut records: Vec<Item> = {
            let store = self.store.read();
            store.items.values().cloned().collect()
        };
        records.retain(|item| in_window(item, params.start, params.end));
        records.retain(|item| filter_matches(item, &params.filter));
        records.sort_by(|a, b| compare_items(a, b, &params.sorting));
        apply_hint(&mut records, &params.hint);
        request.update_results(RequestResults::Items(records));
        request.finish(ErrorKind::NoError);
    }

    fn handle_item_occurrence_fetch(
        &self,
        request: &RequestProxy,
        params: ItemOccurrenceFetchParams,
    ) {
        let Some(parent_id) = params.parent.as_ref().and_then(|p| p.id.clone()) else {
            request.finish(ErrorKind::BadArgument);
            return;
        };
        let (parent, exceptions) = {
            let store = self.store.read();
            let Some(parent) = store.items.get(&parent_id).cloned() else {
                drop(store);
                request.finish(ErrorKind::DoesNotExist);
                return;
            };
            let exceptions: Vec<Item> = store
                .items
                .values()
                .filter(|item| {
                    item.parent
                        .as_ref()
                        .map_or(false, |link| link.parent_id == parent_id)
                })
                .cloned()
                .collect();
            (parent, exceptions)
        };
        let cap = if params.max_occurrences >= 0 {
            params.max_occurrences as usize
        } else {
            self.expansion_cap
        };
        let mut occurrences = if parent.recurrence.is_some() {
            expand_occurrences(&parent, &exceptions, params.start, params.end, cap)
        } else if in_window(&parent, params.start, params.end) {
            // Non-recurring parents are their own single occurrence.
            vec![parent]
        } else {
            Vec::new()
        };
        occurrences.truncate(cap);
        apply_hint(&mut occurrences, &params.hint);
        request.update_results(RequestResults::Items(occurrences));
        request.finish(ErrorKind::NoError);
    }

    fn handle_item_save(&self, request: &RequestProxy, params: ItemSaveParams) {
        let mut saved = Vec::new();
        let mut error_map = ErrorMap::new();
        let mut added = Vec::new();
        let mut changed = Vec::new();
        {
            let mut store = self.store.write();
            for (index, incoming) in params.items.iter().enumerate() {
                match self.save_one(&mut store, incoming, &params.detail_mask) {
                    Ok((item, created)) => {
                        if let Some(id) = item.id.clone() {
                            if created {
                                added.push(id);
                            } else {
                                changed.push(id);
                            }
                        }
                        saved.push(item);
                    }
                    Err(kind) => {
                        debug!(index, error = %kind, "item save element rejected");
                        error_map.insert(index, kind);
                    }
                }
            }
        }
        let overall = first_error(&error_map);
        request.update_results(RequestResults::Items(saved));
        request.update_error_map(error_map);
        request.finish(overall);
        if !added.is_empty() {
            self.notify(ChangeEvent::ItemsAdded(added));
        }
        if !changed.is_empty() {
            self.notify(ChangeEvent::ItemsChanged {
                ids: changed,
                details: params.detail_mask.iter().copied().collect(),
            });
        }
    }

    /// Validates and stores one incoming item. Returns the persisted record
    /// and whether it was newly created.
    fn save_one(
        &self,
        store: &mut MemStore,
        incoming: &Item,
        mask: &BTreeSet<DetailKind>,
    ) -> Result<(Item, bool), ErrorKind> {
        let mut existing = None;
        if let Some(id) = &incoming.id {
            if id.scope() != self.scope {
                return Err(ErrorKind::DoesNotExist);
            }
            match store.items.get(id) {
                Some(stored) => existing = Some(stored.clone()),
                None => return Err(ErrorKind::DoesNotExist),
            }
        }

        let collection_id = match &incoming.collection_id {
            Some(id) => {
                if !store.collections.contains_key(id) {
                    return Err(ErrorKind::InvalidCollection);
                }
                id.clone()
            }
            None => existing
                .as_ref()
                .and_then(|stored| stored.collection_id.clone())
                .unwrap_or_else(|| self.default_collection_id.clone()),
        };

        // A mask narrows the update to the masked categories; for a new item
        // it seeds the record with only those details.
        let mut merged = match (&existing, mask.is_empty()) {
            (Some(stored), false) => {
                let mut updated = stored.clone();
                updated.merge_masked(incoming, mask);
                updated
            }
            (None, false) => {
                let mut created = Item::new(incoming.kind);
                created.merge_masked(incoming, mask);
                created
            }
            (_, true) => incoming.clone(),
        };
        merged.collection_id = Some(collection_id);

        validate_item(store, &merged)?;

        let (id, created) = match &incoming.id {
            Some(id) => (id.clone(), false),
            None => (
                ItemId::new(
                    self.scope.clone(),
                    self.next_id.fetch_add(1, Ordering::Relaxed),
                ),
                true,
            ),
        };
        merged.id = Some(id.clone());
        store.items.insert(id, merged.clone());
        Ok((merged, created))
    }

    fn handle_item_remove(&self, request: &RequestProxy, params: ItemRemoveParams) {
        let mut removed = Vec::new();
        let mut error_map = ErrorMap::new();
        {
            let mut store = self.store.write();
            for (index, id) in params.ids.iter().enumerate() {
                if id.scope() != self.scope || store.items.remove(id).is_none() {
                    error_map.insert(index, ErrorKind::DoesNotExist);
                    continue;
                }
                removed.push(id.clone());
                // Exception occurrences die with their parent.
                let orphans: Vec<ItemId> = store
                    .items
                    .values()
                    .filter(|item| {
                        item.parent
                            .as_ref()
                            .map_or(false, |link| link.parent_id == *id)
                    })
                    .filter_map(|item| item.id.clone())
                    .collect();
                for orphan in orphans {
                    store.items.remove(&orphan);
                    removed.push(orphan);
                }
            }
        }
        let overall = first_error(&error_map);
        request.update_error_map(error_map);
        request.finish(overall);
        if !removed.is_empty() {
            self.notify(ChangeEvent::ItemsRemoved(removed));
        }
    }

    fn handle_collection_fetch(&self, request: &RequestProxy) {
        let collections: Vec<Collection> = {
            let store = self.store.read();
            store.collections.values().cloned().collect()
        };
        request.update_results(RequestResults::Collections(collections));
        request.finish(ErrorKind::NoError);
    }

    fn handle_collection_save(&self, request: &RequestProxy, params: CollectionSaveParams) {
        let mut saved = Vec::new();
        let mut error_map = ErrorMap::new();
        let mut added = Vec::new();
        let mut changed = Vec::new();
        {
            let mut store = self.store.write();
            for (index, incoming) in params.collections.iter().enumerate() {
                let (id, created) = match &incoming.id {
                    Some(id) => {
                        if id.scope() != self.scope || !store.collections.contains_key(id) {
                            error_map.insert(index, ErrorKind::DoesNotExist);
                            continue;
                        }
                        (id.clone(), false)
                    }
                    None => (
                        CollectionId::new(
                            self.scope.clone(),
                            self.next_id.fetch_add(1, Ordering::Relaxed),
                        ),
                        true,
                    ),
                };
                let mut record = incoming.clone();
                record.id = Some(id.clone());
                store.collections.insert(id.clone(), record.clone());
                if created {
                    added.push(id);
                } else {
                    changed.push(id);
                }
                saved.push(record);
            }
        }
        let overall = first_error(&error_map);
        request.update_results(RequestResults::Collections(saved));
        request.update_error_map(error_map);
        request.finish(overall);
        if !added.is_empty() {
            self.notify(ChangeEvent::CollectionsAdded(added));
        }
        if !changed.is_empty() {
            self.notify(ChangeEvent::CollectionsChanged(changed));
        }
    }

    fn handle_collection_remove(&self, request: &RequestProxy, params: CollectionRemoveParams) {
        let mut removed = Vec::new();
        let mut removed_items = Vec::new();
        let mut error_map = ErrorMap::new();
        {
            let mut store = self.store.write();
            for (index, id) in params.ids.iter().enumerate() {
                if *id == self.default_collection_id {
                    error_map.insert(index, ErrorKind::Permissions);
                    continue;
                }
                if id.scope() != self.scope || store.collections.remove(id).is_none() {
                    error_map.insert(index, ErrorKind::DoesNotExist);
                    continue;
                }
                removed.push(id.clone());
                // Items of the collection go with it, and exception
                // occurrences go with their removed parents.
                let mut doomed: BTreeSet<ItemId> = store
                    .items
                    .values()
                    .filter(|item| item.collection_id.as_ref() == Some(id))
                    .filter_map(|item| item.id.clone())
                    .collect();
                let orphans: Vec<ItemId> = store
                    .items
                    .values()
                    .filter(|item| {
                        item.parent
                            .as_ref()
                            .map_or(false, |link| doomed.contains(&link.parent_id))
                    })
                    .filter_map(|item| item.id.clone())
                    .collect();
                doomed.extend(orphans);
                for item_id in doomed {
                    store.items.remove(&item_id);
                    removed_items.push(item_id);
                }
            }
        }
        let overall = first_error(&error_map);
        request.update_error_map(error_map);
        request.finish(overall);
        if !removed.is_empty() {
            self.notify(ChangeEvent::CollectionsRemoved(removed));
        }
        if !removed_items.is_empty() {
            self.notify(ChangeEvent::ItemsRemoved(removed_items));
        }
    }

    /// The client-facing view of the store: plain items as records, recurring
    /// parents replaced by their occurrences, exception records folded into
    /// their parent's series.
    fn expanded_view(
        &self,
        store: &MemStore,
        start: Option<chrono::DateTime<chrono::Utc>>,
        end: Option<chrono::DateTime<chrono::Utc>>,
    ) -> Vec<Item> {
        let mut view = Vec::new();
        for item in store.items.values() {
            if item.parent.is_some() {
                continue;
            }
            if item.recurrence.is_some() {
                let exceptions: Vec<Item> = store
                    .items
                    .values()
                    .filter(|candidate| {
                        candidate
                            .parent
                            .as_ref()
                            .zip(item.id.as_ref())
                            .map_or(false, |(link, id)| link.parent_id == *id)
                    })
                    .cloned()
                    .collect();
                view.extend(expand_occurrences(
                    item,
                    &exceptions,
                    start,
                    end,
                    self.expansion_cap,
                ));
            } else if in_window(item, start, end) {
                view.push(item.clone());
            }
        }
        view
    }
}

impl Default for MemOrganizerEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OrganizerEngine for MemOrganizerEngine {
    fn manager_name(&self) -> String {
        "mem".to_string()
    }

    async fn execute(&self, request: RequestProxy) {
        let Some(params) = request.params() else {
            trace!("request dropped before execution");
            return;
        };
        if request.is_cancel_requested() {
            request.finish(ErrorKind::NoError);
            return;
        }
        match params {
            RequestParams::ItemFetch(p) => self.handle_item_fetch(&request, p),
            RequestParams::ItemIdFetch(p) => self.handle_item_id_fetch(&request, p),
            RequestParams::ItemFetchForExport(p) => self.handle_item_fetch_for_export(&request, p),
            RequestParams::ItemOccurrenceFetch(p) => {
                self.handle_item_occurrence_fetch(&request, p)
            }
            RequestParams::ItemSave(p) => self.handle_item_save(&request, p),
            RequestParams::ItemRemove(p) => self.handle_item_remove(&request, p),
            RequestParams::CollectionFetch => self.handle_collection_fetch(&request),
            RequestParams::CollectionSave(p) => self.handle_collection_save(&request, p),
            RequestParams::CollectionRemove(p) => self.handle_collection_remove(&request, p),
        }
    }

    fn register_change_listener(&self, listener: mpsc::UnboundedSender<ChangeEvent>) {
        self.listeners.lock().push(listener);
    }

    fn supported_filters(&self) -> Vec<FilterKind> {
        vec![
            FilterKind::Default,
            FilterKind::Collection,
            FilterKind::Detail,
            FilterKind::Intersection,
            FilterKind::Union,
            FilterKind::Not,
        ]
    }

    fn supported_item_types(&self) -> Vec<ItemKind> {
        vec![
            ItemKind::Event,
            ItemKind::EventOccurrence,
            ItemKind::Todo,
            ItemKind::TodoOccurrence,
            ItemKind::Journal,
            ItemKind::Note,
        ]
    }

    fn supported_item_details(&self, kind: ItemKind) -> Vec<DetailKind> {
        match kind {
            ItemKind::Event => vec![
                DetailKind::DisplayLabel,
                DetailKind::Description,
                DetailKind::Location,
                DetailKind::Comment,
                DetailKind::Tag,
                DetailKind::EventTime,
                DetailKind::Recurrence,
                DetailKind::Priority,
                DetailKind::ExtendedDetail,
            ],
            ItemKind::EventOccurrence => vec![
                DetailKind::DisplayLabel,
                DetailKind::Description,
                DetailKind::Location,
                DetailKind::Comment,
                DetailKind::Tag,
                DetailKind::EventTime,
                DetailKind::Priority,
                DetailKind::Parent,
                DetailKind::ExtendedDetail,
            ],
            ItemKind::Todo => vec![
                DetailKind::DisplayLabel,
                DetailKind::Description,
                DetailKind::Comment,
                DetailKind::Tag,
                DetailKind::EventTime,
                DetailKind::Recurrence,
                DetailKind::Priority,
                DetailKind::ExtendedDetail,
            ],
            ItemKind::TodoOccurrence => vec![
                DetailKind::DisplayLabel,
                DetailKind::Description,
                DetailKind::Comment,
                DetailKind::Tag,
                DetailKind::EventTime,
                DetailKind::Priority,
                DetailKind::Parent,
                DetailKind::ExtendedDetail,
            ],
            ItemKind::Journal => vec![
                DetailKind::DisplayLabel,
                DetailKind::Description,
                DetailKind::Comment,
                DetailKind::Tag,
                DetailKind::EventTime,
                DetailKind::ExtendedDetail,
            ],
            ItemKind::Note => vec![
                DetailKind::DisplayLabel,
                DetailKind::Description,
                DetailKind::Comment,
                DetailKind::Tag,
                DetailKind::ExtendedDetail,
            ],
        }
    }

    fn default_collection_id(&self) -> CollectionId {
        self.default_collection_id.clone()
    }
}

fn validate_item(store: &MemStore, item: &Item) -> Result<(), ErrorKind> {
    if let Some(rule) = item.recurrence {
        if rule.interval == 0 {
            return Err(ErrorKind::InvalidDetail);
        }
    }
    if let Some(range) = item.time_range {
        if let (Some(start), Some(end)) = (range.start, range.end) {
            if end < start {
                return Err(ErrorKind::InvalidDetail);
            }
        }
    }
    if item.kind.is_occurrence() {
        if item.recurrence.is_some() {
            return Err(ErrorKind::InvalidOccurrence);
        }
        match &item.parent {
            None => return Err(ErrorKind::InvalidOccurrence),
            Some(link) => {
                if !store.items.contains_key(&link.parent_id) {
                    return Err(ErrorKind::InvalidOccurrence);
                }
            }
        }
    } else if item.parent.is_some() {
        return Err(ErrorKind::InvalidItemType);
    }
    Ok(())
}

fn apply_hint(items: &mut [Item], hint: &FetchHint) {
    if hint.is_unrestricted() {
        return;
    }
    for item in items {
        item.strip_details(hint.detail_kinds());
    }
}

fn first_error(error_map: &ErrorMap) -> ErrorKind {
    error_map
        .values()
        .next()
        .copied()
        .unwrap_or(ErrorKind::NoError)
}

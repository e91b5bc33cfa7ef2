use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::DateTime;
use chrono::Utc;

use super::macros::impl_request_common;
use super::ItemFetchForExportParams;
use super::ItemFetchParams;
use super::ItemIdFetchParams;
use super::ItemOccurrenceFetchParams;
use super::ItemRemoveParams;
use super::ItemSaveParams;
use super::OperationKind;
use super::RequestCore;
use super::RequestParams;
use super::RequestResults;
use crate::DetailKind;
use crate::FetchHint;
use crate::Filter;
use crate::Item;
use crate::ItemId;
use crate::SortOrder;

/// Asynchronous fetch of organizer items from the expanded view: recurring
/// parents are replaced by their occurrences, interleaved with plain items.
///
/// With [`set_item_ids`](Self::set_item_ids) the fetch instead targets
/// exactly those persisted records and the filter is ignored.
pub struct ItemFetchRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl ItemFetchRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::ItemFetch,
                RequestParams::ItemFetch(ItemFetchParams::default()),
            ),
        }
    }

    pub fn set_item_ids(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetch(p) = &mut inner.params {
                p.ids = ids.into_iter().collect();
            }
        });
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetch(p) = &mut inner.params {
                p.filter = filter;
            }
        });
    }

    pub fn set_start_date(&mut self, start: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetch(p) = &mut inner.params {
                p.start = start;
            }
        });
    }

    pub fn set_end_date(&mut self, end: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetch(p) = &mut inner.params {
                p.end = end;
            }
        });
    }

    /// Caps the number of returned items; negative lets the engine decide.
    pub fn set_max_count(&mut self, max_count: i32) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetch(p) = &mut inner.params {
                p.max_count = max_count;
            }
        });
    }

    pub fn set_sorting(&mut self, sorting: impl IntoIterator<Item = SortOrder>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetch(p) = &mut inner.params {
                p.sorting = sorting.into_iter().collect();
            }
        });
    }

    pub fn set_fetch_hint(&mut self, hint: FetchHint) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetch(p) = &mut inner.params {
                p.hint = hint;
            }
        });
    }

    pub fn filter(&self) -> Filter {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemFetch(p) => p.filter.clone(),
            _ => Filter::default(),
        })
    }

    pub fn fetch_hint(&self) -> FetchHint {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemFetch(p) => p.hint.clone(),
            _ => FetchHint::default(),
        })
    }

    /// Current result snapshot. While the request is active an engine may
    /// replace this incrementally; every read observes one consistent
    /// snapshot.
    pub fn items(&self) -> Vec<Item> {
        self.core.with_inner(|inner| match &inner.results {
            RequestResults::Items(items) => items.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(ItemFetchRequest);

/// Asynchronous fetch of the ids of persisted items matching a filter,
/// optionally scoped to a time window.
pub struct ItemIdFetchRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl ItemIdFetchRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::ItemIdFetch,
                RequestParams::ItemIdFetch(ItemIdFetchParams::default()),
            ),
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemIdFetch(p) = &mut inner.params {
                p.filter = filter;
            }
        });
    }

    pub fn set_start_date(&mut self, start: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemIdFetch(p) = &mut inner.params {
                p.start = start;
            }
        });
    }

    pub fn set_end_date(&mut self, end: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemIdFetch(p) = &mut inner.params {
                p.end = end;
            }
        });
    }

    pub fn set_sorting(&mut self, sorting: impl IntoIterator<Item = SortOrder>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemIdFetch(p) = &mut inner.params {
                p.sorting = sorting.into_iter().collect();
            }
        });
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.core.with_inner(|inner| match &inner.results {
            RequestResults::ItemIds(ids) => ids.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(ItemIdFetchRequest);

/// Asynchronous fetch of persisted records for synchronization or export:
/// recurring parents and exception occurrences as stored, nothing generated.
pub struct ItemFetchForExportRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl ItemFetchForExportRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::ItemFetchForExport,
                RequestParams::ItemFetchForExport(ItemFetchForExportParams::default()),
            ),
        }
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetchForExport(p) = &mut inner.params {
                p.filter = filter;
            }
        });
    }

    pub fn set_start_date(&mut self, start: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetchForExport(p) = &mut inner.params {
                p.start = start;
            }
        });
    }

    pub fn set_end_date(&mut self, end: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetchForExport(p) = &mut inner.params {
                p.end = end;
            }
        });
    }

    pub fn set_sorting(&mut self, sorting: impl IntoIterator<Item = SortOrder>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetchForExport(p) = &mut inner.params {
                p.sorting = sorting.into_iter().collect();
            }
        });
    }

    pub fn set_fetch_hint(&mut self, hint: FetchHint) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemFetchForExport(p) = &mut inner.params {
                p.hint = hint;
            }
        });
    }

    pub fn items(&self) -> Vec<Item> {
        self.core.with_inner(|inner| match &inner.results {
            RequestResults::Items(items) => items.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(ItemFetchForExportRequest);

/// Asynchronous expansion of one recurring item into its occurrences within
/// a time window.
///
/// Persisted exception occurrences and generated instances come back
/// interleaved in chronological order. Both window edges are independently
/// optional: an absent start matches anything up to the end, an absent end
/// matches anything from the start onward, both absent applies no time
/// filtering at all.
pub struct ItemOccurrenceFetchRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl ItemOccurrenceFetchRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::ItemOccurrenceFetch,
                RequestParams::ItemOccurrenceFetch(ItemOccurrenceFetchParams::default()),
            ),
        }
    }

    /// Sets the recurring item whose occurrences are sought.
    pub fn set_parent_item(&mut self, parent: Item) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemOccurrenceFetch(p) = &mut inner.params {
                p.parent = Some(parent);
            }
        });
    }

    pub fn set_start_date(&mut self, start: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemOccurrenceFetch(p) = &mut inner.params {
                p.start = start;
            }
        });
    }

    pub fn set_end_date(&mut self, end: Option<DateTime<Utc>>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemOccurrenceFetch(p) = &mut inner.params {
                p.end = end;
            }
        });
    }

    /// Caps the number of returned occurrences. A negative value leaves the
    /// cap to the engine.
    pub fn set_max_occurrences(&mut self, max_occurrences: i32) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemOccurrenceFetch(p) = &mut inner.params {
                p.max_occurrences = max_occurrences;
            }
        });
    }

    /// Attaches a fetch hint, forwarded to the engine verbatim. Occurrences
    /// fetched under a restrictive hint must not be saved back; see
    /// [`FetchHint`].
    pub fn set_fetch_hint(&mut self, hint: FetchHint) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemOccurrenceFetch(p) = &mut inner.params {
                p.hint = hint;
            }
        });
    }

    pub fn parent_item(&self) -> Option<Item> {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemOccurrenceFetch(p) => p.parent.clone(),
            _ => None,
        })
    }

    pub fn start_date(&self) -> Option<DateTime<Utc>> {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemOccurrenceFetch(p) => p.start,
            _ => None,
        })
    }

    pub fn end_date(&self) -> Option<DateTime<Utc>> {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemOccurrenceFetch(p) => p.end,
            _ => None,
        })
    }

    pub fn max_occurrences(&self) -> i32 {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemOccurrenceFetch(p) => p.max_occurrences,
            _ => -1,
        })
    }

    pub fn fetch_hint(&self) -> FetchHint {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemOccurrenceFetch(p) => p.hint.clone(),
            _ => FetchHint::default(),
        })
    }

    /// Occurrences expanded so far, in chronological order.
    pub fn item_occurrences(&self) -> Vec<Item> {
        self.core.with_inner(|inner| match &inner.results {
            RequestResults::Items(items) => items.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(ItemOccurrenceFetchRequest);

/// Asynchronous save of one or more items.
///
/// Batch saves are not transactional: each element succeeds or fails on its
/// own, failures land in the error map keyed by input index, and the saved
/// records (with engine-assigned ids) appear in [`items`](Self::items).
pub struct ItemSaveRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl ItemSaveRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::ItemSave,
                RequestParams::ItemSave(ItemSaveParams::default()),
            ),
        }
    }

    pub fn set_items(&mut self, items: impl IntoIterator<Item = Item>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemSave(p) = &mut inner.params {
                p.items = items.into_iter().collect();
            }
        });
    }

    /// Restricts the save to the given detail categories; details outside the
    /// mask keep their stored values. An empty mask saves items wholesale.
    pub fn set_detail_mask(&mut self, mask: impl IntoIterator<Item = DetailKind>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemSave(p) = &mut inner.params {
                p.detail_mask = mask.into_iter().collect();
            }
        });
    }

    pub fn detail_mask(&self) -> BTreeSet<DetailKind> {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemSave(p) => p.detail_mask.clone(),
            _ => BTreeSet::new(),
        })
    }

    /// The records as the engine persisted them, aligned with the elements
    /// that succeeded.
    pub fn items(&self) -> Vec<Item> {
        self.core.with_inner(|inner| match &inner.results {
            RequestResults::Items(items) => items.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(ItemSaveRequest);

/// Asynchronous removal of one or more items by id.
pub struct ItemRemoveRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl ItemRemoveRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::ItemRemove,
                RequestParams::ItemRemove(ItemRemoveParams::default()),
            ),
        }
    }

    pub fn set_item_ids(&mut self, ids: impl IntoIterator<Item = ItemId>) {
        self.core.with_inner(|inner| {
            if let RequestParams::ItemRemove(p) = &mut inner.params {
                p.ids = ids.into_iter().collect();
            }
        });
    }

    pub fn item_ids(&self) -> Vec<ItemId> {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::ItemRemove(p) => p.ids.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(ItemRemoveRequest);

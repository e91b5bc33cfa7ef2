use std::collections::BTreeSet;

use chrono::DateTime;
use chrono::Utc;

use super::OperationKind;
use crate::Collection;
use crate::CollectionId;
use crate::DetailKind;
use crate::FetchHint;
use crate::Filter;
use crate::Item;
use crate::ItemId;
use crate::SortOrder;

/// Operation-specific input block of a request.
///
/// An engine receives a cloned snapshot of this through
/// [`RequestProxy::params`](super::RequestProxy::params) and matches on the
/// variant its request kind implies.
#[derive(Debug, Clone)]
pub enum RequestParams {
    ItemFetch(ItemFetchParams),
    ItemIdFetch(ItemIdFetchParams),
    ItemFetchForExport(ItemFetchForExportParams),
    ItemOccurrenceFetch(ItemOccurrenceFetchParams),
    ItemSave(ItemSaveParams),
    ItemRemove(ItemRemoveParams),
    CollectionFetch,
    CollectionSave(CollectionSaveParams),
    CollectionRemove(CollectionRemoveParams),
}

/// Parameters of an expanded-view item fetch.
///
/// When `ids` is non-empty the fetch targets exactly those persisted records
/// and the filter is ignored; otherwise the filter selects from the expanded
/// view within the optional time window.
#[derive(Debug, Clone)]
pub struct ItemFetchParams {
    pub ids: Vec<ItemId>,
    pub filter: Filter,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Negative means the engine decides the cap
    pub max_count: i32,
    pub sorting: Vec<SortOrder>,
    pub hint: FetchHint,
}

impl Default for ItemFetchParams {
    fn default() -> Self {
        Self {
            ids: Vec::new(),
            filter: Filter::default(),
            start: None,
            end: None,
            max_count: -1,
            sorting: Vec::new(),
            hint: FetchHint::default(),
        }
    }
}

/// Parameters of an id projection over persisted records, optionally scoped
/// to a time window.
#[derive(Debug, Clone, Default)]
pub struct ItemIdFetchParams {
    pub filter: Filter,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub sorting: Vec<SortOrder>,
}

/// Parameters of a persisted-records fetch: recurring parents and exception
/// occurrences are returned as stored, nothing is generated.
#[derive(Debug, Clone, Default)]
pub struct ItemFetchForExportParams {
    pub filter: Filter,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    pub sorting: Vec<SortOrder>,
    pub hint: FetchHint,
}

/// Parameters of an occurrence expansion for one recurring parent.
///
/// An absent `start` means "anything up to `end`", an absent `end` means
/// "anything from `start` onward"; both absent means unbounded.
#[derive(Debug, Clone)]
pub struct ItemOccurrenceFetchParams {
    pub parent: Option<Item>,
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
    /// Negative means the engine decides the cap; non-negative is a hard
    /// upper bound on returned occurrences
    pub max_occurrences: i32,
    pub hint: FetchHint,
}

impl Default for ItemOccurrenceFetchParams {
    fn default() -> Self {
        Self {
            parent: None,
            start: None,
            end: None,
            max_occurrences: -1,
            hint: FetchHint::default(),
        }
    }
}

/// Parameters of a save. An empty `detail_mask` saves items wholesale; a
/// non-empty mask restricts the update to the masked detail categories.
#[derive(Debug, Clone, Default)]
pub struct ItemSaveParams {
    pub items: Vec<Item>,
    pub detail_mask: BTreeSet<DetailKind>,
}

#[derive(Debug, Clone, Default)]
pub struct ItemRemoveParams {
    pub ids: Vec<ItemId>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionSaveParams {
    pub collections: Vec<Collection>,
}

#[derive(Debug, Clone, Default)]
pub struct CollectionRemoveParams {
    pub ids: Vec<CollectionId>,
}

/// Operation-specific output block of a request.
///
/// Engines install fully-formed snapshots of this; a reader at any instant
/// sees a consistent set, never a partial write.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestResults {
    /// Operations without a payload (removals)
    None,
    Items(Vec<Item>),
    ItemIds(Vec<ItemId>),
    Collections(Vec<Collection>),
}

impl RequestResults {
    /// The empty value a request of `kind` starts out with.
    pub(crate) fn empty_for(kind: OperationKind) -> Self {
        match kind {
            OperationKind::ItemFetch
            | OperationKind::ItemFetchForExport
            | OperationKind::ItemOccurrenceFetch
            | OperationKind::ItemSave => RequestResults::Items(Vec::new()),
            OperationKind::ItemIdFetch => RequestResults::ItemIds(Vec::new()),
            OperationKind::CollectionFetch | OperationKind::CollectionSave => {
                RequestResults::Collections(Vec::new())
            }
            OperationKind::ItemRemove | OperationKind::CollectionRemove => RequestResults::None,
        }
    }

    /// True when the snapshot carries no records at all.
    pub fn is_empty(&self) -> bool {
        match self {
            RequestResults::None => true,
            RequestResults::Items(items) => items.is_empty(),
            RequestResults::ItemIds(ids) => ids.is_empty(),
            RequestResults::Collections(collections) => collections.is_empty(),
        }
    }
}

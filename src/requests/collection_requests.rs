use std::sync::Arc;

use super::macros::impl_request_common;
use super::CollectionRemoveParams;
use super::CollectionSaveParams;
use super::OperationKind;
use super::RequestCore;
use super::RequestParams;
use super::RequestResults;
use crate::Collection;
use crate::CollectionId;

/// Asynchronous fetch of every collection the engine holds.
pub struct CollectionFetchRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl CollectionFetchRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(OperationKind::CollectionFetch, RequestParams::CollectionFetch),
        }
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.core.with_inner(|inner| match &inner.results {
            RequestResults::Collections(collections) => collections.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(CollectionFetchRequest);

/// Asynchronous save of one or more collections. Batch semantics match item
/// saves: per-element errors by input index, no transaction.
pub struct CollectionSaveRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl CollectionSaveRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::CollectionSave,
                RequestParams::CollectionSave(CollectionSaveParams::default()),
            ),
        }
    }

    pub fn set_collections(&mut self, collections: impl IntoIterator<Item = Collection>) {
        self.core.with_inner(|inner| {
            if let RequestParams::CollectionSave(p) = &mut inner.params {
                p.collections = collections.into_iter().collect();
            }
        });
    }

    pub fn collections(&self) -> Vec<Collection> {
        self.core.with_inner(|inner| match &inner.results {
            RequestResults::Collections(collections) => collections.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(CollectionSaveRequest);

/// Asynchronous removal of one or more collections by id.
pub struct CollectionRemoveRequest {
    pub(crate) core: Arc<RequestCore>,
}

impl CollectionRemoveRequest {
    pub fn new() -> Self {
        Self {
            core: RequestCore::new(
                OperationKind::CollectionRemove,
                RequestParams::CollectionRemove(CollectionRemoveParams::default()),
            ),
        }
    }

    pub fn set_collection_ids(&mut self, ids: impl IntoIterator<Item = CollectionId>) {
        self.core.with_inner(|inner| {
            if let RequestParams::CollectionRemove(p) = &mut inner.params {
                p.ids = ids.into_iter().collect();
            }
        });
    }

    pub fn collection_ids(&self) -> Vec<CollectionId> {
        self.core.with_inner(|inner| match &inner.params {
            RequestParams::CollectionRemove(p) => p.ids.clone(),
            _ => Vec::new(),
        })
    }
}

impl_request_common!(CollectionRemoveRequest);

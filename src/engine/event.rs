use crate::CollectionId;
use crate::DetailKind;
use crate::ItemId;

/// Store-change notification emitted by an engine.
///
/// Events carry identity sets only, never the records themselves; a consumer
/// that needs current values re-fetches. Engines may emit these from any
/// task or thread at any time, including while a mutating request of the
/// same manager is still running.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Coarse notification: so much changed that per-identity events were
    /// not worth emitting. Consumers should refresh everything they hold.
    DataChanged,
    ItemsAdded(Vec<ItemId>),
    ItemsChanged {
        ids: Vec<ItemId>,
        /// Detail categories that may have changed; empty means unknown
        /// scope, assume any detail changed
        details: Vec<DetailKind>,
    },
    ItemsRemoved(Vec<ItemId>),
    CollectionsAdded(Vec<CollectionId>),
    CollectionsChanged(Vec<CollectionId>),
    CollectionsRemoved(Vec<CollectionId>),
}

//! Engine contract and the in-memory reference engine.

mod event;
mod mem;

pub use event::*;
pub use mem::*;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use tokio::sync::mpsc;

use crate::CollectionId;
use crate::DetailKind;
use crate::FilterKind;
use crate::ItemKind;
use crate::RequestProxy;

/// Contract every storage engine fulfils.
///
/// The core hands an engine requests that are already active and expects it
/// to record results and errors through the proxy and drive each request to
/// its terminal state, honoring cancellation cooperatively. Nothing an
/// engine does may unwind toward the submitting thread.
///
/// Engines publish store changes by sending [`ChangeEvent`]s into every
/// registered listener channel. Capability queries are synchronous and
/// side-effect-free.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait OrganizerEngine: Send + Sync + 'static {
    /// Human-readable engine name, surfaced through the manager.
    fn manager_name(&self) -> String;

    /// Executes one request. `request` is already in the active state; this
    /// runs on its own task and may take as long as it needs.
    async fn execute(&self, request: RequestProxy);

    /// Registers a channel that receives every subsequent change event.
    /// Closed channels are dropped on the next emission.
    fn register_change_listener(&self, listener: mpsc::UnboundedSender<ChangeEvent>);

    /// Filter variants this engine can evaluate.
    fn supported_filters(&self) -> Vec<FilterKind>;

    /// Item kinds this engine can store.
    fn supported_item_types(&self) -> Vec<ItemKind>;

    /// Detail categories this engine persists for items of `kind`.
    fn supported_item_details(&self, kind: ItemKind) -> Vec<DetailKind>;

    /// The collection items land in when saved without one. Exists for the
    /// whole life of the engine and cannot be removed.
    fn default_collection_id(&self) -> CollectionId;
}

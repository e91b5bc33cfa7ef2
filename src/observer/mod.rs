//! Per-item change observation.
//!
//! Coarse store-wide change events flow through the manager's listener
//! channels; this module adds the fine-grained layer on top: a registry of
//! per-item watcher callbacks and the RAII observer handle that owns a
//! registration.

mod observer;
mod registry;
mod watcher;

pub use observer::*;
pub(crate) use registry::*;
pub use watcher::*;

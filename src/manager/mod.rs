//! Client-facing manager façade.
//!
//! A manager owns one engine, the dispatch task that fans the engine's
//! change events out to listeners and item watchers, and the last-error
//! slot. Requests bind to a manager weakly and are handed to the engine
//! through it.

mod builder;
mod manager;
mod shared;

pub use builder::*;
pub use manager::*;
pub(crate) use shared::*;

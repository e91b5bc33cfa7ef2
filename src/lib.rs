//! # pimkit
//!
//! Client-facing data access for personal organizer data: events, todos,
//! journals and notes, grouped into collections and served by pluggable
//! storage engines.
//!
//! ## What this crate provides
//!
//! - [`OrganizerManager`] - façade over one engine: convenience calls, the
//!   last-error slot, change listeners and per-item observers
//! - Request types such as [`ItemFetchRequest`] and [`ItemSaveRequest`] -
//!   cancellable asynchronous operations with progressive result snapshots
//! - [`Filter`] and [`FetchHint`] - declarative selection and fetch shaping
//! - [`OrganizerEngine`] - the contract storage backends implement
//! - [`MemOrganizerEngine`] - the built-in volatile reference engine
//!
//! ## Example
//!
//! ```ignore
//! use pimkit::Item;
//! use pimkit::ItemFetchParams;
//! use pimkit::ItemKind;
//! use pimkit::OrganizerManager;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let manager = OrganizerManager::new()?;
//!
//! let mut event = Item::new(ItemKind::Event);
//! event.display_label = Some("standup".to_string());
//! manager.save_item(&mut event).await;
//!
//! let items = manager.items(ItemFetchParams::default()).await;
//! assert_eq!(items.len(), 1);
//! # Ok::<(), pimkit::Error>(())
//! # });
//! ```

mod config;
mod engine;
mod errors;
mod filters;
mod item;
mod manager;
mod observer;
mod requests;

pub use config::*;
pub use engine::*;
pub use errors::*;
pub use filters::*;
pub use item::*;
pub use manager::*;
pub use observer::*;
pub use requests::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub mod test_utils;

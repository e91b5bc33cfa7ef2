//! Organizer item value types.
//!
//! Everything here is a plain owned value with structural equality: ids,
//! items and their details, collections, sort criteria and fetch hints. The
//! mutable, lock-guarded state of the system lives in
//! [`requests`](crate::requests), not here.

mod collection;
mod detail;
mod fetch_hint;
mod identity;
mod item;
mod sort;

pub use collection::*;
pub use detail::*;
pub use fetch_hint::*;
pub use identity::*;
pub use item::*;
pub use sort::*;

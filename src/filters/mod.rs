//! Item selection predicates.

mod filter;

pub use filter::*;

#[cfg(test)]
mod filter_test;

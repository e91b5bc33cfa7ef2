//! In-memory reference engine.

mod eval;
mod mem_engine;

pub use mem_engine::*;

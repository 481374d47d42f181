//! Chunk types.
//!
//! - [`Chunk`] - Fixed-capacity pooled byte region with read/fill cursors

mod data;

pub use data::Chunk;

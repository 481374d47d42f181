//! Pooled byte buffers.
//!
//! - [`ChunkPool`] - Bounded free list of fixed-capacity chunks
//! - [`Memchunks`] - Unbounded chunk-backed byte queue for streaming
//! - [`ChunkBuffer`] - Single-chunk buffer with read/write cursors
//!
//! Buffers borrow their pool, so a pool always outlives every buffer it
//! serves. Each worker owns its own pools; nothing here is `Sync`.

mod chunk_buffer;
mod memchunks;
mod pool;

pub use chunk_buffer::ChunkBuffer;
pub use memchunks::{MAX_WRITE_IOV, Memchunks};
pub use pool::{ChunkPool, PoolStats};

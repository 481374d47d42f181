//! Async I/O glue for pooled buffers.
//!
//! This module drives [`Memchunks`](crate::Memchunks) and
//! [`ChunkBuffer`](crate::ChunkBuffer) against the `futures-io`
//! `AsyncWrite`/`AsyncRead` traits, so it works with tokio (through
//! `tokio-util`'s compat layer), async-std, smol, and other runtimes.
//!
//! - [`DrainTo`] - Writes a whole `Memchunks` out with vectored writes
//! - [`FillFrom`] - Reads once into a `ChunkBuffer`
//!
//! This module requires the `async-io` feature to be enabled.

mod chunk_buffer;
mod memchunks;

pub use chunk_buffer::FillFrom;
pub use memchunks::DrainTo;

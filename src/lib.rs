//! respool
//!
//! Resource pooling for high-throughput reverse proxies.
//!
//! `respool` is the plumbing every request/response path touches before a
//! byte reaches the network:
//!
//! - pooled fixed-capacity chunks, so staging and draining streamed bytes
//!   does not hit the allocator in steady state
//! - chunk-backed byte queues that hand their contents to vectored writes
//!   without copying
//! - per-backend pools of idle connections for keep-alive reuse
//!
//! The crate intentionally:
//! - does NOT parse HTTP or speak TLS
//! - does NOT dial connections or pick backends
//! - does NOT share anything across threads (one set of pools per worker)
//! - does NOT persist anything
//!
//! # Buffers
//!
//! ```
//! use respool::{ChunkPool, ChunkPoolConfig, Memchunks};
//!
//! let pool = ChunkPool::new(ChunkPoolConfig::new(4096, 64)?)?;
//! let mut out = Memchunks::new(&pool);
//!
//! out.append(b"HTTP/1.1 200 OK\r\n\r\n");
//! let mut sink = Vec::new();
//! while !out.is_empty() {
//!     out.write_to(&mut sink)?;
//! }
//! assert_eq!(pool.checked_out(), 0);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Connections
//!
//! ```
//! use respool::{ConnectionPool, PooledConnection};
//!
//! struct Backend {
//!     fd: i32,
//! }
//!
//! impl PooledConnection for Backend {
//!     type Key = i32;
//!     fn key(&self) -> i32 {
//!         self.fd
//!     }
//! }
//!
//! let mut pool = ConnectionPool::default();
//! let conn = pool.pop().unwrap_or_else(|| Backend { fd: 3 }); // dial on miss
//! // ... request completes with a clean keep-alive state
//! pool.add(conn);
//! assert_eq!(pool.len(), 1);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod buffer;
mod chunk;
mod config;
mod connection;
mod error;

#[cfg(feature = "async-io")]
mod async_io;

//
// Public surface
//

pub use buffer::{ChunkBuffer, ChunkPool, MAX_WRITE_IOV, Memchunks, PoolStats};
pub use chunk::Chunk;
pub use config::{
    ChunkPoolConfig, ConnectionPoolConfig, DEFAULT_CHUNK_SIZE, DEFAULT_MAX_FREE_CHUNKS,
};
pub use connection::{ConnectionPool, PooledConnection};
pub use error::PoolError;

#[cfg(feature = "async-io")]
pub use async_io::{DrainTo, FillFrom};

//! Configuration for pools.
//!
//! This module provides the per-pool configuration values a worker sets at
//! construction time:
//!
//! - [`ChunkPoolConfig`] - Chunk capacity and free-list bound for a [`ChunkPool`]
//! - [`ConnectionPoolConfig`] - Optional idle-connection cap for a [`ConnectionPool`]
//!
//! # Example
//!
//! ```
//! use respool::{ChunkPoolConfig, ConnectionPoolConfig};
//!
//! // 4 KiB chunks, keep at most 32 idle chunks around
//! let config = ChunkPoolConfig::new(4096, 32)?;
//!
//! // Builder pattern
//! let config = ChunkPoolConfig::default().with_chunk_size(8192);
//! config.validate()?;
//!
//! // Cap idle backend connections
//! let conns = ConnectionPoolConfig::default().with_max_idle(100);
//!
//! # Ok::<(), respool::PoolError>(())
//! ```
//!
//! With the `serde` feature both configs deserialize with every field
//! optional; a `ChunkPoolConfig` is validated as it is read, so a zero
//! `chunk_size` fails to parse. Its tests live in `tests/config_serde.rs`
//! and run with `cargo test --features serde`.
//!
//! [`ChunkPool`]: crate::ChunkPool
//! [`ConnectionPool`]: crate::ConnectionPool

use crate::error::PoolError;

/// Default chunk capacity (16 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 16 * 1024;

/// Default maximum number of released chunks kept on a free list.
pub const DEFAULT_MAX_FREE_CHUNKS: usize = 64;

/// Configuration for a [`ChunkPool`](crate::ChunkPool).
///
/// A pool serves exactly one size class: every chunk it produces has
/// `chunk_size` bytes of capacity. `max_free` bounds how many released chunks
/// are retained for reuse; releases beyond it deallocate the chunk, so idle
/// memory after a traffic burst is at most `chunk_size * max_free`.
///
/// `max_free == 0` is valid and turns the pool into a plain allocator.
///
/// # Example
///
/// ```
/// use respool::ChunkPoolConfig;
///
/// let config = ChunkPoolConfig::default()
///     .with_chunk_size(4096)
///     .with_max_free(16);
///
/// assert_eq!(config.chunk_size(), 4096);
/// assert_eq!(config.max_free(), 16);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawChunkPoolConfig"))]
pub struct ChunkPoolConfig {
    /// Capacity of every chunk in bytes.
    chunk_size: usize,

    /// Maximum free-list length.
    max_free: usize,
}

impl ChunkPoolConfig {
    /// Creates a new configuration.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `chunk_size` is zero.
    pub fn new(chunk_size: usize, max_free: usize) -> Result<Self, PoolError> {
        if chunk_size == 0 {
            return Err(PoolError::InvalidConfig {
                message: "chunk_size must be non-zero",
            });
        }

        Ok(Self {
            chunk_size,
            max_free,
        })
    }

    /// Sets the chunk capacity.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`ChunkPoolConfig::validate`] to check it.
    pub fn with_chunk_size(mut self, size: usize) -> Self {
        self.chunk_size = size;
        self
    }

    /// Sets the free-list bound.
    pub fn with_max_free(mut self, max_free: usize) -> Self {
        self.max_free = max_free;
        self
    }

    /// Returns the chunk capacity in bytes.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Returns the free-list bound.
    pub fn max_free(&self) -> usize {
        self.max_free
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use respool::ChunkPoolConfig;
    ///
    /// let config = ChunkPoolConfig::default().with_chunk_size(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), PoolError> {
        Self::new(self.chunk_size, self.max_free).map(|_| ())
    }
}

impl Default for ChunkPoolConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_free: DEFAULT_MAX_FREE_CHUNKS,
        }
    }
}

/// Unvalidated form of [`ChunkPoolConfig`] as read from a config file.
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
#[serde(default)]
struct RawChunkPoolConfig {
    chunk_size: usize,
    max_free: usize,
}

#[cfg(feature = "serde")]
impl Default for RawChunkPoolConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            max_free: DEFAULT_MAX_FREE_CHUNKS,
        }
    }
}

#[cfg(feature = "serde")]
impl TryFrom<RawChunkPoolConfig> for ChunkPoolConfig {
    type Error = PoolError;

    fn try_from(raw: RawChunkPoolConfig) -> Result<Self, Self::Error> {
        Self::new(raw.chunk_size, raw.max_free)
    }
}

/// Configuration for a [`ConnectionPool`](crate::ConnectionPool).
///
/// By default the idle set is unbounded and the dispatcher decides what to
/// keep. Setting `max_idle` makes [`ConnectionPool::add`] drop connections
/// once that many are already idle.
///
/// [`ConnectionPool::add`]: crate::ConnectionPool::add
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ConnectionPoolConfig {
    /// Maximum idle connections, `None` for unbounded.
    pub max_idle: Option<usize>,
}

impl ConnectionPoolConfig {
    /// Creates an unbounded configuration.
    pub const fn unbounded() -> Self {
        Self { max_idle: None }
    }

    /// Caps the number of idle connections.
    ///
    /// # Example
    ///
    /// ```
    /// use respool::ConnectionPoolConfig;
    ///
    /// let config = ConnectionPoolConfig::unbounded().with_max_idle(8);
    /// assert_eq!(config.max_idle, Some(8));
    /// ```
    pub const fn with_max_idle(mut self, max_idle: usize) -> Self {
        self.max_idle = Some(max_idle);
        self
    }
}

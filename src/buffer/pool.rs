//! Free-list chunk pool for one size class.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use tracing::{debug, trace};

use crate::chunk::Chunk;
use crate::config::ChunkPoolConfig;
use crate::error::PoolError;

static NEXT_POOL_ID: AtomicUsize = AtomicUsize::new(0);

/// Snapshot of a [`ChunkPool`]'s counters.
///
/// Intended for capacity planning and tests; nothing in the pool's behavior
/// depends on these values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PoolStats {
    /// Chunks freshly allocated since the pool was created.
    pub allocated: usize,
    /// Acquisitions served from the free list.
    pub reused: usize,
    /// Released chunks dropped because the free list was full or the chunk
    /// came from another pool.
    pub discarded: usize,
    /// Chunks currently held outside the pool.
    pub checked_out: usize,
    /// Chunks currently on the free list.
    pub free: usize,
}

/// A free-list allocator for fixed-capacity chunks of one size class.
///
/// A pool belongs to one worker. It uses interior mutability so that any
/// number of [`Memchunks`](crate::Memchunks) and
/// [`ChunkBuffer`](crate::ChunkBuffer) instances can share it by reference;
/// it is deliberately `!Sync` and never locks.
///
/// # Example
///
/// ```
/// use respool::{ChunkPool, ChunkPoolConfig};
///
/// let pool = ChunkPool::new(ChunkPoolConfig::new(4096, 2)?)?;
///
/// let a = pool.acquire();
/// let b = pool.acquire();
/// let c = pool.acquire();
/// assert_eq!(pool.checked_out(), 3);
///
/// pool.release(a);
/// pool.release(b);
/// pool.release(c); // free list is full, this one is deallocated
/// assert_eq!(pool.free_count(), 2);
/// assert_eq!(pool.stats().discarded, 1);
/// # Ok::<(), respool::PoolError>(())
/// ```
pub struct ChunkPool {
    id: usize,
    config: ChunkPoolConfig,
    free: RefCell<Vec<Chunk>>,
    allocated: Cell<usize>,
    reused: Cell<usize>,
    discarded: Cell<usize>,
    checked_out: Cell<usize>,
}

impl ChunkPool {
    /// Creates an empty pool.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InvalidConfig`] if `config` does not validate,
    /// e.g. a zero `chunk_size` set through
    /// [`with_chunk_size`](ChunkPoolConfig::with_chunk_size).
    pub fn new(config: ChunkPoolConfig) -> Result<Self, PoolError> {
        config.validate()?;
        Ok(Self::with_valid_config(config))
    }

    fn with_valid_config(config: ChunkPoolConfig) -> Self {
        let id = NEXT_POOL_ID.fetch_add(1, Ordering::Relaxed);
        debug!(
            pool = id,
            chunk_size = config.chunk_size(),
            max_free = config.max_free(),
            "creating chunk pool"
        );
        Self {
            id,
            config,
            free: RefCell::new(Vec::with_capacity(config.max_free())),
            allocated: Cell::new(0),
            reused: Cell::new(0),
            discarded: Cell::new(0),
            checked_out: Cell::new(0),
        }
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &ChunkPoolConfig {
        &self.config
    }

    /// Returns the capacity of every chunk this pool produces.
    pub fn chunk_size(&self) -> usize {
        self.config.chunk_size()
    }

    /// Takes a chunk from the free list or allocates a fresh one.
    ///
    /// The returned chunk is always empty. Allocation failure aborts the
    /// process through the global allocator; it is never reported here.
    pub fn acquire(&self) -> Chunk {
        let recycled = self.free.borrow_mut().pop();
        let chunk = match recycled {
            Some(chunk) => {
                self.reused.set(self.reused.get() + 1);
                chunk
            }
            None => {
                self.allocated.set(self.allocated.get() + 1);
                trace!(
                    chunk_size = self.config.chunk_size(),
                    allocated = self.allocated.get(),
                    "allocating chunk"
                );
                Chunk::new(self.config.chunk_size(), self.id)
            }
        };
        self.checked_out.set(self.checked_out.get() + 1);
        chunk
    }

    /// Returns a chunk to the pool.
    ///
    /// The chunk is reset and kept for reuse if the free list is below
    /// `max_free`; otherwise it is deallocated. A chunk acquired from another
    /// pool is always deallocated and leaves this pool's `checked_out`
    /// count untouched.
    pub fn release(&self, mut chunk: Chunk) {
        if chunk.pool_id() != self.id {
            debug!(
                pool = self.id,
                owner = chunk.pool_id(),
                capacity = chunk.capacity(),
                "dropping chunk from another pool"
            );
            self.discarded.set(self.discarded.get() + 1);
            return;
        }

        debug_assert!(
            self.checked_out.get() > 0,
            "released more chunks than were acquired"
        );
        self.checked_out
            .set(self.checked_out.get().saturating_sub(1));

        let mut free = self.free.borrow_mut();
        if free.len() < self.config.max_free() {
            chunk.reset();
            free.push(chunk);
        } else {
            self.discarded.set(self.discarded.get() + 1);
            trace!(max_free = self.config.max_free(), "free list full, dropping chunk");
        }
    }

    /// Returns the number of chunks on the free list.
    pub fn free_count(&self) -> usize {
        self.free.borrow().len()
    }

    /// Returns the number of chunks currently held outside the pool.
    pub fn checked_out(&self) -> usize {
        self.checked_out.get()
    }

    /// Returns a snapshot of the pool counters.
    pub fn stats(&self) -> PoolStats {
        PoolStats {
            allocated: self.allocated.get(),
            reused: self.reused.get(),
            discarded: self.discarded.get(),
            checked_out: self.checked_out.get(),
            free: self.free_count(),
        }
    }

    /// Pre-allocates chunks onto the free list.
    ///
    /// Fills the free list up to `min(count, max_free)` chunks so the first
    /// requests after startup skip the allocator.
    pub fn prewarm(&self, count: usize) {
        let target = count.min(self.config.max_free());
        let mut free = self.free.borrow_mut();
        while free.len() < target {
            self.allocated.set(self.allocated.get() + 1);
            free.push(Chunk::new(self.config.chunk_size(), self.id));
        }
    }

    /// Deallocates free chunks until at most `max` remain.
    pub fn shrink(&self, max: usize) {
        let mut free = self.free.borrow_mut();
        if free.len() > max {
            debug!(from = free.len(), to = max, "shrinking chunk free list");
            free.truncate(max);
        }
    }

    /// Deallocates every free chunk.
    pub fn clear(&self) {
        self.shrink(0);
    }
}

impl Default for ChunkPool {
    fn default() -> Self {
        Self::with_valid_config(ChunkPoolConfig::default())
    }
}

impl fmt::Debug for ChunkPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkPool")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish()
    }
}

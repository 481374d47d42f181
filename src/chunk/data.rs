//! The Chunk type - a fixed-capacity pooled byte region.

use std::fmt;

/// A fixed-capacity contiguous byte region handed out by a
/// [`ChunkPool`](crate::ChunkPool).
///
/// A chunk tracks two cursors into its storage:
///
/// - `len()` - how many bytes from the start hold valid data (the fill mark)
/// - `pos()` - how many of those have already been consumed from the front
///
/// so `0 <= pos() <= len() <= capacity()` always holds. Chunks cannot be
/// constructed outside a pool; whoever holds one owns it exclusively, and
/// handing it back via [`ChunkPool::release`](crate::ChunkPool::release)
/// moves it onto the free list. Each chunk remembers the pool that made it,
/// and any other pool refuses to recycle it.
///
/// # Example
///
/// ```
/// use respool::{ChunkPool, ChunkPoolConfig};
///
/// let pool = ChunkPool::new(ChunkPoolConfig::new(64, 4)?)?;
/// let mut chunk = pool.acquire();
///
/// assert_eq!(chunk.put(b"PING\r\n"), 6);
/// assert_eq!(chunk.consume(4), 4);
/// assert_eq!(chunk.unread(), b"\r\n");
///
/// pool.release(chunk);
/// assert_eq!(pool.checked_out(), 0);
/// # Ok::<(), respool::PoolError>(())
/// ```
pub struct Chunk {
    buf: Box<[u8]>,
    pos: usize,
    last: usize,
    pool_id: usize,
}

impl Chunk {
    /// Allocates a zeroed chunk of `capacity` bytes owned by pool `pool_id`.
    pub(crate) fn new(capacity: usize, pool_id: usize) -> Self {
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            last: 0,
            pool_id,
        }
    }

    pub(crate) fn pool_id(&self) -> usize {
        self.pool_id
    }

    /// Returns the fixed capacity in bytes.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Returns how many bytes from the start hold valid data.
    pub fn len(&self) -> usize {
        self.last
    }

    /// Returns true if no data was ever written since the last reset.
    pub fn is_empty(&self) -> bool {
        self.last == 0
    }

    /// Returns the read position (bytes consumed from the front).
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Returns the bytes written but not yet consumed.
    pub fn unread(&self) -> &[u8] {
        &self.buf[self.pos..self.last]
    }

    /// Returns how many bytes can still be written.
    pub fn left(&self) -> usize {
        self.buf.len() - self.last
    }

    /// Returns true if the chunk cannot take more data.
    pub fn is_full(&self) -> bool {
        self.last == self.buf.len()
    }

    /// Returns the writable tail of the chunk.
    ///
    /// Pair with [`commit`](Self::commit) after filling it directly.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.last..]
    }

    /// Copies as much of `src` as fits, returning the number of bytes copied.
    pub fn put(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.left());
        self.buf[self.last..self.last + n].copy_from_slice(&src[..n]);
        self.last += n;
        n
    }

    /// Marks `n` bytes of spare space as written.
    ///
    /// `n` is clamped to the spare space left.
    pub fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.left(), "commit past chunk capacity");
        self.last += n.min(self.left());
    }

    /// Consumes up to `n` unread bytes, returning how many were consumed.
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.last - self.pos);
        self.pos += n;
        n
    }

    /// Moves the unread bytes to the start of the storage.
    pub(crate) fn compact(&mut self) {
        if self.pos == 0 {
            return;
        }
        self.buf.copy_within(self.pos..self.last, 0);
        self.last -= self.pos;
        self.pos = 0;
    }

    /// Forgets all data, keeping the storage.
    pub(crate) fn reset(&mut self) {
        self.pos = 0;
        self.last = 0;
    }
}

impl fmt::Debug for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("capacity", &self.capacity())
            .field("pos", &self.pos)
            .field("len", &self.last)
            .finish()
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk({}/{} bytes", self.last, self.capacity())?;
        if self.pos > 0 {
            write!(f, ", consumed {}", self.pos)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new() {
        let chunk = Chunk::new(16, 0);
        assert_eq!(chunk.capacity(), 16);
        assert_eq!(chunk.len(), 0);
        assert!(chunk.is_empty());
        assert_eq!(chunk.left(), 16);
    }

    #[test]
    fn test_put_truncates_at_capacity() {
        let mut chunk = Chunk::new(4, 0);
        assert_eq!(chunk.put(b"hello"), 4);
        assert_eq!(chunk.unread(), b"hell");
        assert!(chunk.is_full());
        assert_eq!(chunk.put(b"o"), 0);
    }

    #[test]
    fn test_consume() {
        let mut chunk = Chunk::new(8, 0);
        chunk.put(b"abcdef");
        assert_eq!(chunk.consume(2), 2);
        assert_eq!(chunk.unread(), b"cdef");
        assert_eq!(chunk.pos(), 2);
        assert_eq!(chunk.consume(100), 4);
        assert!(chunk.unread().is_empty());
        assert_eq!(chunk.len(), 6);
    }

    #[test]
    fn test_spare_and_commit() {
        let mut chunk = Chunk::new(8, 0);
        chunk.spare_mut()[..3].copy_from_slice(b"xyz");
        chunk.commit(3);
        assert_eq!(chunk.unread(), b"xyz");
        assert_eq!(chunk.spare_mut().len(), 5);
    }

    #[test]
    fn test_compact() {
        let mut chunk = Chunk::new(8, 0);
        chunk.put(b"abcdef");
        chunk.consume(4);
        chunk.compact();
        assert_eq!(chunk.pos(), 0);
        assert_eq!(chunk.len(), 2);
        assert_eq!(chunk.unread(), b"ef");
        assert_eq!(chunk.left(), 6);
    }

    #[test]
    fn test_reset() {
        let mut chunk = Chunk::new(8, 0);
        chunk.put(b"abc");
        chunk.consume(1);
        chunk.reset();
        assert!(chunk.is_empty());
        assert_eq!(chunk.pos(), 0);
        assert_eq!(chunk.capacity(), 8);
    }

    #[test]
    fn test_display() {
        let mut chunk = Chunk::new(8, 0);
        chunk.put(b"hello");
        let s = format!("{}", chunk);
        assert!(s.contains("5/8 bytes"));

        chunk.consume(2);
        assert!(format!("{}", chunk).contains("consumed 2"));
    }
}

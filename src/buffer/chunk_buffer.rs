//! ChunkBuffer - a single pooled chunk with independent read/write cursors.

use std::fmt;
use std::io::{self, Read, Write};

use bytes::Buf;

use super::pool::ChunkPool;
use crate::chunk::Chunk;
use crate::error::PoolError;

/// A bounded buffer backed by exactly one pooled chunk.
///
/// The chunk is acquired lazily on the first write and released by
/// [`reset`](Self::reset) or on drop. Its read offset and write offset
/// satisfy `0 <= read_offset <= write_offset <= capacity`.
///
/// Use this when a caller needs one bounded buffer (a read buffer for a
/// socket, say) rather than an unbounded queue; see
/// [`Memchunks`](crate::Memchunks) for the latter.
///
/// # Example
///
/// ```
/// use respool::{ChunkBuffer, ChunkPool, ChunkPoolConfig};
///
/// let pool = ChunkPool::new(ChunkPoolConfig::new(8, 4)?)?;
/// let mut buf = ChunkBuffer::new(&pool);
///
/// assert_eq!(buf.write(b"GET /"), 5);
/// assert_eq!(buf.data(), b"GET /");
///
/// buf.drain(4);
/// assert_eq!(buf.data(), b"/");
///
/// buf.reset();
/// assert_eq!(pool.checked_out(), 0);
/// # Ok::<(), respool::PoolError>(())
/// ```
pub struct ChunkBuffer<'p> {
    pool: &'p ChunkPool,
    chunk: Option<Chunk>,
}

impl<'p> ChunkBuffer<'p> {
    /// Creates an empty buffer; no chunk is acquired yet.
    pub fn new(pool: &'p ChunkPool) -> Self {
        Self { pool, chunk: None }
    }

    /// Returns the pool servicing this buffer.
    pub fn pool(&self) -> &'p ChunkPool {
        self.pool
    }

    /// Returns true if a chunk is currently held.
    pub fn is_allocated(&self) -> bool {
        self.chunk.is_some()
    }

    /// Returns the capacity of the (possibly not yet acquired) chunk.
    pub fn capacity(&self) -> usize {
        self.pool.chunk_size()
    }

    /// Returns the read offset.
    pub fn read_offset(&self) -> usize {
        self.chunk.as_ref().map_or(0, Chunk::pos)
    }

    /// Returns the write offset.
    pub fn write_offset(&self) -> usize {
        self.chunk.as_ref().map_or(0, Chunk::len)
    }

    /// Returns the number of unread bytes.
    pub fn rleft(&self) -> usize {
        self.write_offset() - self.read_offset()
    }

    /// Returns the number of bytes that can still be written.
    pub fn wleft(&self) -> usize {
        self.capacity() - self.write_offset()
    }

    /// Returns true if there are no unread bytes.
    pub fn is_empty(&self) -> bool {
        self.rleft() == 0
    }

    /// Returns the unread region `[read_offset, write_offset)`.
    pub fn data(&self) -> &[u8] {
        self.chunk.as_ref().map(Chunk::unread).unwrap_or(&[])
    }

    /// Copies as much of `src` as fits at the write offset.
    ///
    /// Returns the number of bytes copied, `min(src.len(), wleft())`. Callers
    /// with larger inputs should split them across buffers or use
    /// [`Memchunks`](crate::Memchunks).
    pub fn write(&mut self, src: &[u8]) -> usize {
        if src.is_empty() {
            return 0;
        }
        self.alloc().put(src)
    }

    /// Copies all of `src` or nothing.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::InsufficientCapacity`] if `src` does not fit in
    /// the remaining space; the buffer is left untouched.
    pub fn try_write(&mut self, src: &[u8]) -> Result<(), PoolError> {
        let available = self.wleft();
        if src.len() > available {
            return Err(PoolError::InsufficientCapacity {
                requested: src.len(),
                available,
            });
        }
        self.write(src);
        Ok(())
    }

    /// Advances the read offset by `n`.
    ///
    /// `n` must not exceed [`rleft()`](Self::rleft). Debug builds assert
    /// this; release builds stop at the write offset. Returns the number of
    /// bytes drained.
    pub fn drain(&mut self, n: usize) -> usize {
        debug_assert!(
            n <= self.rleft(),
            "drain({n}) past the {} unread bytes of the buffer",
            self.rleft()
        );
        match self.chunk.as_mut() {
            Some(chunk) => chunk.consume(n),
            None => 0,
        }
    }

    /// Drains `n` bytes, then moves the remaining unread bytes to the start
    /// of the chunk so the whole tail is writable again.
    pub fn drain_reset(&mut self, n: usize) -> usize {
        let drained = self.drain(n);
        if let Some(chunk) = self.chunk.as_mut() {
            chunk.compact();
        }
        drained
    }

    /// Releases the chunk to the pool and zeroes both offsets.
    ///
    /// Calling this on a buffer that holds no chunk does nothing.
    pub fn reset(&mut self) {
        if let Some(chunk) = self.chunk.take() {
            self.pool.release(chunk);
        }
    }

    /// Returns the writable region after the write offset, acquiring the
    /// chunk if needed.
    ///
    /// Pair with [`commit`](Self::commit) after filling it directly.
    pub fn spare_mut(&mut self) -> &mut [u8] {
        self.alloc().spare_mut()
    }

    /// Advances the write offset by `n` bytes previously written into
    /// [`spare_mut`](Self::spare_mut).
    pub fn commit(&mut self, n: usize) {
        debug_assert!(n <= self.wleft(), "commit({n}) past buffer capacity");
        if let Some(chunk) = self.chunk.as_mut() {
            chunk.commit(n);
        }
    }

    /// Reads once from `reader` into the free space.
    ///
    /// Returns the number of bytes read. A full buffer reads nothing and
    /// returns `Ok(0)` without touching `reader`. If the chunk was acquired
    /// for this read and nothing arrived (end of stream or an error), it goes
    /// straight back to the pool.
    pub fn read_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<usize> {
        if self.wleft() == 0 {
            return Ok(0);
        }
        let fresh = !self.is_allocated();
        let result = reader.read(self.spare_mut());
        if let Ok(n) = result {
            self.commit(n);
        }
        self.release_if_unused(fresh);
        result
    }

    /// Releases a chunk acquired for a read that stored nothing.
    pub(crate) fn release_if_unused(&mut self, fresh: bool) {
        if fresh && self.chunk.as_ref().is_some_and(Chunk::is_empty) {
            self.reset();
        }
    }

    fn alloc(&mut self) -> &mut Chunk {
        let pool = self.pool;
        self.chunk.get_or_insert_with(|| pool.acquire())
    }
}

impl Drop for ChunkBuffer<'_> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl fmt::Debug for ChunkBuffer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChunkBuffer")
            .field("read_offset", &self.read_offset())
            .field("write_offset", &self.write_offset())
            .field("capacity", &self.capacity())
            .field("allocated", &self.is_allocated())
            .finish()
    }
}

impl Buf for ChunkBuffer<'_> {
    fn remaining(&self) -> usize {
        self.rleft()
    }

    fn chunk(&self) -> &[u8] {
        self.data()
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.rleft(),
            "cannot advance past `remaining`: {} <= {}",
            cnt,
            self.rleft()
        );
        self.drain(cnt);
    }
}

impl Write for ChunkBuffer<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(ChunkBuffer::write(self, buf))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ChunkPoolConfig;

    fn pool(chunk_size: usize) -> ChunkPool {
        ChunkPool::new(ChunkPoolConfig::new(chunk_size, 4).unwrap()).unwrap()
    }

    #[test]
    fn test_lazy_allocation() {
        let pool = pool(16);
        let mut buf = ChunkBuffer::new(&pool);
        assert!(!buf.is_allocated());
        assert_eq!(buf.wleft(), 16);
        assert_eq!(buf.data(), b"");
        assert_eq!(pool.checked_out(), 0);

        assert_eq!(buf.write(b""), 0);
        assert!(!buf.is_allocated());

        buf.write(b"x");
        assert!(buf.is_allocated());
        assert_eq!(pool.checked_out(), 1);
    }

    #[test]
    fn test_write_clamps_to_capacity() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        assert_eq!(buf.write(b"0123456789"), 8);
        assert_eq!(buf.data(), b"01234567");
        assert_eq!(buf.wleft(), 0);
        assert_eq!(buf.write(b"z"), 0);
    }

    #[test]
    fn test_try_write() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        buf.try_write(b"abcde").unwrap();
        let err = buf.try_write(b"fghi").unwrap_err();
        assert_eq!(
            err,
            PoolError::InsufficientCapacity {
                requested: 4,
                available: 3
            }
        );
        assert_eq!(buf.data(), b"abcde");
    }

    #[test]
    fn test_drain_and_offsets() {
        let pool = pool(16);
        let mut buf = ChunkBuffer::new(&pool);
        buf.write(b"hello world");
        assert_eq!(buf.drain(6), 6);
        assert_eq!(buf.read_offset(), 6);
        assert_eq!(buf.write_offset(), 11);
        assert_eq!(buf.rleft(), 5);
        assert_eq!(buf.data(), b"world");
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "past the")]
    fn test_overdrain_asserts_in_debug() {
        let pool = pool(16);
        let mut buf = ChunkBuffer::new(&pool);
        buf.write(b"ab");
        buf.drain(3);
    }

    #[test]
    fn test_drain_reset_compacts() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        buf.write(b"abcdefgh");
        assert_eq!(buf.wleft(), 0);

        buf.drain_reset(5);
        assert_eq!(buf.read_offset(), 0);
        assert_eq!(buf.write_offset(), 3);
        assert_eq!(buf.data(), b"fgh");
        assert_eq!(buf.wleft(), 5);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        buf.reset();
        assert_eq!(buf.read_offset(), 0);
        assert_eq!(buf.write_offset(), 0);

        buf.write(b"abc");
        buf.drain(1);
        buf.reset();
        assert_eq!(buf.read_offset(), 0);
        assert_eq!(buf.write_offset(), 0);
        assert_eq!(pool.checked_out(), 0);
        assert_eq!(pool.free_count(), 1);

        buf.reset();
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_spare_and_commit() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        let spare = buf.spare_mut();
        assert_eq!(spare.len(), 8);
        spare[..2].copy_from_slice(b"ok");
        buf.commit(2);
        assert_eq!(buf.data(), b"ok");
    }

    #[test]
    fn test_read_from() {
        let pool = pool(4);
        let mut buf = ChunkBuffer::new(&pool);
        let mut src: &[u8] = b"abcdef";
        assert_eq!(buf.read_from(&mut src).unwrap(), 4);
        assert_eq!(buf.read_from(&mut src).unwrap(), 0);
        assert_eq!(buf.data(), b"abcd");
        assert_eq!(src, b"ef");
    }

    struct Failing;

    impl Read for Failing {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::ErrorKind::ConnectionReset.into())
        }
    }

    #[test]
    fn test_read_from_eof_returns_fresh_chunk() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        let mut src: &[u8] = b"";
        assert_eq!(buf.read_from(&mut src).unwrap(), 0);
        assert!(!buf.is_allocated());
        assert_eq!(pool.checked_out(), 0);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_read_from_error_returns_fresh_chunk() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        let err = buf.read_from(&mut Failing).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
        assert!(!buf.is_allocated());
        assert_eq!(pool.checked_out(), 0);
    }

    #[test]
    fn test_read_from_eof_keeps_held_chunk() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        buf.write(b"ab");
        buf.drain(2);

        let mut src: &[u8] = b"";
        assert_eq!(buf.read_from(&mut src).unwrap(), 0);
        assert!(buf.is_allocated());
        assert_eq!(buf.write_offset(), 2);
        assert_eq!(pool.checked_out(), 1);
    }

    #[test]
    fn test_drop_releases_chunk() {
        let pool = pool(8);
        {
            let mut buf = ChunkBuffer::new(&pool);
            buf.write(b"abc");
        }
        assert_eq!(pool.checked_out(), 0);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_buf_impl() {
        let pool = pool(8);
        let mut buf = ChunkBuffer::new(&pool);
        buf.write(&[0x12, 0x34, 0x56]);
        assert_eq!(buf.get_u16(), 0x1234);
        assert_eq!(buf.remaining(), 1);
        assert_eq!(buf.get_u8(), 0x56);
    }
}

//! Memchunks - an ordered, chunk-backed byte queue.
//!
//! This is the streaming buffer the framing layer appends serialized bytes
//! into and the network layer drains with vectored writes:
//!
//! - `append()` - Copy bytes onto the tail, acquiring chunks as needed
//! - `riovec()` - Describe the unread bytes as `IoSlice`s without copying
//! - `drain()` - Drop bytes from the front, recycling emptied chunks
//!
//! # Example
//!
//! ```
//! use std::io::IoSlice;
//! use respool::{ChunkPool, ChunkPoolConfig, Memchunks};
//!
//! let pool = ChunkPool::new(ChunkPoolConfig::new(4096, 16)?)?;
//! let mut buf = Memchunks::new(&pool);
//!
//! buf.append(&[0xAB; 10_000]);
//! assert_eq!(buf.chunk_count(), 3);
//!
//! let mut iov = [IoSlice::new(&[]); 8];
//! let n = buf.riovec(&mut iov);
//! let total: usize = iov[..n].iter().map(|s| s.len()).sum();
//! assert_eq!(total, 10_000);
//!
//! // After the socket accepted 5000 bytes
//! buf.drain(5000);
//! assert_eq!(buf.len(), 5000);
//! assert_eq!(pool.free_count(), 1);
//! # Ok::<(), respool::PoolError>(())
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::io::{self, IoSlice, Read, Write};

use bytes::Buf;

use super::pool::ChunkPool;
use crate::chunk::Chunk;

/// Number of descriptors gathered per vectored write in
/// [`Memchunks::write_to`].
pub const MAX_WRITE_IOV: usize = 16;

/// An ordered byte queue backed by pooled chunks.
///
/// Every chunk except the last is full, the first may be partially consumed,
/// and no chunk in the queue is ever without unread bytes. The borrowed pool
/// must outlive the queue; the lifetime `'p` enforces that.
///
/// Dropping a `Memchunks` returns all of its chunks to the pool.
pub struct Memchunks<'p> {
    pool: &'p ChunkPool,
    chunks: VecDeque<Chunk>,
    len: usize,
}

impl<'p> Memchunks<'p> {
    /// Creates an empty queue serviced by `pool`.
    pub fn new(pool: &'p ChunkPool) -> Self {
        Self {
            pool,
            chunks: VecDeque::new(),
            len: 0,
        }
    }

    /// Returns the pool servicing this queue.
    pub fn pool(&self) -> &'p ChunkPool {
        self.pool
    }

    /// Returns the number of unread bytes.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if there are no unread bytes.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of chunks currently held.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Iterates over the held chunks, front to back.
    pub fn chunks(&self) -> impl ExactSizeIterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    /// Copies `data` onto the tail of the queue.
    ///
    /// Fills the current tail chunk first, then acquires new chunks from the
    /// pool until everything is copied. Empty input acquires nothing.
    pub fn append(&mut self, mut data: &[u8]) {
        self.len += data.len();
        while !data.is_empty() {
            let tail = self.writable_tail();
            let n = tail.put(data);
            data = &data[n..];
        }
    }

    /// Appends a single byte.
    pub fn append_byte(&mut self, byte: u8) {
        self.append(&[byte]);
    }

    /// Removes the first `n` unread bytes.
    ///
    /// Front chunks whose unread bytes reach zero are released to the pool.
    /// Returns the number of bytes drained.
    ///
    /// `n` must not exceed [`len()`](Self::len). Debug builds assert this;
    /// release builds drain everything that is there.
    pub fn drain(&mut self, n: usize) -> usize {
        debug_assert!(
            n <= self.len,
            "drain({n}) past the {} unread bytes of the queue",
            self.len
        );
        let want = n.min(self.len);
        let mut left = want;

        while let Some(front) = self.chunks.front_mut() {
            let consumed = front.consume(left);
            left -= consumed;
            self.len -= consumed;

            if !front.unread().is_empty() {
                break;
            }
            if let Some(chunk) = self.chunks.pop_front() {
                self.pool.release(chunk);
            }
        }

        want - left
    }

    /// Fills `dst` with descriptors of the unread bytes, one per chunk.
    ///
    /// At most `dst.len()` descriptors are produced, front to back. Returns
    /// how many were written. The descriptors borrow the queue, so they
    /// cannot outlive the next mutation.
    pub fn riovec<'a>(&'a self, dst: &mut [IoSlice<'a>]) -> usize {
        let mut n = 0;
        for (slot, chunk) in dst.iter_mut().zip(self.chunks.iter()) {
            *slot = IoSlice::new(chunk.unread());
            n += 1;
        }
        n
    }

    /// Copies unread bytes into `dst` and drains them.
    ///
    /// Returns the number of bytes moved, `min(dst.len(), len())`.
    pub fn remove(&mut self, dst: &mut [u8]) -> usize {
        let mut copied = 0;
        for chunk in &self.chunks {
            if copied == dst.len() {
                break;
            }
            let src = chunk.unread();
            let n = src.len().min(dst.len() - copied);
            dst[copied..copied + n].copy_from_slice(&src[..n]);
            copied += n;
        }
        self.drain(copied)
    }

    /// Moves up to `n` unread bytes onto the tail of `dest`.
    ///
    /// `dest` may be serviced by a different pool. Returns the number of
    /// bytes moved.
    pub fn move_to(&mut self, dest: &mut Memchunks<'_>, n: usize) -> usize {
        let total = n.min(self.len);
        let mut left = total;
        while left > 0 {
            let Some(front) = self.chunks.front() else {
                break;
            };
            let src = front.unread();
            let take = left.min(src.len());
            dest.append(&src[..take]);
            self.drain(take);
            left -= take;
        }
        total - left
    }

    /// Releases every chunk to the pool and zeroes the byte count.
    ///
    /// Calling this on an empty queue does nothing.
    pub fn reset(&mut self) {
        for chunk in self.chunks.drain(..) {
            self.pool.release(chunk);
        }
        self.len = 0;
    }

    /// Writes unread bytes to `writer` with one vectored write and drains
    /// what was accepted.
    ///
    /// Returns the number of bytes written. An empty queue writes nothing
    /// and returns `Ok(0)` without touching `writer`.
    pub fn write_to<W: Write + ?Sized>(&mut self, writer: &mut W) -> io::Result<usize> {
        if self.is_empty() {
            return Ok(0);
        }
        let n = {
            let mut iov = [IoSlice::new(&[]); MAX_WRITE_IOV];
            let count = self.riovec(&mut iov);
            writer.write_vectored(&iov[..count])?
        };
        Ok(self.drain(n))
    }

    /// Reads once from `reader` straight into the tail's spare space.
    ///
    /// Acquires a chunk first if the tail is full or the queue is empty.
    /// Returns the number of bytes read; `Ok(0)` means end of stream.
    pub fn read_from<R: Read + ?Sized>(&mut self, reader: &mut R) -> io::Result<usize> {
        let fresh = self.chunks.back().is_none_or(Chunk::is_full);
        let tail = self.writable_tail();
        let result = reader.read(tail.spare_mut());
        match result {
            Ok(n) => {
                tail.commit(n);
                self.len += n;
                if n == 0 && fresh {
                    self.release_empty_tail();
                }
                Ok(n)
            }
            Err(e) => {
                if fresh {
                    self.release_empty_tail();
                }
                Err(e)
            }
        }
    }

    /// Returns the tail chunk, acquiring a new one if it is full or missing.
    pub(crate) fn writable_tail(&mut self) -> &mut Chunk {
        if self.chunks.back().is_none_or(Chunk::is_full) {
            self.chunks.push_back(self.pool.acquire());
        }
        let last = self.chunks.len() - 1;
        &mut self.chunks[last]
    }

    fn release_empty_tail(&mut self) {
        if self.chunks.back().is_some_and(|c| c.unread().is_empty()) {
            if let Some(chunk) = self.chunks.pop_back() {
                self.pool.release(chunk);
            }
        }
    }
}

impl Drop for Memchunks<'_> {
    fn drop(&mut self) {
        self.reset();
    }
}

impl fmt::Debug for Memchunks<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memchunks")
            .field("len", &self.len)
            .field("chunks", &self.chunks.len())
            .field("chunk_size", &self.pool.chunk_size())
            .finish()
    }
}

impl Buf for Memchunks<'_> {
    fn remaining(&self) -> usize {
        self.len
    }

    fn chunk(&self) -> &[u8] {
        self.chunks.front().map(Chunk::unread).unwrap_or(&[])
    }

    fn advance(&mut self, cnt: usize) {
        assert!(
            cnt <= self.len,
            "cannot advance past `remaining`: {} <= {}",
            cnt,
            self.len
        );
        self.drain(cnt);
    }

    fn chunks_vectored<'a>(&'a self, dst: &mut [IoSlice<'a>]) -> usize {
        self.riovec(dst)
    }
}

impl Write for Memchunks<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.append(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Read for Memchunks<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        Ok(self.remove(buf))
    }
}

//! Async fill for [`ChunkBuffer`].

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::buffer::ChunkBuffer;

impl<'p> ChunkBuffer<'p> {
    /// Attempts one read from `reader` into the free space.
    ///
    /// A full buffer returns `Poll::Ready(Ok(0))` without polling `reader`.
    /// A chunk acquired for this attempt is handed back to the pool unless
    /// bytes arrived, including while the read is pending.
    pub fn poll_read_from<R: AsyncRead + ?Sized>(
        &mut self,
        cx: &mut Context<'_>,
        reader: Pin<&mut R>,
    ) -> Poll<io::Result<usize>> {
        if self.wleft() == 0 {
            return Poll::Ready(Ok(0));
        }
        let fresh = !self.is_allocated();
        let poll = reader.poll_read(cx, self.spare_mut());
        if let Poll::Ready(Ok(n)) = poll {
            self.commit(n);
        }
        self.release_if_unused(fresh);
        poll
    }

    /// Reads once from `reader` into the free space.
    ///
    /// Resolves to the number of bytes read; `0` means end of stream or a
    /// full buffer.
    pub fn fill_from<R: AsyncRead>(&mut self, reader: R) -> FillFrom<'_, 'p, R> {
        FillFrom { reader, buf: self }
    }
}

pin_project! {
    /// Future returned by [`ChunkBuffer::fill_from`].
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct FillFrom<'a, 'p, R> {
        #[pin]
        reader: R,
        buf: &'a mut ChunkBuffer<'p>,
    }
}

impl<R: AsyncRead> Future for FillFrom<'_, '_, R> {
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        this.buf.poll_read_from(cx, this.reader)
    }
}

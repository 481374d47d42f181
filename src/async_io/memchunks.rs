//! Async write-out for [`Memchunks`].

use std::future::Future;
use std::io::{self, IoSlice};
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::ready;
use futures_io::AsyncWrite;
use pin_project_lite::pin_project;

use crate::buffer::{MAX_WRITE_IOV, Memchunks};

impl<'p> Memchunks<'p> {
    /// Attempts one vectored write of the unread bytes to `writer`,
    /// draining whatever it accepted.
    ///
    /// Returns `Poll::Ready(Ok(0))` for an empty queue without polling
    /// `writer`.
    pub fn poll_write_to<W: AsyncWrite + ?Sized>(
        &mut self,
        cx: &mut Context<'_>,
        writer: Pin<&mut W>,
    ) -> Poll<io::Result<usize>> {
        if self.is_empty() {
            return Poll::Ready(Ok(0));
        }
        let n = {
            let mut iov = [IoSlice::new(&[]); MAX_WRITE_IOV];
            let count = self.riovec(&mut iov);
            ready!(writer.poll_write_vectored(cx, &iov[..count]))?
        };
        Poll::Ready(Ok(self.drain(n)))
    }

    /// Writes every unread byte to `writer`, draining as it goes.
    ///
    /// # Example
    ///
    /// ```ignore
    /// use futures_io::AsyncWrite;
    /// use respool::Memchunks;
    ///
    /// async fn send<W: AsyncWrite + Unpin>(buf: &mut Memchunks<'_>, sock: W) -> std::io::Result<()> {
    ///     let written = buf.drain_to(sock).await?;
    ///     println!("wrote {written} bytes");
    ///     Ok(())
    /// }
    /// ```
    pub fn drain_to<W: AsyncWrite>(&mut self, writer: W) -> DrainTo<'_, 'p, W> {
        DrainTo {
            writer,
            buf: self,
            written: 0,
        }
    }
}

pin_project! {
    /// Future returned by [`Memchunks::drain_to`].
    ///
    /// Resolves to the total number of bytes written once the queue is
    /// empty. A writer that accepts zero bytes fails with
    /// [`io::ErrorKind::WriteZero`].
    #[must_use = "futures do nothing unless you `.await` or poll them"]
    pub struct DrainTo<'a, 'p, W> {
        #[pin]
        writer: W,
        buf: &'a mut Memchunks<'p>,
        written: usize,
    }
}

impl<W: AsyncWrite> Future for DrainTo<'_, '_, W> {
    type Output = io::Result<usize>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let mut this = self.project();
        while !this.buf.is_empty() {
            let n = ready!(this.buf.poll_write_to(cx, this.writer.as_mut()))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            *this.written += n;
        }
        Poll::Ready(Ok(*this.written))
    }
}

// Integration tests for the runtime-agnostic async glue
// Tests run on tokio through tokio-util's futures-io compat layer

#![cfg(feature = "async-io")]

use std::io;
use std::pin::Pin;

use futures_util::future::poll_fn;
use futures_util::io::{AsyncReadExt as _, Cursor};
use respool::{ChunkBuffer, ChunkPool, ChunkPoolConfig, Memchunks};
use tokio::io::AsyncReadExt;
use tokio_util::compat::{TokioAsyncReadCompatExt, TokioAsyncWriteCompatExt};

fn pool(chunk_size: usize) -> ChunkPool {
    ChunkPool::new(ChunkPoolConfig::new(chunk_size, 8).unwrap()).unwrap()
}

#[tokio::test]
async fn test_drain_to_writes_everything() {
    let pool = pool(16);
    let mut buf = Memchunks::new(&pool);
    let data: Vec<u8> = (0..200u32).map(|i| i as u8).collect();
    buf.append(&data);

    // Large enough that the writer never applies backpressure
    let (client, mut server) = tokio::io::duplex(1024);
    let written = buf.drain_to(client.compat_write()).await.unwrap();

    assert_eq!(written, 200);
    assert!(buf.is_empty());
    assert_eq!(pool.checked_out(), 0);

    let mut received = vec![0u8; 200];
    server.read_exact(&mut received).await.unwrap();
    assert_eq!(received, data);
}

#[tokio::test]
async fn test_drain_to_with_backpressure() {
    let pool = pool(16);
    let data: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();

    let (client, mut server) = tokio::io::duplex(32);
    let reader = tokio::spawn(async move {
        let mut received = Vec::new();
        server.read_to_end(&mut received).await.unwrap();
        received
    });

    {
        let mut buf = Memchunks::new(&pool);
        buf.append(&data);
        let mut writer = client.compat_write();
        let written = buf.drain_to(&mut writer).await.unwrap();
        assert_eq!(written, 1000);
    }

    assert_eq!(reader.await.unwrap(), data);
}

#[tokio::test]
async fn test_drain_to_empty_queue() {
    let pool = pool(16);
    let mut buf = Memchunks::new(&pool);
    let (client, _server) = tokio::io::duplex(8);
    assert_eq!(buf.drain_to(client.compat_write()).await.unwrap(), 0);
}

#[tokio::test]
async fn test_drain_to_closed_peer_errors() {
    let pool = pool(16);
    let mut buf = Memchunks::new(&pool);
    buf.append(b"nobody is listening");

    let (client, server) = tokio::io::duplex(8);
    drop(server);
    let err = buf.drain_to(client.compat_write()).await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    // Nothing was accepted, so nothing was drained
    assert_eq!(buf.len(), 19);
}

#[tokio::test]
async fn test_fill_from() {
    let pool = pool(8);
    let mut buf = ChunkBuffer::new(&pool);
    let mock = tokio_test::io::Builder::new()
        .read(b"hello")
        .read(b" world")
        .build();
    let mut reader = mock.compat();

    assert_eq!(buf.fill_from(&mut reader).await.unwrap(), 5);
    assert_eq!(buf.data(), b"hello");

    // Only three bytes of space remain
    assert_eq!(buf.fill_from(&mut reader).await.unwrap(), 3);
    assert_eq!(buf.data(), b"hello wo");

    // Full buffer reads nothing
    assert_eq!(buf.fill_from(&mut reader).await.unwrap(), 0);

    buf.drain_reset(6);
    assert_eq!(buf.fill_from(&mut reader).await.unwrap(), 3);
    assert_eq!(buf.data(), b"world");
}

#[tokio::test]
async fn test_poll_write_to_drains_accepted_bytes() {
    let pool = pool(16);
    let mut buf = Memchunks::new(&pool);
    let data: Vec<u8> = (0..100u32).map(|i| i as u8).collect();
    buf.append(&data);

    let mut writer = Cursor::new(Vec::new());
    let mut total = 0;
    while !buf.is_empty() {
        total += poll_fn(|cx| buf.poll_write_to(cx, Pin::new(&mut writer)))
            .await
            .unwrap();
    }

    assert_eq!(total, 100);
    assert_eq!(pool.checked_out(), 0);
    assert_eq!(writer.into_inner(), data);
}

#[tokio::test]
async fn test_fill_from_eof_returns_fresh_chunk() {
    let pool = pool(8);
    let mut buf = ChunkBuffer::new(&pool);

    assert_eq!(buf.fill_from(futures_util::io::empty()).await.unwrap(), 0);
    assert!(!buf.is_allocated());
    assert_eq!(pool.checked_out(), 0);
}

#[tokio::test]
async fn test_fill_from_error_returns_fresh_chunk() {
    let pool = pool(8);
    let mut buf = ChunkBuffer::new(&pool);
    let mock = tokio_test::io::Builder::new()
        .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        .build();

    let err = buf.fill_from(mock.compat()).await.unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::ConnectionReset);
    assert!(!buf.is_allocated());
    assert_eq!(pool.checked_out(), 0);
}

#[tokio::test]
async fn test_fill_from_chain_of_readers() {
    let pool = pool(16);
    let mut buf = ChunkBuffer::new(&pool);
    let mut reader = Cursor::new(&b"GET "[..]).chain(Cursor::new(&b"/ HTTP/1.1"[..]));

    while buf.fill_from(&mut reader).await.unwrap() > 0 {}
    assert_eq!(buf.data(), b"GET / HTTP/1.1");
}

#![no_main]

use std::collections::VecDeque;
use std::io::IoSlice;

use libfuzzer_sys::fuzz_target;
use respool::{ChunkPool, ChunkPoolConfig, Memchunks};

fuzz_target!(|data: Vec<u8>| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the pool shape, the rest drive operations
    let chunk_size = data[0] as usize % 64 + 1;
    let max_free = data[1] as usize % 8;
    let pool = ChunkPool::new(ChunkPoolConfig::new(chunk_size, max_free).unwrap()).unwrap();
    let mut buf = Memchunks::new(&pool);
    let mut model: VecDeque<u8> = VecDeque::new();

    for window in data[2..].chunks(4) {
        let arg = window.get(1).copied().unwrap_or(0) as usize;
        match window[0] % 4 {
            0 | 1 => {
                let payload = &window[1..];
                buf.append(payload);
                model.extend(payload);
            }
            2 => {
                let n = arg.min(model.len());
                assert_eq!(buf.drain(n), n);
                model.drain(..n);
            }
            _ => {
                let mut out = vec![0u8; arg];
                let n = buf.remove(&mut out);
                let expected: Vec<u8> = model.drain(..n).collect();
                assert_eq!(&out[..n], &expected[..]);
            }
        }

        // Verify: byte count and pool accounting stay in sync
        assert_eq!(buf.len(), model.len());
        assert!(pool.free_count() <= max_free);
        assert_eq!(pool.checked_out(), buf.chunk_count());

        // Verify: riovec sees exactly the model contents
        let mut iov = vec![IoSlice::new(&[]); buf.chunk_count()];
        let n = buf.riovec(&mut iov);
        let gathered: Vec<u8> = iov[..n].iter().flat_map(|s| s.to_vec()).collect();
        assert!(gathered.iter().eq(model.iter()));
    }

    buf.reset();
    assert_eq!(pool.checked_out(), 0);
});

#![no_main]

use libfuzzer_sys::fuzz_target;
use respool::{ChunkBuffer, ChunkPool, ChunkPoolConfig};

fuzz_target!(|data: Vec<u8>| {
    let Some((&size, ops)) = data.split_first() else {
        return;
    };

    let pool = ChunkPool::new(ChunkPoolConfig::new(size as usize % 128 + 1, 2).unwrap()).unwrap();
    let mut buf = ChunkBuffer::new(&pool);
    let mut model: Vec<u8> = Vec::new();

    for window in ops.chunks(3) {
        let arg = window.get(1).copied().unwrap_or(0) as usize;
        match window[0] % 4 {
            0 => {
                let n = buf.write(&window[1..]);
                model.extend_from_slice(&window[1..1 + n]);
            }
            1 => {
                let n = arg.min(buf.rleft());
                buf.drain(n);
                model.drain(..n);
            }
            2 => {
                let n = arg.min(buf.rleft());
                buf.drain_reset(n);
                model.drain(..n);
                assert_eq!(buf.read_offset(), 0);
            }
            _ => {
                buf.reset();
                model.clear();
            }
        }

        // Verify: cursors stay ordered and the unread region matches
        assert!(buf.read_offset() <= buf.write_offset());
        assert!(buf.write_offset() <= buf.capacity());
        assert_eq!(buf.data(), &model[..]);
    }
});

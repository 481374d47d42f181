//! Backend connection reuse.
//!
//! - [`ConnectionPool`] - Idle connections for one backend target
//! - [`PooledConnection`] - What a connection exposes to its pool
//!
//! One pool exists per backend target per worker. The state machine from the
//! pool's point of view is just idle-in-pool, checked out, then either
//! returned with [`ConnectionPool::add`] or destroyed.

mod pool;

pub use pool::{ConnectionPool, PooledConnection};

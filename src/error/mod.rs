//! Error types for respool.
//!
//! Most of this crate encodes contracts rather than recoverable failures:
//! draining past the end of a buffer or removing a connection the pool does
//! not hold are caller bugs and trip `debug_assert!`s. What remains here is
//! the small set of conditions a caller can reasonably handle.

use thiserror::Error;

/// Errors returned by fallible pool and buffer operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Invalid configuration parameter.
    #[error("invalid config: {message}")]
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// A write did not fit in the space left in a single-chunk buffer.
    #[error("insufficient capacity: {requested} bytes requested, {available} available")]
    InsufficientCapacity {
        /// Bytes the caller tried to write.
        requested: usize,
        /// Bytes still writable in the buffer.
        available: usize,
    },
}

//! Idle connection pool for one backend target.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::config::ConnectionPoolConfig;

/// A backend connection that can sit idle in a [`ConnectionPool`].
///
/// The pool only tracks idleness. Protocol state stays with the connection,
/// and destroying a connection means dropping it, so its `Drop` impl is
/// where the transport gets closed.
pub trait PooledConnection {
    /// Identity of a connection, unique within one pool.
    type Key: Eq + Hash + Clone + fmt::Debug;

    /// Returns this connection's identity.
    fn key(&self) -> Self::Key;
}

/// A set of idle, reusable connections to one backend target.
///
/// The dispatcher pops a connection before sending a request, adds it back
/// after a clean keep-alive response, and removes it when the transport
/// fails while idle. Selection order in [`pop`](Self::pop) is unspecified:
/// there is no FIFO or LRU guarantee.
///
/// Dropping the pool destroys every idle connection.
///
/// # Example
///
/// ```
/// use respool::{ConnectionPool, PooledConnection};
///
/// struct Conn(u32);
///
/// impl PooledConnection for Conn {
///     type Key = u32;
///     fn key(&self) -> u32 {
///         self.0
///     }
/// }
///
/// let mut pool = ConnectionPool::default();
/// assert!(pool.pop().is_none());
///
/// pool.add(Conn(7));
/// let conn = pool.pop().expect("idle connection");
/// assert_eq!(conn.key(), 7);
/// assert!(pool.pop().is_none());
/// ```
pub struct ConnectionPool<C: PooledConnection> {
    config: ConnectionPoolConfig,
    idle: HashMap<C::Key, C>,
}

impl<C: PooledConnection> ConnectionPool<C> {
    /// Creates an empty pool.
    pub fn new(config: ConnectionPoolConfig) -> Self {
        Self {
            config,
            idle: HashMap::new(),
        }
    }

    /// Returns the pool configuration.
    pub fn config(&self) -> &ConnectionPoolConfig {
        &self.config
    }

    /// Returns the number of idle connections.
    pub fn len(&self) -> usize {
        self.idle.len()
    }

    /// Returns true if no connection is idle.
    pub fn is_empty(&self) -> bool {
        self.idle.is_empty()
    }

    /// Returns true if the connection with `key` is idle in this pool.
    pub fn contains(&self, key: &C::Key) -> bool {
        self.idle.contains_key(key)
    }

    /// Takes ownership of an idle, reusable connection.
    ///
    /// Returns `true` if the connection was pooled. When `max_idle` is set
    /// and already reached, the connection is dropped and `false` is
    /// returned.
    ///
    /// The connection must not already be in the pool. Debug builds assert
    /// this; release builds replace and drop the older entry.
    pub fn add(&mut self, conn: C) -> bool {
        let key = conn.key();
        if let Some(max) = self.config.max_idle {
            if self.idle.len() >= max && !self.idle.contains_key(&key) {
                debug!(?key, max_idle = max, "idle pool full, closing connection");
                return false;
            }
        }

        trace!(?key, idle = self.idle.len() + 1, "pooling idle connection");
        let previous = self.idle.insert(key, conn);
        debug_assert!(previous.is_none(), "connection added to the pool twice");
        true
    }

    /// Removes and returns an arbitrary idle connection.
    ///
    /// `None` means the caller should dial a fresh connection.
    pub fn pop(&mut self) -> Option<C> {
        let key = self.idle.keys().next()?.clone();
        self.idle.remove(&key)
    }

    /// Removes the idle connection with `key` and destroys it.
    ///
    /// The connection must be in the pool. Debug builds assert this; release
    /// builds ignore unknown keys.
    pub fn remove(&mut self, key: &C::Key) {
        let removed = self.idle.remove(key);
        debug_assert!(
            removed.is_some(),
            "removed connection {key:?} that is not in the pool"
        );
        if removed.is_some() {
            debug!(?key, "evicting idle connection");
        }
    }

    /// Destroys every connection for which `keep` returns false.
    ///
    /// This is the hook for expiry policies that live outside the pool,
    /// such as idle timeouts.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&C) -> bool,
    {
        let before = self.idle.len();
        self.idle.retain(|_, conn| keep(conn));
        let evicted = before - self.idle.len();
        if evicted > 0 {
            debug!(evicted, idle = self.idle.len(), "evicted idle connections");
        }
    }

    /// Destroys every idle connection.
    pub fn remove_all(&mut self) {
        if !self.idle.is_empty() {
            debug!(count = self.idle.len(), "closing all idle connections");
        }
        self.idle.clear();
    }
}

impl<C: PooledConnection> Default for ConnectionPool<C> {
    fn default() -> Self {
        Self::new(ConnectionPoolConfig::default())
    }
}

impl<C: PooledConnection> Drop for ConnectionPool<C> {
    fn drop(&mut self) {
        self.remove_all();
    }
}

impl<C: PooledConnection> fmt::Debug for ConnectionPool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionPool")
            .field("config", &self.config)
            .field("idle", &self.idle.keys().collect::<Vec<_>>())
            .finish()
    }
}

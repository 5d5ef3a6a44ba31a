//! Connection pooling contract and the sticky reservation wrapper.
//!
//! `Pooler` is the capability every pool exposes. A shared pool with many
//! interchangeable connections implements it outside this crate;
//! `StickyConnPool` implements it on top of one, pinning a single connection
//! for as long as the wrapper lives.

mod conn;
mod error;
pub mod mock;
mod sticky;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use conn::Conn;
pub use error::PoolError;
pub use sticky::{StickyConnPool, StickyPoolConfig};

/// Point-in-time counters reported by a shared pool.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolStats {
    /// Number of `get` calls.
    pub requests: u64,
    /// Number of `get` calls served by an idle connection.
    pub hits: u64,
    /// Number of `get` calls that timed out waiting for a connection.
    pub timeouts: u64,
    pub total_conns: u32,
    pub idle_conns: u32,
}

impl PoolStats {
    /// Fraction of requests served from idle connections.
    pub fn hit_ratio(&self) -> f64 {
        if self.requests == 0 {
            return 0.0;
        }
        self.hits as f64 / self.requests as f64
    }
}

/// Capability contract of a connection pool.
///
/// Connections are handed out as `Arc<Self::Conn>` and compared by pointer
/// identity, so callers must return the exact handle they were given.
pub trait Pooler: Send + Sync {
    type Conn: Send + Sync;

    /// Check out a connection. The flag is true if it was freshly created
    /// (or, for a sticky pool, freshly reserved).
    fn get(&self) -> Result<(Arc<Self::Conn>, bool), PoolError>;

    /// Return a connection for reuse.
    fn put(&self, conn: &Arc<Self::Conn>) -> Result<(), PoolError>;

    /// Evict a connection that must not be reused.
    fn remove(&self, conn: &Arc<Self::Conn>, reason: PoolError) -> Result<(), PoolError>;

    /// Number of connections currently owned by the pool.
    fn len(&self) -> usize;

    /// Number of connections (or free slots) available without waiting.
    fn idle_len(&self) -> usize;

    fn stats(&self) -> Option<PoolStats>;

    fn close(&self) -> Result<(), PoolError>;

    fn is_closed(&self) -> bool;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

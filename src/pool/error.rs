//! Error types shared by every `Pooler` implementation.
//!
//! The sticky wrapper never wraps these: whatever the shared pool returns is
//! handed back to the caller as-is.

use thiserror::Error;

/// Errors produced by connection pools.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PoolError {
    /// Operation attempted after the pool was closed.
    #[error("pool: connection pool is closed")]
    Closed,

    #[error("pool: connection pool timeout")]
    Timeout,

    /// Fixed reason used when a non-reusable sticky connection is discarded.
    #[error("pool: unreusable sticky connection")]
    Unreusable,

    #[error("pool: bad connection: {0}")]
    BadConn(String),

    #[error("pool: dial failed: {0}")]
    Dial(String),
}

impl PoolError {
    /// Returns true if the caller should stop using the pool entirely.
    pub fn is_closed(&self) -> bool {
        matches!(self, Self::Closed)
    }
}

// Copyright 2024-2026 sticky-pool Contributors
// Licensed under the Apache License, Version 2.0

//! Sticky connection reservation.
//!
//! A `StickyConnPool` checks out at most one connection from a shared pool
//! and hands that same connection to every caller until the wrapper is
//! closed. Transactions, pipelines and pub/sub sessions use it to stay on
//! one physical connection across many logical operations.
//!
//! State machine:
//!
//! ```text
//! Unacquired --get--> Held --remove--> Unacquired
//!      |               |
//!      +----close------+----> Closed (terminal)
//! ```
//!
//! Every operation runs under a single `parking_lot::Mutex`, including the
//! call into the shared pool, so acquisition is single-flight and only one
//! caller can dispose of the held connection.

use std::sync::Arc;

use parking_lot::Mutex;

use super::{PoolError, PoolStats, Pooler};
use crate::telemetry::{record_acquire, record_dispose, record_force_remove, Disposition};

/// Configuration for sticky pools.
#[derive(Debug, Clone)]
pub struct StickyPoolConfig {
    /// Return the held connection to the shared pool on close instead of
    /// discarding it.
    pub reusable: bool,
}

impl Default for StickyPoolConfig {
    fn default() -> Self {
        Self { reusable: true }
    }
}

struct StickyState<C> {
    conn: Option<Arc<C>>,
    closed: bool,
}

/// Single-connection pool layered over a shared `Pooler`.
pub struct StickyConnPool<P: Pooler> {
    pool: Arc<P>,
    reusable: bool,
    state: Mutex<StickyState<P::Conn>>,
}

impl<P: Pooler> StickyConnPool<P> {
    /// Create an empty wrapper. No connection is acquired until `get`.
    pub fn new(pool: Arc<P>, reusable: bool) -> Self {
        Self {
            pool,
            reusable,
            state: Mutex::new(StickyState {
                conn: None,
                closed: false,
            }),
        }
    }

    pub fn with_config(pool: Arc<P>, config: &StickyPoolConfig) -> Self {
        Self::new(pool, config.reusable)
    }

    /// The currently held connection, if any. Never touches the shared pool.
    pub fn first(&self) -> Option<Arc<P::Conn>> {
        self.state.lock().conn.clone()
    }

    pub fn is_reusable(&self) -> bool {
        self.reusable
    }

    /// Evict whatever connection is held, without naming it.
    ///
    /// # Panics
    ///
    /// Panics if the pool is open and holds no connection.
    pub fn remove_held(&self, reason: PoolError) -> Result<(), PoolError> {
        self.remove_checked(None, reason)
    }

    fn remove_checked(
        &self,
        conn: Option<&Arc<P::Conn>>,
        reason: PoolError,
    ) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        if state.closed {
            return Ok(());
        }
        let Some(held) = state.conn.as_ref() else {
            invariant_violation("remove called with no held connection");
        };
        if let Some(conn) = conn {
            if !Arc::ptr_eq(held, conn) {
                invariant_violation("removed connection is not the held connection");
            }
        }

        record_force_remove();
        tracing::debug!(reason = %reason, "sticky pool: evicting held connection");
        self.remove_upstream(&mut state, reason)
    }

    fn put_upstream(&self, state: &mut StickyState<P::Conn>) -> Result<(), PoolError> {
        let Some(conn) = state.conn.take() else {
            return Ok(());
        };
        let result = self.pool.put(&conn);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "sticky pool: shared pool rejected returned connection");
        }
        result
    }

    fn remove_upstream(
        &self,
        state: &mut StickyState<P::Conn>,
        reason: PoolError,
    ) -> Result<(), PoolError> {
        let Some(conn) = state.conn.take() else {
            return Ok(());
        };
        let result = self.pool.remove(&conn, reason);
        if let Err(e) = &result {
            tracing::warn!(error = %e, "sticky pool: shared pool failed to remove connection");
        }
        result
    }

    /// Hand the held connection back per the `reusable` policy.
    fn dispose(&self, state: &mut StickyState<P::Conn>) -> Result<(), PoolError> {
        if state.conn.is_none() {
            return Ok(());
        }
        if self.reusable {
            record_dispose(Disposition::Return);
            tracing::debug!("sticky pool: returning connection to shared pool");
            self.put_upstream(state)
        } else {
            record_dispose(Disposition::Discard);
            tracing::debug!("sticky pool: discarding unreusable connection");
            self.remove_upstream(state, PoolError::Unreusable)
        }
    }
}

impl<P: Pooler> Pooler for StickyConnPool<P> {
    type Conn = P::Conn;

    fn get(&self) -> Result<(Arc<P::Conn>, bool), PoolError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        if let Some(conn) = &state.conn {
            record_acquire(false);
            return Ok((Arc::clone(conn), false));
        }

        let (conn, _) = self.pool.get().map_err(|e| {
            tracing::warn!(error = %e, "sticky pool: shared pool acquire failed");
            e
        })?;
        state.conn = Some(Arc::clone(&conn));
        record_acquire(true);
        tracing::debug!("sticky pool: reserved connection from shared pool");
        Ok((conn, true))
    }

    /// Keeps the connection reserved; it only leaves on `close` or `remove`.
    ///
    /// # Panics
    ///
    /// Panics if `conn` is not the held connection.
    fn put(&self, conn: &Arc<P::Conn>) -> Result<(), PoolError> {
        let state = self.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        match &state.conn {
            Some(held) if Arc::ptr_eq(held, conn) => Ok(()),
            _ => invariant_violation("released connection is not the held connection"),
        }
    }

    /// # Panics
    ///
    /// Panics if the pool is open and `conn` is not the held connection.
    fn remove(&self, conn: &Arc<P::Conn>, reason: PoolError) -> Result<(), PoolError> {
        self.remove_checked(Some(conn), reason)
    }

    fn len(&self) -> usize {
        usize::from(self.state.lock().conn.is_some())
    }

    fn idle_len(&self) -> usize {
        usize::from(self.state.lock().conn.is_none())
    }

    fn stats(&self) -> Option<PoolStats> {
        None
    }

    fn close(&self) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(PoolError::Closed);
        }
        state.closed = true;
        self.dispose(&mut state)
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

impl<P: Pooler> Drop for StickyConnPool<P> {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.closed || state.conn.is_none() {
            return;
        }
        tracing::debug!("sticky pool: dropped while holding a connection, disposing");
        state.closed = true;
        let mut state = StickyState {
            conn: state.conn.take(),
            closed: true,
        };
        let _ = self.dispose(&mut state);
    }
}

/// Caller misuse. Never surfaced as a `PoolError`.
#[track_caller]
fn invariant_violation(msg: &str) -> ! {
    tracing::error!("sticky pool: invariant violated: {}", msg);
    panic!("sticky pool: {msg}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::mock::{MockCall, MockPool};

    fn sticky(reusable: bool) -> (Arc<MockPool>, StickyConnPool<MockPool>) {
        let shared = Arc::new(MockPool::new());
        let pool = StickyConnPool::new(Arc::clone(&shared), reusable);
        (shared, pool)
    }

    #[test]
    fn test_new_is_empty() {
        let (shared, pool) = sticky(true);
        assert!(pool.first().is_none());
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.idle_len(), 1);
        assert!(!pool.is_closed());
        assert_eq!(shared.get_calls(), 0);
    }

    #[test]
    fn test_get_is_sticky() {
        let (shared, pool) = sticky(true);
        let (first, is_new) = pool.get().unwrap();
        assert!(is_new);
        let (second, is_new) = pool.get().unwrap();
        assert!(!is_new);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(shared.get_calls(), 1);
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.idle_len(), 0);
    }

    #[test]
    fn test_get_error_leaves_slot_empty() {
        let (shared, pool) = sticky(true);
        shared.fail_next_get(PoolError::Timeout);
        assert_eq!(pool.get().unwrap_err(), PoolError::Timeout);
        assert!(pool.first().is_none());

        let (_, is_new) = pool.get().unwrap();
        assert!(is_new);
        assert_eq!(shared.get_calls(), 2);
    }

    #[test]
    fn test_put_keeps_connection() {
        let (shared, pool) = sticky(true);
        let (conn, _) = pool.get().unwrap();
        pool.put(&conn).unwrap();
        assert_eq!(pool.len(), 1);
        assert!(Arc::ptr_eq(&pool.first().unwrap(), &conn));
        assert!(shared.calls().iter().all(|c| !matches!(c, MockCall::Put(_))));
    }

    #[test]
    #[should_panic(expected = "released connection is not the held connection")]
    fn test_put_foreign_connection_panics() {
        let (shared, pool) = sticky(true);
        pool.get().unwrap();
        let (foreign, _) = shared.get().unwrap();
        let _ = pool.put(&foreign);
    }

    #[test]
    #[should_panic(expected = "released connection is not the held connection")]
    fn test_put_without_held_connection_panics() {
        let (shared, pool) = sticky(true);
        let (foreign, _) = shared.get().unwrap();
        let _ = pool.put(&foreign);
    }

    #[test]
    fn test_close_reusable_returns_connection() {
        let (shared, pool) = sticky(true);
        let (conn, _) = pool.get().unwrap();
        pool.close().unwrap();
        assert_eq!(shared.calls().last(), Some(&MockCall::Put(conn.id())));
        assert_eq!(pool.len(), 0);
        assert!(pool.is_closed());
    }

    #[test]
    fn test_close_unreusable_discards_connection() {
        let (shared, pool) = sticky(false);
        let (conn, _) = pool.get().unwrap();
        pool.close().unwrap();
        assert_eq!(
            shared.calls().last(),
            Some(&MockCall::Remove(conn.id(), PoolError::Unreusable))
        );
        assert!(pool.first().is_none());
    }

    #[test]
    fn test_close_propagates_upstream_error() {
        let (shared, pool) = sticky(true);
        pool.get().unwrap();
        shared.fail_next_put(PoolError::Closed);
        assert_eq!(pool.close().unwrap_err(), PoolError::Closed);
        assert!(pool.is_closed());
        assert_eq!(pool.len(), 0);
    }

    #[test]
    fn test_drop_disposes_held_connection() {
        let (shared, pool) = sticky(true);
        let (conn, _) = pool.get().unwrap();
        drop(pool);
        assert_eq!(shared.calls().last(), Some(&MockCall::Put(conn.id())));
    }

    #[test]
    fn test_drop_after_close_does_nothing_more() {
        let (shared, pool) = sticky(false);
        pool.get().unwrap();
        pool.close().unwrap();
        let calls = shared.calls().len();
        drop(pool);
        assert_eq!(shared.calls().len(), calls);
    }

    #[test]
    fn test_stats_not_tracked() {
        let (_, pool) = sticky(true);
        pool.get().unwrap();
        assert!(pool.stats().is_none());
    }

    #[test]
    fn test_with_config() {
        let shared = Arc::new(MockPool::new());
        let pool = StickyConnPool::with_config(shared, &StickyPoolConfig { reusable: false });
        assert!(!pool.is_reusable());
        assert!(StickyPoolConfig::default().reusable);
    }
}

//! Recording in-memory `Pooler` for tests and benches.
//!
//! Connections are created on demand, returned connections are reused
//! first-in first-out, and every call is logged so tests can assert exactly
//! what the sticky wrapper asked of its shared pool.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Conn, PoolError, PoolStats, Pooler};

/// A call observed by the mock, keyed by connection id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Get,
    Put(u64),
    Remove(u64, PoolError),
    Close,
}

#[derive(Default)]
struct MockState {
    idle: VecDeque<Arc<Conn<()>>>,
    total: usize,
    calls: Vec<MockCall>,
    stats: PoolStats,
    fail_get: Option<PoolError>,
    fail_put: Option<PoolError>,
    fail_remove: Option<PoolError>,
    closed: bool,
}

/// Mock shared pool backed by a `VecDeque` of idle connections.
#[derive(Default)]
pub struct MockPool {
    state: Mutex<MockState>,
    get_calls: AtomicUsize,
    get_delay: Option<Duration>,
}

impl MockPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sleep for `delay` inside every `get`, to widen race windows.
    pub fn with_get_delay(delay: Duration) -> Self {
        Self {
            get_delay: Some(delay),
            ..Self::default()
        }
    }

    /// Make the next `get` fail with `err`.
    pub fn fail_next_get(&self, err: PoolError) {
        self.state.lock().fail_get = Some(err);
    }

    pub fn fail_next_put(&self, err: PoolError) {
        self.state.lock().fail_put = Some(err);
    }

    pub fn fail_next_remove(&self, err: PoolError) {
        self.state.lock().fail_remove = Some(err);
    }

    /// Number of `get` calls, including failed ones.
    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.state.lock().calls.clone()
    }
}

impl Pooler for MockPool {
    type Conn = Conn<()>;

    fn get(&self) -> Result<(Arc<Conn<()>>, bool), PoolError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.get_delay {
            std::thread::sleep(delay);
        }

        let mut state = self.state.lock();
        state.calls.push(MockCall::Get);
        state.stats.requests += 1;
        if state.closed {
            return Err(PoolError::Closed);
        }
        if let Some(err) = state.fail_get.take() {
            if err == PoolError::Timeout {
                state.stats.timeouts += 1;
            }
            return Err(err);
        }
        if let Some(conn) = state.idle.pop_front() {
            state.stats.hits += 1;
            conn.touch();
            return Ok((conn, false));
        }
        state.total += 1;
        Ok((Arc::new(Conn::new(())), true))
    }

    fn put(&self, conn: &Arc<Conn<()>>) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Put(conn.id()));
        if let Some(err) = state.fail_put.take() {
            return Err(err);
        }
        state.idle.push_back(Arc::clone(conn));
        Ok(())
    }

    fn remove(&self, conn: &Arc<Conn<()>>, reason: PoolError) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Remove(conn.id(), reason));
        state.total = state.total.saturating_sub(1);
        match state.fail_remove.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn len(&self) -> usize {
        self.state.lock().total
    }

    fn idle_len(&self) -> usize {
        self.state.lock().idle.len()
    }

    fn stats(&self) -> Option<PoolStats> {
        let state = self.state.lock();
        Some(PoolStats {
            total_conns: state.total as u32,
            idle_conns: state.idle.len() as u32,
            ..state.stats
        })
    }

    fn close(&self) -> Result<(), PoolError> {
        let mut state = self.state.lock();
        state.calls.push(MockCall::Close);
        if state.closed {
            return Err(PoolError::Closed);
        }
        state.closed = true;
        state.idle.clear();
        state.total = 0;
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.state.lock().closed
    }
}

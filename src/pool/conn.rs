// Copyright 2024-2026 sticky-pool Contributors
// Licensed under the Apache License, Version 2.0

//! Pooled connection handle.
//!
//! Shared pools wrap their transport in a `Conn` and hand it out as
//! `Arc<Conn<T>>`. Identity is pointer identity of the `Arc`; the `id` is
//! for logs only.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

static NEXT_CONN_ID: AtomicU64 = AtomicU64::new(1);

/// A connection owned by a shared pool.
#[derive(Debug)]
pub struct Conn<T> {
    id: u64,
    inner: T,
    created_at: Instant,
    used_at: Mutex<Instant>,
}

impl<T> Conn<T> {
    pub fn new(inner: T) -> Self {
        let now = Instant::now();
        Self {
            id: NEXT_CONN_ID.fetch_add(1, Ordering::Relaxed),
            inner,
            created_at: now,
            used_at: Mutex::new(now),
        }
    }

    /// Process-unique identifier, monotonically increasing.
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn used_at(&self) -> Instant {
        *self.used_at.lock()
    }

    /// Mark the connection as used now.
    pub fn touch(&self) {
        *self.used_at.lock() = Instant::now();
    }

    /// True if the connection has not been touched for at least `timeout`.
    pub fn is_idle_for(&self, timeout: Duration) -> bool {
        self.used_at().elapsed() >= timeout
    }
}

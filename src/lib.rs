//! Sticky connection reservation over a shared connection pool.
//!
//! A [`pool::StickyConnPool`] checks out one connection from a shared
//! [`pool::Pooler`] the first time it is asked and hands that same
//! connection to every later caller, so a transaction, pipeline or pub/sub
//! session stays on one physical connection. On close the connection goes
//! back to the shared pool, or is discarded if the wrapper was built
//! non-reusable.
//!
//! ```
//! use std::sync::Arc;
//! use sticky_pool::pool::{mock::MockPool, Pooler, StickyConnPool};
//!
//! let shared = Arc::new(MockPool::new());
//! let sticky = StickyConnPool::new(Arc::clone(&shared), true);
//!
//! let (conn, is_new) = sticky.get().unwrap();
//! assert!(is_new);
//! sticky.put(&conn).unwrap();
//!
//! let (again, is_new) = sticky.get().unwrap();
//! assert!(!is_new);
//! assert!(Arc::ptr_eq(&conn, &again));
//!
//! sticky.close().unwrap();
//! assert_eq!(shared.idle_len(), 1);
//! ```
//!
//! # Design Principles
//!
//! - **Single slot**: at most one connection is held, guarded by one lock
//! - **Single flight**: concurrent first callers trigger one shared-pool acquire
//! - **Verbatim errors**: shared-pool errors are returned unchanged, never retried
//! - **Loud misuse**: returning a connection the pool does not hold panics

pub mod config;
pub mod pool;
pub mod telemetry;

use std::sync::Arc;

use pool::{Pooler, StickyConnPool};

/// Build a sticky pool over `shared` using configuration from the environment.
pub fn sticky_from_env<P: Pooler>(shared: Arc<P>) -> StickyConnPool<P> {
    let config = config::load();
    StickyConnPool::with_config(shared, &config.sticky)
}

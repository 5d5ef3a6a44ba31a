//! Counters emitted by `StickyConnPool` through the `metrics` facade.
//!
//! Without an installed recorder every call here is a no-op.

use ::metrics::{counter, describe_counter, Unit};

pub const ACQUIRE_TOTAL: &str = "sticky_pool_acquire_total";
pub const DISPOSE_TOTAL: &str = "sticky_pool_dispose_total";
pub const FORCE_REMOVE_TOTAL: &str = "sticky_pool_force_remove_total";

/// What happened to a held connection when its sticky pool closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Handed back to the shared pool for reuse.
    Return,
    /// Evicted from the shared pool.
    Discard,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Return => "return",
            Self::Discard => "discard",
        }
    }
}

/// Register metric descriptions with the installed recorder.
pub fn init_metrics() {
    describe_counter!(
        ACQUIRE_TOTAL,
        Unit::Count,
        "Connections handed out by sticky pools, labelled by whether the shared pool was hit"
    );
    describe_counter!(
        DISPOSE_TOTAL,
        Unit::Count,
        "Held connections disposed of when a sticky pool closed"
    );
    describe_counter!(
        FORCE_REMOVE_TOTAL,
        Unit::Count,
        "Held connections evicted by callers as broken"
    );
}

/// Record a successful `get`. `newly_acquired` is true when the shared pool
/// was called.
pub fn record_acquire(newly_acquired: bool) {
    let new = if newly_acquired { "true" } else { "false" };
    counter!(ACQUIRE_TOTAL, "new" => new).increment(1);
}

pub fn record_dispose(kind: Disposition) {
    counter!(DISPOSE_TOTAL, "kind" => kind.as_str()).increment(1);
}

pub fn record_force_remove() {
    counter!(FORCE_REMOVE_TOTAL).increment(1);
}

//! Telemetry for sticky pools.
//!
//! Structured logging via `tracing` and counters via the `metrics` facade.
//! The library installs no metrics exporter; the host application does.

mod logging;
mod metrics;

pub use self::logging::{init_logging, LogConfig, LogError, LogFormat};
pub use self::metrics::{init_metrics, record_acquire, record_dispose, record_force_remove, Disposition};

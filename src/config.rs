//! Configuration loading from environment variables.
//!
//! Invalid values fall back to defaults without crashing.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |---|---|---|
//! | `STICKY_POOL_REUSABLE` | true | Return held connection to the shared pool on close |
//! | `STICKY_POOL_LOG_LEVEL` | info | `EnvFilter` directive |
//! | `STICKY_POOL_LOG_FORMAT` | json | `json` or `pretty` |
//! | `STICKY_POOL_LOG_FILE` | unset | Log file path (JSON format only) |

use std::path::PathBuf;

use crate::pool::StickyPoolConfig;
use crate::telemetry::{LogConfig, LogFormat};

/// All configuration loaded from environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub sticky: StickyPoolConfig,
    pub log: LogConfig,
}

/// Parse a boolean env var. Accepts `1/0`, `true/false`, `yes/no`, `on/off`.
fn parse_bool(key: &str, default: bool) -> bool {
    let Ok(val) = std::env::var(key) else {
        return default;
    };
    match val.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}

fn load_log_config() -> LogConfig {
    let defaults = LogConfig::default();
    let level = std::env::var("STICKY_POOL_LOG_LEVEL")
        .ok()
        .filter(|l| !l.trim().is_empty())
        .unwrap_or(defaults.level);
    let format = std::env::var("STICKY_POOL_LOG_FORMAT")
        .ok()
        .and_then(|f| f.parse::<LogFormat>().ok())
        .unwrap_or(defaults.format);
    let output_path = std::env::var_os("STICKY_POOL_LOG_FILE").map(PathBuf::from);
    LogConfig { format, level, output_path }
}

/// Load all configuration from environment variables.
pub fn load() -> EnvConfig {
    EnvConfig {
        sticky: StickyPoolConfig {
            reusable: parse_bool("STICKY_POOL_REUSABLE", true),
        },
        log: load_log_config(),
    }
}

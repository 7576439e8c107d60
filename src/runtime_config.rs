//! # Runtime Configuration Module
//!
//! Environment-driven tuning of the `may` coroutine runtime that serves
//! connections.
//!
//! ## Environment Variables
//!
//! ### `FEATHER_STACK_SIZE`
//!
//! Stack size of every connection coroutine. Accepts decimal (`32768`) or
//! hexadecimal (`0x8000`). Default: `0x8000` (32 KB).
//!
//! Handlers run on the connection coroutine, so deep handler call chains or
//! large stack buffers need a bigger stack. Memory cost is roughly
//! `stack_size × open connections`.
//!
//! ### `FEATHER_WORKERS`
//!
//! Number of scheduler threads. When unset, `may` picks one per CPU core.
//!
//! ## Usage
//!
//! ```rust
//! use feather::runtime_config::RuntimeConfig;
//!
//! let config = RuntimeConfig::from_env();
//! assert!(config.stack_size > 0);
//! ```

use std::env;

/// Default coroutine stack size (32 KB)
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Runtime configuration loaded from environment variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Stack size for coroutines in bytes
    pub stack_size: usize,
    /// Scheduler threads; `None` keeps the `may` default
    pub workers: Option<usize>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            stack_size: DEFAULT_STACK_SIZE,
            workers: None,
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_values(
            env::var("FEATHER_STACK_SIZE").ok().as_deref(),
            env::var("FEATHER_WORKERS").ok().as_deref(),
        )
    }

    /// Build from raw variable values; unparseable values fall back to defaults
    #[must_use]
    pub fn from_values(stack_size: Option<&str>, workers: Option<&str>) -> Self {
        let stack_size = stack_size
            .and_then(parse_size)
            .filter(|&s| s > 0)
            .unwrap_or(DEFAULT_STACK_SIZE);
        let workers = workers
            .and_then(|w| w.trim().parse::<usize>().ok())
            .filter(|&w| w > 0);
        RuntimeConfig {
            stack_size,
            workers,
        }
    }

    /// Apply to the global `may` configuration
    ///
    /// Must run before the first coroutine is spawned; later calls have no
    /// effect on the already-running scheduler.
    pub fn apply(&self) {
        let config = may::config();
        config.set_stack_size(self.stack_size);
        if let Some(workers) = self.workers {
            config.set_workers(workers);
        }
        tracing::info!(
            stack_size = self.stack_size,
            workers = ?self.workers,
            "Coroutine runtime configured"
        );
    }
}

fn parse_size(val: &str) -> Option<usize> {
    let val = val.trim();
    match val.strip_prefix("0x").or_else(|| val.strip_prefix("0X")) {
        Some(hex) => usize::from_str_radix(hex, 16).ok(),
        None => val.parse().ok(),
    }
}

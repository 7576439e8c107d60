//! # CLI Module
//!
//! Command-line entry point for the bundled demo application.
//!
//! ## Commands
//!
//! ### `serve`
//!
//! ```bash
//! feather serve --addr 127.0.0.1:8080 --log-level debug
//! ```
//!
//! Options:
//! - `--addr <ADDR>` - Listen address (default `0.0.0.0:8080`, env `FEATHER_ADDR`)
//! - `--log-level <LEVEL>` - Overrides `FEATHER_LOG_LEVEL`
//! - `--no-cors` - Skip the CORS middleware
//!
//! ### `routes`
//!
//! ```bash
//! feather routes
//! ```
//!
//! Prints every registered `(method, pattern, regex)` in matching order.

mod commands;


pub use commands::{demo_app, run_cli, Cli, Commands, ECHO_METHODS};

//! Logging utilities.
//!
//! Engine code logs through the `log` facade only; this module owns the one
//! place where a backend (`env_logger`) is installed.

mod init;

pub use init::{init_logging, LoggingConfig};

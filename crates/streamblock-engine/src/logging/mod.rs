//! Logging utilities.
//!
//! Engine code only talks to the `log` facade; this module owns the one-time
//! `env_logger` setup for binaries embedding the engine.

mod init;

pub use init::{init_logging, LoggingConfig};

//! Logging setup for the Campus authorization tools
//!
//! Libraries only emit `tracing` events. Binaries call one of the init
//! functions here once at startup to install a subscriber.

pub mod init;

pub use init::{init_logging_from_config, init_simple_tracing};

//! Logger setup for binaries embedding the engine.
//!
//! The engine itself only emits through the `log` facade.

mod init;

pub use init::{init_logging, LoggingConfig};

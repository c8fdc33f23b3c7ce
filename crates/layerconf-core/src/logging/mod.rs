//! Logging abstractions
//!
//! Every component holds a [`SharedLogger`] instead of calling a global
//! logging facade directly. The default is [`TracingLogger`], which forwards to
//! `tracing`; tests swap in [`MemoryLogger`] to inspect exactly what was
//! written (and assert that no secret ever was).

mod traits;
mod noop;
mod memory;
mod tracing_logger;

pub use traits::{Logger, LoggerExt, SharedLogger};
pub use noop::NoOpLogger;
pub use memory::{LogLevel, LogRecord, MemoryLogger};
pub use tracing_logger::{init_tracing, TracingLogger};

use std::sync::Arc;

/// Logger used when the caller does not inject one
pub fn default_logger(target: &'static str) -> SharedLogger {
    Arc::new(TracingLogger::new(target))
}

//! `tracing`-backed logger

use tracing_subscriber::EnvFilter;

use super::traits::Logger;

/// Logger that forwards to the `tracing` macros
///
/// The `component` is attached as a structured field so output from the
/// secrets chain and the config merge can be told apart.
#[derive(Debug, Clone, Copy)]
pub struct TracingLogger {
    component: &'static str,
}

impl TracingLogger {
    /// Create a logger tagged with `component`
    pub fn new(component: &'static str) -> Self {
        Self { component }
    }

    /// Component tag attached to every event
    pub fn component(&self) -> &'static str {
        self.component
    }
}

impl Default for TracingLogger {
    fn default() -> Self {
        Self::new("layerconf")
    }
}

impl Logger for TracingLogger {
    fn debug(&self, message: &str) {
        tracing::debug!(component = self.component, "{}", message);
    }

    fn info(&self, message: &str) {
        tracing::info!(component = self.component, "{}", message);
    }

    fn warn(&self, message: &str) {
        tracing::warn!(component = self.component, "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::error!(component = self.component, "{}", message);
    }
}

/// Install a global fmt subscriber
///
/// `RUST_LOG` wins when set; otherwise `default_filter` (e.g. `"info"` or
/// `"layerconf_core=debug"`) is used. Returns `false` if a global subscriber
/// was already installed, which makes repeated calls harmless.
pub fn init_tracing(default_filter: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_logger_component() {
        assert_eq!(TracingLogger::new("secrets").component(), "secrets");
        assert_eq!(TracingLogger::default().component(), "layerconf");
    }

    #[test]
    fn test_tracing_logger_logs_without_subscriber() {
        let logger = TracingLogger::new("test");
        logger.debug("debug message");
        logger.info("info message");
        logger.warn("warn message");
        logger.error("error message");
    }

    #[test]
    fn test_init_tracing_is_idempotent() {
        let _ = init_tracing("debug");
        assert!(!init_tracing("debug"));
    }
}

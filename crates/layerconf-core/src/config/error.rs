//! Configuration error types

use crate::secrets::SecretError;

/// Errors that can occur while building or querying configuration
///
/// Unreadable config sources and unparsable values are not errors: they are
/// logged and the merge carries on. What remains here is what must stop the
/// caller.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required secret could not be resolved (or the secret lookup was invalid)
    #[error(transparent)]
    Secret(#[from] SecretError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config policy: {0}")]
    Policy(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ConfigError {
    /// Whether this wraps the fail-fast "missing required secret" error
    pub fn is_missing_secret(&self) -> bool {
        matches!(self, Self::Secret(e) if e.is_missing())
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

//! Core trait and error types for secret providers

use thiserror::Error;

/// Errors that can occur while resolving or validating secrets
#[derive(Error, Debug)]
pub enum SecretError {
    /// The caller passed an empty key. This is a programming error, not a lookup miss.
    #[error("Secret key cannot be null or empty")]
    InvalidKey,

    /// A required secret was not found in any provider
    #[error(
        "Required secret '{key}' not found!\n\n\
         Please set up your environment:\n  \
         1. Copy .env.template to .env\n  \
         2. Fill in the required values\n  \
         OR\n  \
         Set environment variable: {key}\n\n\
         For CI/CD, ensure the repository secrets are configured.\n\
         See docs/SECURITY.md for details."
    )]
    MissingSecret { key: String },

    /// A candidate secret value was rejected by validation
    #[error("Secret '{key}' {reason}")]
    InvalidValue { key: String, reason: String },

    /// A provider chain must contain at least one provider
    #[error("Secrets provider chain must contain at least one provider")]
    EmptyChain,

    /// No provider is registered under this name
    #[error("Unknown secrets provider: {0}")]
    UnknownProvider(String),

    /// One or more providers failed to reload; the rest were reloaded
    #[error("Failed to reload {} secrets provider(s): {}", failures.len(), failures.join("; "))]
    Reload { failures: Vec<String> },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl SecretError {
    /// Create a missing secret error
    pub fn missing(key: impl Into<String>) -> Self {
        Self::MissingSecret { key: key.into() }
    }

    /// Create an invalid value error
    pub fn invalid_value(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Whether this is the fail-fast "missing required secret" error
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::MissingSecret { .. })
    }
}

pub type SecretResult<T> = Result<T, SecretError>;

/// A pluggable source of secret values
///
/// Providers are ranked by their position in a [`SecretsManager`] chain; the
/// first provider that returns a non-empty value wins. Adding a backend (a
/// cloud key vault, a CI secret store) means implementing this trait and
/// appending the provider to the chain.
///
/// Contract:
/// - a missing key is a normal `None`, never an error
/// - an empty key is treated as not present
/// - `has_secret(k) == get_secret(k).is_some()`
/// - `reload` may run while other threads call `get_secret`; readers see the
///   old or the new value, never a partial one
///
/// # Example
///
/// ```
/// use layerconf_core::secrets::{MemorySecretsProvider, SecretsProvider};
///
/// let provider = MemorySecretsProvider::new();
/// provider.insert("TEST_PASSWORD", "secret_sauce");
/// assert!(provider.has_secret("TEST_PASSWORD"));
/// assert_eq!(provider.get_secret("MISSING"), None);
/// ```
///
/// [`SecretsManager`]: super::SecretsManager
pub trait SecretsProvider: Send + Sync {
    /// Stable identifier used in logs and diagnostics
    fn name(&self) -> &str;

    /// Look up a secret
    fn get_secret(&self, key: &str) -> Option<String>;

    /// Check whether a secret exists
    fn has_secret(&self, key: &str) -> bool {
        self.get_secret(key).is_some()
    }

    /// Drop any cached values and re-read the underlying source
    fn reload(&self) -> SecretResult<()>;
}

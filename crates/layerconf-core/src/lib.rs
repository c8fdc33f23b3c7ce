//! layerconf core
//!
//! Layered configuration with pluggable secrets providers and credential
//! masking. Configuration is merged from ranked sources (defaults, a
//! properties file, allow-listed environment variables, system properties
//! and secrets) into one read-mostly key/value view.
//!
//! ## Secrets
//!
//! Secrets resolve through an ordered chain of [`SecretsProvider`]s; the
//! first provider holding a non-empty value wins. Providers cache what they
//! resolve until reloaded.
//!
//! ```
//! use std::sync::Arc;
//! use layerconf_core::secrets::{MemorySecretsProvider, SecretsManager};
//!
//! let secrets = SecretsManager::builder()
//!     .provider(Arc::new(MemorySecretsProvider::new().with("API_TOKEN", "tok_live_123")))
//!     .build()
//!     .unwrap();
//! assert_eq!(secrets.get_secret_masked("API_TOKEN").unwrap(), "to********23");
//! ```
//!
//! ## Masking
//!
//! Anything that may carry a credential goes through [`masking`] before it
//! reaches a log line or an error message.

pub mod config;
pub mod env;
pub mod global;
pub mod logging;
pub mod masking;
pub mod secrets;

// Re-export commonly used types
pub use config::{
    ConfigError, ConfigManager, ConfigOptions, ConfigPolicy, ConfigResult, SystemProperties,
};

pub use env::{EnvSource, MapEnv, ProcessEnv, SharedEnv};

pub use global::{GlobalError, GlobalResult};

pub use logging::{Logger, LoggerExt, MemoryLogger, NoOpLogger, SharedLogger, TracingLogger};

pub use masking::{mask_for_log, mask_in_text, mask_url_credentials, mask_value};

pub use secrets::{
    EnvironmentSecretsProvider, MemorySecretsProvider, ResolvedSecret, SecretError, SecretResult,
    SecretsManager, SecretsProvider,
};

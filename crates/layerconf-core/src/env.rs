//! Environment variable sources
//!
//! Config overrides and the environment secrets provider read variables
//! through [`EnvSource`] rather than `std::env` directly, so a test can hand
//! them a fixed map instead of mutating the real process environment.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;

/// Read-only view of environment variables
pub trait EnvSource: Send + Sync {
    /// Value of `key`, or `None` if unset or not valid unicode
    fn var(&self, key: &str) -> Option<String>;

    /// Like [`EnvSource::var`] but treats an empty value as unset
    fn non_empty(&self, key: &str) -> Option<String> {
        self.var(key).filter(|value| !value.is_empty())
    }
}

/// Type alias for a shared environment source
pub type SharedEnv = Arc<dyn EnvSource>;

/// The real process environment
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        std::env::var(key).ok()
    }
}

/// Map-backed environment for tests and embedding
///
/// # Example
///
/// ```
/// use layerconf_core::env::{EnvSource, MapEnv};
///
/// let env = MapEnv::new().with("BROWSER", "firefox");
/// assert_eq!(env.var("BROWSER").as_deref(), Some("firefox"));
/// env.set("BROWSER", "edge");
/// assert_eq!(env.var("BROWSER").as_deref(), Some("edge"));
/// ```
#[derive(Debug, Default)]
pub struct MapEnv {
    vars: RwLock<HashMap<String, String>>,
}

impl MapEnv {
    /// Create an empty environment
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    /// Set a variable
    pub fn set(&self, key: impl Into<String>, value: impl Into<String>) {
        self.vars.write().insert(key.into(), value.into());
    }

    /// Unset a variable
    pub fn remove(&self, key: &str) {
        self.vars.write().remove(key);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let vars = iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        Self { vars: RwLock::new(vars) }
    }
}

impl EnvSource for MapEnv {
    fn var(&self, key: &str) -> Option<String> {
        self.vars.read().get(key).cloned()
    }
}

//! In-memory secrets provider

use std::collections::HashMap;

use parking_lot::RwLock;

use super::traits::{SecretResult, SecretsProvider};

/// In-memory secrets provider for testing and injected values
///
/// Values live only as long as the provider. `reload` keeps them: there is
/// no underlying source to re-read.
///
/// # Example
///
/// ```
/// use layerconf_core::secrets::{MemorySecretsProvider, SecretsProvider};
///
/// let provider = MemorySecretsProvider::new().with("STANDARD_USER", "standard_user");
/// assert_eq!(provider.get_secret("STANDARD_USER").as_deref(), Some("standard_user"));
/// ```
#[derive(Debug, Default)]
pub struct MemorySecretsProvider {
    secrets: RwLock<HashMap<String, String>>,
}

impl MemorySecretsProvider {
    /// Create a new empty provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with initial values
    pub fn with_secrets(initial: HashMap<String, String>) -> Self {
        Self {
            secrets: RwLock::new(initial),
        }
    }

    /// Builder-style insert
    #[must_use]
    pub fn with(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or replace a secret
    pub fn insert(&self, key: impl Into<String>, value: impl Into<String>) {
        self.secrets.write().insert(key.into(), value.into());
    }

    /// Remove a secret
    pub fn remove(&self, key: &str) -> Option<String> {
        self.secrets.write().remove(key)
    }

    /// Clear all secrets
    pub fn clear(&self) {
        self.secrets.write().clear();
    }

    /// Number of secrets held
    pub fn len(&self) -> usize {
        self.secrets.read().len()
    }

    /// Check if the provider is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecretsProvider for MemorySecretsProvider {
    fn name(&self) -> &str {
        "MemorySecretsProvider"
    }

    fn get_secret(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }
        self.secrets
            .read()
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned()
    }

    fn reload(&self) -> SecretResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_provider_name() {
        assert_eq!(MemorySecretsProvider::new().name(), "MemorySecretsProvider");
    }

    #[test]
    fn test_memory_provider_crud() {
        let provider = MemorySecretsProvider::new();
        assert!(provider.is_empty());
        assert_eq!(provider.get_secret("key"), None);

        provider.insert("key", "value");
        assert_eq!(provider.len(), 1);
        assert_eq!(provider.get_secret("key"), Some("value".to_string()));
        assert!(provider.has_secret("key"));

        provider.insert("key", "new_value");
        assert_eq!(provider.get_secret("key"), Some("new_value".to_string()));

        assert_eq!(provider.remove("key"), Some("new_value".to_string()));
        assert!(!provider.has_secret("key"));
    }

    #[test]
    fn test_memory_provider_empty_key_and_value() {
        let provider = MemorySecretsProvider::new().with("BLANK", "");
        assert_eq!(provider.get_secret(""), None);
        assert!(!provider.has_secret(""));
        assert_eq!(provider.get_secret("BLANK"), None);
        assert!(!provider.has_secret("BLANK"));
    }

    #[test]
    fn test_memory_provider_reload_keeps_values() {
        let mut initial = HashMap::new();
        initial.insert("key1".to_string(), "value1".to_string());
        let provider = MemorySecretsProvider::with_secrets(initial);

        provider.reload().unwrap();
        assert_eq!(provider.get_secret("key1"), Some("value1".to_string()));

        provider.clear();
        assert!(provider.is_empty());
    }

    #[test]
    fn test_memory_provider_thread_safety() {
        use std::sync::Arc;
        use std::thread;

        let provider = Arc::new(MemorySecretsProvider::new());
        let handles: Vec<_> = (0..10)
            .map(|i| {
                let provider = Arc::clone(&provider);
                thread::spawn(move || {
                    let key = format!("key_{}", i);
                    let value = format!("value_{}", i);
                    provider.insert(key.clone(), value.clone());
                    assert_eq!(provider.get_secret(&key), Some(value));
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(provider.len(), 10);
    }
}

//! Secrets manager: the facade over an ordered provider chain

use std::sync::Arc;

use parking_lot::Mutex;

use super::env_provider::EnvironmentSecretsProvider;
use super::registry::{build_chain, ProviderContext};
use super::traits::{SecretError, SecretResult, SecretsProvider};
use crate::logging::{default_logger, LoggerExt, SharedLogger};
use crate::masking::{mask_str, mask_text};

/// A secret together with the provider that supplied it
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedSecret {
    /// The requested key
    pub key: String,
    /// The secret value
    pub value: String,
    /// Name of the provider that supplied the value
    pub source: String,
}

impl std::fmt::Debug for ResolvedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedSecret")
            .field("key", &self.key)
            .field("value", &mask_str(&self.value))
            .field("source", &self.source)
            .finish()
    }
}

/// Single point of access to secrets
///
/// Holds a provider chain fixed at construction. Every lookup walks the chain
/// in order and returns the first non-empty value; the manager keeps no cache
/// of its own and relies on each provider's cache.
///
/// Lookups take no lock. [`reload`](Self::reload) serializes against other
/// reloads only.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use layerconf_core::secrets::{MemorySecretsProvider, SecretsManager};
///
/// let manager = SecretsManager::builder()
///     .provider(Arc::new(MemorySecretsProvider::new().with("TEST_PASSWORD", "secret_sauce")))
///     .build()
///     .unwrap();
///
/// assert_eq!(manager.get_secret("TEST_PASSWORD").unwrap(), "secret_sauce");
/// assert_eq!(manager.get_secret_masked("TEST_PASSWORD").unwrap(), "se********ce");
/// assert!(manager.get_optional_secret("NOT_THERE").unwrap().is_none());
/// assert!(manager.get_secret("NOT_THERE").unwrap_err().is_missing());
/// ```
pub struct SecretsManager {
    providers: Vec<Arc<dyn SecretsProvider>>,
    reload_lock: Mutex<()>,
    logger: SharedLogger,
}

impl SecretsManager {
    /// Create a manager over `providers`, tried in the given order
    pub fn new(providers: Vec<Arc<dyn SecretsProvider>>) -> SecretResult<Self> {
        Self::with_logger(providers, default_logger("secrets"))
    }

    /// Create a manager with an explicit logger
    pub fn with_logger(
        providers: Vec<Arc<dyn SecretsProvider>>,
        logger: SharedLogger,
    ) -> SecretResult<Self> {
        if providers.is_empty() {
            return Err(SecretError::EmptyChain);
        }
        Ok(Self::from_chain(providers, logger))
    }

    /// Manager with the standard chain: environment variables plus `./.env`
    pub fn with_defaults() -> Self {
        let env: Arc<dyn SecretsProvider> = Arc::new(EnvironmentSecretsProvider::new());
        Self::from_chain(vec![env], default_logger("secrets"))
    }

    /// Build the chain from registered provider names, in order
    pub fn from_provider_names(names: &[&str]) -> SecretResult<Self> {
        Self::from_provider_names_with(names, &ProviderContext::default())
    }

    /// [`from_provider_names`](Self::from_provider_names) with explicit
    /// provider inputs; the manager logs through `ctx.logger` too
    pub fn from_provider_names_with(names: &[&str], ctx: &ProviderContext) -> SecretResult<Self> {
        Self::with_logger(build_chain(names, ctx)?, Arc::clone(&ctx.logger))
    }

    // Callers guarantee at least one provider.
    fn from_chain(providers: Vec<Arc<dyn SecretsProvider>>, logger: SharedLogger) -> Self {
        logger.info_fmt(format_args!(
            "SecretsManager initialized with {} provider(s)",
            providers.len()
        ));
        Self {
            providers,
            reload_lock: Mutex::new(()),
            logger,
        }
    }

    /// Start building a manager
    pub fn builder() -> SecretsManagerBuilder {
        SecretsManagerBuilder::default()
    }

    /// Resolve `key`, tagging which provider supplied it
    ///
    /// Returns `Ok(None)` when no provider has the key.
    pub fn resolve(&self, key: &str) -> SecretResult<Option<ResolvedSecret>> {
        validate_key(key)?;

        for provider in &self.providers {
            if let Some(value) = provider.get_secret(key).filter(|v| !v.is_empty()) {
                self.logger.debug_fmt(format_args!(
                    "Secret '{}' retrieved from provider: {}",
                    key,
                    provider.name()
                ));
                return Ok(Some(ResolvedSecret {
                    key: key.to_string(),
                    value,
                    source: provider.name().to_string(),
                }));
            }
        }

        Ok(None)
    }

    /// Get a required secret
    ///
    /// # Errors
    ///
    /// - [`SecretError::InvalidKey`] for an empty key
    /// - [`SecretError::MissingSecret`] when no provider has the key
    pub fn get_secret(&self, key: &str) -> SecretResult<String> {
        self.get_secret_with(key, true)?
            .ok_or_else(|| SecretError::missing(key))
    }

    /// Get an optional secret; a miss is `Ok(None)`
    pub fn get_optional_secret(&self, key: &str) -> SecretResult<Option<String>> {
        self.get_secret_with(key, false)
    }

    /// Get a secret, failing on a miss only when `required` is true
    pub fn get_secret_with(&self, key: &str, required: bool) -> SecretResult<Option<String>> {
        match self.resolve(key)? {
            Some(resolved) => Ok(Some(resolved.value)),
            None if required => {
                self.logger.error_fmt(format_args!(
                    "Required secret '{}' not found in any provider",
                    key
                ));
                Err(SecretError::missing(key))
            }
            None => Ok(None),
        }
    }

    /// Get a required secret, masked for logging
    pub fn get_secret_masked(&self, key: &str) -> SecretResult<String> {
        self.get_secret(key).map(|value| mask_str(&value))
    }

    /// Check whether any provider has `key`; an empty key is simply absent
    pub fn has_secret(&self, key: &str) -> bool {
        if key.is_empty() {
            return false;
        }
        self.providers.iter().any(|provider| provider.has_secret(key))
    }

    /// Reload every provider in chain order
    ///
    /// A failing provider does not stop the others. Once all have been
    /// attempted, any failures are returned together as
    /// [`SecretError::Reload`].
    pub fn reload(&self) -> SecretResult<()> {
        let _guard = self.reload_lock.lock();

        let mut failures = Vec::new();
        for provider in &self.providers {
            if let Err(e) = provider.reload() {
                let message = format!("{}: {}", provider.name(), mask_text(&e.to_string()));
                self.logger
                    .error_fmt(format_args!("Failed to reload secrets provider {}", message));
                failures.push(message);
            }
        }

        if failures.is_empty() {
            self.logger.info("All secrets providers reloaded");
            Ok(())
        } else {
            Err(SecretError::Reload { failures })
        }
    }

    /// Check that a newly supplied secret value is acceptable
    ///
    /// Rejects absent, empty and whitespace-only values.
    pub fn validate_secret(&self, key: &str, value: Option<&str>) -> SecretResult<()> {
        match value {
            None | Some("") => Err(SecretError::invalid_value(key, "is null or empty")),
            Some(v) if v.trim().is_empty() => {
                Err(SecretError::invalid_value(key, "contains only whitespace"))
            }
            Some(_) => Ok(()),
        }
    }

    /// Names of the providers in chain order
    pub fn active_providers(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.name().to_string()).collect()
    }

    /// The provider chain
    pub fn providers(&self) -> &[Arc<dyn SecretsProvider>] {
        &self.providers
    }
}

impl std::fmt::Debug for SecretsManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretsManager")
            .field("providers", &self.active_providers())
            .finish()
    }
}

fn validate_key(key: &str) -> SecretResult<()> {
    if key.is_empty() {
        return Err(SecretError::InvalidKey);
    }
    Ok(())
}

/// Builder for [`SecretsManager`]
#[derive(Default)]
pub struct SecretsManagerBuilder {
    providers: Vec<Arc<dyn SecretsProvider>>,
    logger: Option<SharedLogger>,
}

impl SecretsManagerBuilder {
    /// Append a provider to the end of the chain
    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn SecretsProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Use `logger` instead of the tracing-backed default
    #[must_use]
    pub fn logger(mut self, logger: SharedLogger) -> Self {
        self.logger = Some(logger);
        self
    }

    /// Build the manager
    ///
    /// # Errors
    ///
    /// [`SecretError::EmptyChain`] if no provider was added.
    pub fn build(self) -> SecretResult<SecretsManager> {
        let logger = self.logger.unwrap_or_else(|| default_logger("secrets"));
        SecretsManager::with_logger(self.providers, logger)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::logging::{LogLevel, MemoryLogger};
    use crate::secrets::MemorySecretsProvider;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider whose reload always fails, counting attempts
    #[derive(Default)]
    struct FailingProvider {
        reloads: AtomicUsize,
    }

    impl SecretsProvider for FailingProvider {
        fn name(&self) -> &str {
            "FailingProvider"
        }

        fn get_secret(&self, _key: &str) -> Option<String> {
            None
        }

        fn reload(&self) -> SecretResult<()> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            Err(SecretError::Io(std::io::Error::new(
                std::io::ErrorKind::Other,
                "vault unreachable, token=abc123",
            )))
        }
    }

    /// Memory provider that counts reloads
    #[derive(Default)]
    struct CountingProvider {
        inner: MemorySecretsProvider,
        reloads: AtomicUsize,
    }

    impl SecretsProvider for CountingProvider {
        fn name(&self) -> &str {
            "CountingProvider"
        }

        fn get_secret(&self, key: &str) -> Option<String> {
            self.inner.get_secret(key)
        }

        fn reload(&self) -> SecretResult<()> {
            self.reloads.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn manager_with(values: &[(&str, &str)]) -> (SecretsManager, Arc<MemoryLogger>) {
        let provider = MemorySecretsProvider::new();
        for (k, v) in values {
            provider.insert(*k, *v);
        }
        let logger = Arc::new(MemoryLogger::new());
        let manager = SecretsManager::builder()
            .provider(Arc::new(provider))
            .logger(logger.clone())
            .build()
            .unwrap();
        (manager, logger)
    }

    #[test]
    fn test_get_secret_found() {
        let (manager, _) = manager_with(&[("STANDARD_USER", "standard_user")]);
        assert_eq!(manager.get_secret("STANDARD_USER").unwrap(), "standard_user");
        assert!(manager.has_secret("STANDARD_USER"));
    }

    #[test]
    fn test_get_secret_required_missing() {
        let (manager, logger) = manager_with(&[]);
        let err = manager.get_secret("NON_EXISTENT_SECRET_KEY_12345").unwrap_err();
        assert!(err.is_missing());
        let message = err.to_string();
        assert!(message.contains("NON_EXISTENT_SECRET_KEY_12345"));
        assert!(message.contains(".env"));
        assert!(message.contains("SECURITY.md"));
        assert_eq!(logger.messages_at(LogLevel::Error).len(), 1);
    }

    #[test]
    fn test_get_secret_optional_missing() {
        let (manager, _) = manager_with(&[]);
        assert_eq!(manager.get_optional_secret("NON_EXISTENT_SECRET_KEY_12345").unwrap(), None);
        assert_eq!(manager.get_secret_with("NON_EXISTENT_SECRET_KEY_12345", false).unwrap(), None);
        assert!(!manager.has_secret("NON_EXISTENT_SECRET_KEY_12345"));
    }

    #[test]
    fn test_empty_key_is_invalid_not_missing() {
        let (manager, _) = manager_with(&[]);
        assert!(matches!(manager.get_secret(""), Err(SecretError::InvalidKey)));
        assert!(matches!(manager.get_optional_secret(""), Err(SecretError::InvalidKey)));
        assert!(!manager.has_secret(""));
    }

    #[test]
    fn test_chain_priority_and_source_tag() {
        let first = Arc::new(MemorySecretsProvider::new().with("SHARED", "from_first"));
        let second = Arc::new(
            MemorySecretsProvider::new()
                .with("SHARED", "from_second")
                .with("ONLY_SECOND", "second_only"),
        );
        let env = Arc::new(EnvironmentSecretsProvider::with_options(
            Arc::new(MapEnv::new().with("ONLY_ENV", "env_value")),
            None,
            Arc::new(MemoryLogger::new()),
        ));

        let manager = SecretsManager::builder()
            .provider(first)
            .provider(second)
            .provider(env)
            .logger(Arc::new(MemoryLogger::new()))
            .build()
            .unwrap();

        assert_eq!(manager.get_secret("SHARED").unwrap(), "from_first");
        assert_eq!(manager.get_secret("ONLY_SECOND").unwrap(), "second_only");

        let resolved = manager.resolve("ONLY_ENV").unwrap().unwrap();
        assert_eq!(resolved.value, "env_value");
        assert_eq!(resolved.source, "EnvironmentSecretsProvider");
        assert_eq!(
            manager.active_providers(),
            vec!["MemorySecretsProvider", "MemorySecretsProvider", "EnvironmentSecretsProvider"]
        );
    }

    #[test]
    fn test_resolved_secret_debug_is_masked() {
        let resolved = ResolvedSecret {
            key: "TEST_PASSWORD".to_string(),
            value: "secret_sauce".to_string(),
            source: "memory".to_string(),
        };
        let debug = format!("{:?}", resolved);
        assert!(!debug.contains("secret_sauce"));
        assert!(debug.contains("se********ce"));
    }

    #[test]
    fn test_get_secret_masked() {
        let (manager, logger) = manager_with(&[("TEST_PASSWORD", "secret_sauce")]);
        let masked = manager.get_secret_masked("TEST_PASSWORD").unwrap();
        assert_eq!(masked, "se********ce");
        assert!(!logger.contains("secret_sauce"));
    }

    #[test]
    fn test_empty_chain_rejected() {
        assert!(matches!(SecretsManager::new(Vec::new()), Err(SecretError::EmptyChain)));
        assert!(matches!(SecretsManager::builder().build(), Err(SecretError::EmptyChain)));
    }

    #[test]
    fn test_from_provider_names() {
        let manager = SecretsManager::from_provider_names(&["memory", "env"]).unwrap();
        assert_eq!(
            manager.active_providers(),
            vec!["MemorySecretsProvider", "EnvironmentSecretsProvider"]
        );

        let err = SecretsManager::from_provider_names(&["memory", "no_such_backend"]).unwrap_err();
        assert!(matches!(err, SecretError::UnknownProvider(_)));
    }

    #[test]
    fn test_from_provider_names_with_context() {
        let logger = Arc::new(MemoryLogger::new());
        let ctx = ProviderContext {
            env: Arc::new(MapEnv::new().with("TEST_PASSWORD", "secret_sauce")),
            dotenv_path: None,
            logger: logger.clone(),
        };
        let manager = SecretsManager::from_provider_names_with(&["memory", "env"], &ctx).unwrap();

        assert_eq!(manager.get_secret("TEST_PASSWORD").unwrap(), "secret_sauce");
        assert_eq!(
            logger.messages_at(LogLevel::Info),
            vec!["SecretsManager initialized with 2 provider(s)".to_string()]
        );
        assert!(matches!(
            SecretsManager::from_provider_names_with(&[], &ctx),
            Err(SecretError::EmptyChain)
        ));
    }

    #[test]
    fn test_with_defaults_chain() {
        let manager = SecretsManager::with_defaults();
        assert_eq!(manager.active_providers(), vec!["EnvironmentSecretsProvider"]);
    }

    #[test]
    fn test_reload_continues_past_failure() {
        let failing = Arc::new(FailingProvider::default());
        let counting = Arc::new(CountingProvider::default());
        let logger = Arc::new(MemoryLogger::new());
        let manager = SecretsManager::builder()
            .provider(failing.clone())
            .provider(counting.clone())
            .logger(logger.clone())
            .build()
            .unwrap();

        let err = manager.reload().unwrap_err();
        match err {
            SecretError::Reload { failures } => {
                assert_eq!(failures.len(), 1);
                assert!(failures[0].starts_with("FailingProvider"));
                assert!(!failures[0].contains("abc123"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(failing.reloads.load(Ordering::SeqCst), 1);
        assert_eq!(counting.reloads.load(Ordering::SeqCst), 1);
        assert!(!logger.contains("abc123"));
        // Chain order and membership unchanged
        assert_eq!(manager.active_providers(), vec!["FailingProvider", "CountingProvider"]);
    }

    #[test]
    fn test_reload_twice_is_idempotent() {
        let (manager, _) = manager_with(&[("STANDARD_USER", "standard_user")]);
        manager.reload().unwrap();
        let before = manager.get_optional_secret("STANDARD_USER").unwrap();
        manager.reload().unwrap();
        let after = manager.get_optional_secret("STANDARD_USER").unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_validate_secret() {
        let (manager, _) = manager_with(&[]);
        assert!(manager.validate_secret("TEST_KEY", Some("valid_value")).is_ok());

        let err = manager.validate_secret("TEST_KEY", None).unwrap_err();
        assert_eq!(err.to_string(), "Secret 'TEST_KEY' is null or empty");

        assert!(matches!(
            manager.validate_secret("TEST_KEY", Some("")),
            Err(SecretError::InvalidValue { .. })
        ));

        let err = manager.validate_secret("TEST_KEY", Some("   ")).unwrap_err();
        assert_eq!(err.to_string(), "Secret 'TEST_KEY' contains only whitespace");
    }

    #[test]
    fn test_concurrent_lookups_and_reloads() {
        use std::thread;

        let (manager, _) = manager_with(&[("STANDARD_USER", "standard_user")]);
        let manager = Arc::new(manager);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..100 {
                        if i % 4 == 0 {
                            manager.reload().unwrap();
                        } else {
                            assert_eq!(
                                manager.get_secret("STANDARD_USER").unwrap(),
                                "standard_user"
                            );
                        }
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }
    }
}

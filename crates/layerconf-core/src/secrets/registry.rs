//! Named provider factories, so a chain can be described as a list of names
//! (for example from a deployment setting) instead of being built in code

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use super::env_provider::{EnvironmentSecretsProvider, DEFAULT_DOTENV_PATH};
use super::memory_provider::MemorySecretsProvider;
use super::traits::{SecretError, SecretResult, SecretsProvider};
use crate::env::{ProcessEnv, SharedEnv};
use crate::logging::{default_logger, SharedLogger};

/// Inputs shared by every provider in a chain built by name
#[derive(Clone)]
pub struct ProviderContext {
    /// Environment the providers read from
    pub env: SharedEnv,
    /// Dotenv file for providers that fall back to one; `None` disables it
    pub dotenv_path: Option<PathBuf>,
    pub logger: SharedLogger,
}

impl Default for ProviderContext {
    fn default() -> Self {
        Self {
            env: Arc::new(ProcessEnv),
            dotenv_path: Some(PathBuf::from(DEFAULT_DOTENV_PATH)),
            logger: default_logger("secrets"),
        }
    }
}

impl std::fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderContext")
            .field("dotenv_path", &self.dotenv_path)
            .finish()
    }
}

/// Builds a provider from the shared context
pub type ProviderFactory =
    Arc<dyn Fn(&ProviderContext) -> Arc<dyn SecretsProvider> + Send + Sync>;

static FACTORIES: Lazy<RwLock<BTreeMap<String, ProviderFactory>>> = Lazy::new(|| {
    let mut factories: BTreeMap<String, ProviderFactory> = BTreeMap::new();
    factories.insert(
        "env".to_string(),
        Arc::new(|ctx: &ProviderContext| {
            Arc::new(EnvironmentSecretsProvider::with_options(
                Arc::clone(&ctx.env),
                ctx.dotenv_path.clone(),
                Arc::clone(&ctx.logger),
            )) as Arc<dyn SecretsProvider>
        }),
    );
    factories.insert(
        "memory".to_string(),
        Arc::new(|_: &ProviderContext| {
            Arc::new(MemorySecretsProvider::new()) as Arc<dyn SecretsProvider>
        }),
    );
    RwLock::new(factories)
});

/// Register a factory under `name`; returns `true` if it replaced one
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use layerconf_core::secrets::{
///     create_provider, register_provider, MemorySecretsProvider, ProviderContext, SecretsProvider,
/// };
///
/// register_provider("vault-stub", |_: &ProviderContext| {
///     Arc::new(MemorySecretsProvider::new().with("TEST_PASSWORD", "from_vault"))
///         as Arc<dyn SecretsProvider>
/// });
/// let provider = create_provider("vault-stub", &ProviderContext::default()).unwrap();
/// assert_eq!(provider.get_secret("TEST_PASSWORD").as_deref(), Some("from_vault"));
/// ```
pub fn register_provider<F>(name: &str, factory: F) -> bool
where
    F: Fn(&ProviderContext) -> Arc<dyn SecretsProvider> + Send + Sync + 'static,
{
    FACTORIES
        .write()
        .insert(name.to_string(), Arc::new(factory))
        .is_some()
}

/// Build the provider registered as `name`
///
/// The factory runs outside the registry lock, so it may itself use the registry.
pub fn create_provider(
    name: &str,
    ctx: &ProviderContext,
) -> SecretResult<Arc<dyn SecretsProvider>> {
    let factory = FACTORIES
        .read()
        .get(name)
        .cloned()
        .ok_or_else(|| SecretError::UnknownProvider(name.to_string()))?;
    Ok(factory(ctx))
}

/// Build one provider per name, in order
///
/// Fails on the first unknown name; an empty list yields an empty chain.
pub fn build_chain(
    names: &[&str],
    ctx: &ProviderContext,
) -> SecretResult<Vec<Arc<dyn SecretsProvider>>> {
    names.iter().map(|name| create_provider(name, ctx)).collect()
}

/// Registered names, sorted
pub fn provider_names() -> Vec<String> {
    FACTORIES.read().keys().cloned().collect()
}

/// Check if a name is registered
pub fn has_provider(name: &str) -> bool {
    FACTORIES.read().contains_key(name)
}

/// Remove a registration (mainly for testing)
pub fn unregister_provider(name: &str) -> bool {
    FACTORIES.write().remove(name).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::logging::MemoryLogger;

    fn map_context(env: MapEnv) -> ProviderContext {
        ProviderContext {
            env: Arc::new(env),
            dotenv_path: None,
            logger: Arc::new(MemoryLogger::new()),
        }
    }

    #[test]
    fn test_builtin_names() {
        assert!(has_provider("env"));
        assert!(has_provider("memory"));
        let names = provider_names();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[test]
    fn test_env_factory_uses_context_env() {
        let ctx = map_context(MapEnv::new().with("STANDARD_USER", "standard_user"));
        let provider = create_provider("env", &ctx).unwrap();

        assert_eq!(provider.name(), "EnvironmentSecretsProvider");
        assert_eq!(provider.get_secret("STANDARD_USER").as_deref(), Some("standard_user"));
    }

    #[test]
    fn test_unknown_name() {
        let err = create_provider("nonexistent_xyz", &map_context(MapEnv::new()))
            .err()
            .unwrap();
        assert!(matches!(err, SecretError::UnknownProvider(ref name) if name == "nonexistent_xyz"));
    }

    #[test]
    fn test_build_chain_keeps_order() {
        let ctx = map_context(MapEnv::new());
        let chain = build_chain(&["memory", "env"], &ctx).unwrap();
        let names: Vec<_> = chain.iter().map(|p| p.name().to_string()).collect();
        assert_eq!(names, vec!["MemorySecretsProvider", "EnvironmentSecretsProvider"]);

        assert!(build_chain(&[], &ctx).unwrap().is_empty());
        assert!(matches!(
            build_chain(&["env", "missing_backend"], &ctx),
            Err(SecretError::UnknownProvider(_))
        ));
    }

    #[test]
    fn test_register_replace_and_unregister() {
        let first = register_provider("test_registry_custom", |_: &ProviderContext| {
            Arc::new(MemorySecretsProvider::new().with("K", "V1")) as Arc<dyn SecretsProvider>
        });
        let replaced = register_provider("test_registry_custom", |_: &ProviderContext| {
            Arc::new(MemorySecretsProvider::new().with("K", "V2")) as Arc<dyn SecretsProvider>
        });
        assert!(!first);
        assert!(replaced);

        let ctx = map_context(MapEnv::new());
        let provider = create_provider("test_registry_custom", &ctx).unwrap();
        assert_eq!(provider.get_secret("K").as_deref(), Some("V2"));

        assert!(unregister_provider("test_registry_custom"));
        assert!(!has_provider("test_registry_custom"));
    }

    #[test]
    fn test_factory_may_use_registry() {
        register_provider("test_registry_nested", |ctx: &ProviderContext| {
            match create_provider("memory", ctx) {
                Ok(inner) => inner,
                Err(_) => Arc::new(MemorySecretsProvider::new()) as Arc<dyn SecretsProvider>,
            }
        });
        let ctx = map_context(MapEnv::new());
        let provider = create_provider("test_registry_nested", &ctx).unwrap();
        assert_eq!(provider.name(), "MemorySecretsProvider");
        unregister_provider("test_registry_nested");
    }
}

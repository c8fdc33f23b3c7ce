//! Layered configuration manager
//!
//! Precedence, lowest to highest (later layers overwrite earlier ones):
//! 1. Built-in defaults from the [`ConfigPolicy`]
//! 2. The properties file (skipped with a warning if unreadable)
//! 3. Allow-listed environment variables (`BROWSER` → `browser`)
//! 4. System properties, for keys already present
//! 5. Required secrets from the [`SecretsManager`] (`TEST_PASSWORD` → `test.password`)
//!
//! Values set through [`ConfigManager::set_property`] sit above all five
//! until the next [`ConfigManager::reload`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use parking_lot::Mutex;

use super::error::ConfigResult;
use super::policy::{env_var_to_key, ConfigPolicy};
use super::properties::load_properties;
use super::store::ConfigStore;
use super::system::SystemProperties;
use crate::env::{EnvSource, ProcessEnv, SharedEnv};
use crate::logging::{default_logger, LoggerExt, SharedLogger};
use crate::masking::{mask_for_log, mask_text, mask_value};
use crate::secrets::SecretsManager;

/// Properties file read when no other path is configured
pub const DEFAULT_PROPERTIES_PATH: &str = "config/config.properties";

/// Inputs to the config merge
#[derive(Clone)]
pub struct ConfigOptions {
    /// Properties file; `None` skips the file layer
    pub properties_path: Option<PathBuf>,
    /// Defaults, env allow-list and required secrets
    pub policy: ConfigPolicy,
    /// Process-level overrides
    pub system_properties: SystemProperties,
    /// Where allow-listed environment variables are read from
    pub env: SharedEnv,
    pub logger: SharedLogger,
}

impl Default for ConfigOptions {
    fn default() -> Self {
        Self {
            properties_path: Some(PathBuf::from(DEFAULT_PROPERTIES_PATH)),
            policy: ConfigPolicy::default(),
            system_properties: SystemProperties::default(),
            env: Arc::new(ProcessEnv),
            logger: default_logger("config"),
        }
    }
}

impl ConfigOptions {
    /// Read the properties file from `path`
    #[must_use]
    pub fn with_properties_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.properties_path = Some(path.into());
        self
    }

    /// Skip the properties file layer
    #[must_use]
    pub fn without_properties_file(mut self) -> Self {
        self.properties_path = None;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: ConfigPolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_system_properties(mut self, system_properties: SystemProperties) -> Self {
        self.system_properties = system_properties;
        self
    }

    #[must_use]
    pub fn with_env(mut self, env: SharedEnv) -> Self {
        self.env = env;
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }
}

impl std::fmt::Debug for ConfigOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigOptions")
            .field("properties_path", &self.properties_path)
            .field("policy", &self.policy)
            .field("system_properties", &self.system_properties.len())
            .finish()
    }
}

/// Merged, queryable configuration
///
/// Construction fails if any required secret is missing, so a process that
/// holds a `ConfigManager` is known to have its credentials.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use layerconf_core::config::{ConfigManager, ConfigOptions, ConfigPolicy};
/// use layerconf_core::env::MapEnv;
/// use layerconf_core::secrets::{MemorySecretsProvider, SecretsManager};
///
/// let secrets = SecretsManager::builder()
///     .provider(Arc::new(MemorySecretsProvider::new().with("TEST_PASSWORD", "secret_sauce")))
///     .build()
///     .unwrap();
/// let mut policy = ConfigPolicy::default();
/// policy.required_secrets = vec!["TEST_PASSWORD".to_string()];
///
/// let options = ConfigOptions::default()
///     .without_properties_file()
///     .with_policy(policy)
///     .with_env(Arc::new(MapEnv::new().with("BROWSER", "firefox")));
/// let config = ConfigManager::new(options, Arc::new(secrets)).unwrap();
///
/// assert_eq!(config.get_property("browser").as_deref(), Some("firefox"));
/// assert_eq!(config.get_int("implicit.wait", 0), 10);
/// assert_eq!(config.get_credential_masked("test.password").as_deref(), Some("se********ce"));
/// ```
pub struct ConfigManager {
    options: ConfigOptions,
    secrets: Arc<SecretsManager>,
    store: ConfigStore,
    reload_lock: Mutex<()>,
}

impl ConfigManager {
    /// Merge all layers
    ///
    /// # Errors
    ///
    /// [`ConfigError::Secret`](super::ConfigError::Secret) if a required secret is missing.
    pub fn new(options: ConfigOptions, secrets: Arc<SecretsManager>) -> ConfigResult<Self> {
        let manager = Self {
            options,
            secrets,
            store: ConfigStore::new(),
            reload_lock: Mutex::new(()),
        };
        let merged = manager.merge_layers()?;
        manager.store.replace(merged);
        manager
            .logger()
            .info_fmt(format_args!("Configuration loaded ({} keys)", manager.store.len()));
        Ok(manager)
    }

    /// Default options over the default secrets chain
    pub fn load_default() -> ConfigResult<Self> {
        Self::new(ConfigOptions::default(), Arc::new(SecretsManager::with_defaults()))
    }

    fn logger(&self) -> &SharedLogger {
        &self.options.logger
    }

    fn merge_layers(&self) -> ConfigResult<BTreeMap<String, String>> {
        let mut props = self.options.policy.defaults.clone();
        self.apply_properties_file(&mut props);
        self.apply_env_overrides(&mut props);
        self.apply_system_properties(&mut props);
        self.apply_secrets(&mut props)?;
        Ok(props)
    }

    fn apply_properties_file(&self, props: &mut BTreeMap<String, String>) {
        let Some(path) = self.options.properties_path.as_deref() else {
            return;
        };
        match load_properties(path) {
            Ok(entries) => {
                self.logger().info_fmt(format_args!(
                    "Loaded {} properties from {}",
                    entries.len(),
                    path.display()
                ));
                props.extend(entries);
            }
            Err(e) => {
                self.logger().warn_fmt(format_args!(
                    "Could not load config file {}, using defaults: {}",
                    path.display(),
                    mask_text(&e.to_string())
                ));
            }
        }
    }

    fn apply_env_overrides(&self, props: &mut BTreeMap<String, String>) {
        let policy = &self.options.policy;
        let env = &self.options.env;

        for var in &policy.env_overrides {
            if let Some(value) = env.non_empty(var) {
                let key = env_var_to_key(var);
                self.logger().info_fmt(format_args!(
                    "Overridden from ENV: {} = {}",
                    key,
                    mask_for_log(&key, &value)
                ));
                props.insert(key, value);
            }
        }

        if let Some(grid_var) = policy.grid_url_var.as_deref() {
            if let Some(url) = env.non_empty(grid_var) {
                props.insert(policy.grid_flag_key.clone(), "true".to_string());
                props.insert(env_var_to_key(grid_var), url);
            }
        }
    }

    fn apply_system_properties(&self, props: &mut BTreeMap<String, String>) {
        let system = &self.options.system_properties;
        for (key, value) in props.iter_mut() {
            if let Some(override_value) = system.get(key).filter(|v| !v.is_empty()) {
                self.logger().debug_fmt(format_args!(
                    "Overridden from System Property: {} = {}",
                    key,
                    mask_for_log(key, override_value)
                ));
                *value = override_value.to_string();
            }
        }
    }

    fn apply_secrets(&self, props: &mut BTreeMap<String, String>) -> ConfigResult<()> {
        for secret_key in &self.options.policy.required_secrets {
            match self.secrets.get_secret(secret_key) {
                Ok(value) => {
                    let key = env_var_to_key(secret_key);
                    self.logger()
                        .debug_fmt(format_args!("Loaded secret '{}' from SecretsManager", key));
                    props.insert(key, value);
                }
                Err(e) => {
                    self.logger().error_fmt(format_args!(
                        "Failed to load secret '{}': {}",
                        secret_key,
                        mask_text(&e.to_string())
                    ));
                    return Err(e.into());
                }
            }
        }
        Ok(())
    }

    /// Value for `key`
    pub fn get_property(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }

    /// Value for `key`, or `default` when absent
    pub fn get_property_or(&self, key: &str, default: &str) -> String {
        self.store.get(key).unwrap_or_else(|| default.to_string())
    }

    /// Alias of [`get_property_or`](Self::get_property_or)
    pub fn get_string(&self, key: &str, default: &str) -> String {
        self.get_property_or(key, default)
    }

    /// Integer value; unparsable values log a warning and yield `default`
    pub fn get_int(&self, key: &str, default: i32) -> i32 {
        self.get_parsed(key, default, "integer")
    }

    /// Long value; unparsable values log a warning and yield `default`
    pub fn get_long(&self, key: &str, default: i64) -> i64 {
        self.get_parsed(key, default, "long")
    }

    /// Boolean value: `true`/`false` in any case
    ///
    /// Anything else logs a warning and yields `default`.
    pub fn get_boolean(&self, key: &str, default: bool) -> bool {
        let Some(raw) = self.store.get(key) else {
            return default;
        };
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("true") {
            true
        } else if trimmed.eq_ignore_ascii_case("false") {
            false
        } else {
            self.logger().warn_fmt(format_args!(
                "Invalid boolean for key {}: {}",
                key,
                mask_for_log(key, &raw)
            ));
            default
        }
    }

    fn get_parsed<T: FromStr>(&self, key: &str, default: T, kind: &str) -> T {
        let Some(raw) = self.store.get(key) else {
            return default;
        };
        match raw.trim().parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                self.logger().warn_fmt(format_args!(
                    "Invalid {} for key {}: {}",
                    kind,
                    key,
                    mask_for_log(key, &raw)
                ));
                default
            }
        }
    }

    /// Override a value until the next reload
    pub fn set_property(&self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        self.logger()
            .debug_fmt(format_args!("Property set: {} = {}", key, mask_for_log(&key, &value)));
        self.store.set(key, value);
    }

    /// Re-run the whole merge from scratch
    ///
    /// Secrets providers are reloaded first so the secrets layer sees fresh
    /// values. A provider reload failure is logged and the merge continues;
    /// a missing required secret fails the reload and leaves the previous
    /// configuration in place.
    pub fn reload(&self) -> ConfigResult<()> {
        let _guard = self.reload_lock.lock();

        if let Err(e) = self.secrets.reload() {
            self.logger().warn_fmt(format_args!(
                "Secrets reload reported failures: {}",
                mask_text(&e.to_string())
            ));
        }

        let merged = self.merge_layers()?;
        self.store.replace(merged);
        self.logger().info("Configuration reloaded");
        Ok(())
    }

    /// Value for `key` masked for logging
    pub fn get_credential_masked(&self, key: &str) -> Option<String> {
        mask_value(self.get_property(key).as_deref())
    }

    /// All keys in order
    pub fn keys(&self) -> Vec<String> {
        self.store.keys()
    }

    /// Number of keys
    pub fn len(&self) -> usize {
        self.store.len()
    }

    /// Check if no keys are configured
    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    /// Every entry, with credential-shaped values masked
    pub fn snapshot_masked(&self) -> BTreeMap<String, String> {
        self.store
            .snapshot()
            .into_iter()
            .map(|(key, value)| {
                let masked = mask_for_log(&key, &value);
                (key, masked)
            })
            .collect()
    }

    /// [`snapshot_masked`](Self::snapshot_masked) as pretty JSON
    pub fn export_json(&self) -> ConfigResult<String> {
        Ok(serde_json::to_string_pretty(&self.snapshot_masked())?)
    }

    /// The secrets manager backing the secrets layer
    pub fn secrets(&self) -> &Arc<SecretsManager> {
        &self.secrets
    }

    /// Properties file path, if the file layer is enabled
    pub fn properties_path(&self) -> Option<&Path> {
        self.options.properties_path.as_deref()
    }

    /// The options this manager was built with
    pub fn options(&self) -> &ConfigOptions {
        &self.options
    }
}

impl std::fmt::Debug for ConfigManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigManager")
            .field("options", &self.options)
            .field("keys", &self.store.len())
            .field("secrets", &self.secrets)
            .finish()
    }
}

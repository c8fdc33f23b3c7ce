//! Environment variable and dotenv file secrets provider

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};

use super::dotenv::read_dotenv;
use super::traits::{SecretResult, SecretsProvider};
use crate::env::{EnvSource, ProcessEnv, SharedEnv};
use crate::logging::{default_logger, Logger, LoggerExt, SharedLogger};
use crate::masking::mask_text;

/// Dotenv file read when no other path is configured
pub const DEFAULT_DOTENV_PATH: &str = ".env";

/// Secrets provider backed by the process environment and a dotenv file
///
/// Lookup order:
/// 1. process environment variables
/// 2. the dotenv file (default `.env`), only if the variable is unset or empty
///
/// The dotenv file is optional. A missing file is logged and ignored; a
/// malformed file is logged as a warning and ignored as a whole, leaving the
/// process environment as the only source.
///
/// # Caching
///
/// The first successful lookup of a key is cached and served from the cache
/// until [`reload`](SecretsProvider::reload) is called. A variable exported
/// after its first lookup is therefore not observed until the next reload.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use layerconf_core::env::MapEnv;
/// use layerconf_core::logging::NoOpLogger;
/// use layerconf_core::secrets::{EnvironmentSecretsProvider, SecretsProvider};
///
/// let env = Arc::new(MapEnv::new().with("STANDARD_USER", "standard_user"));
/// let provider = EnvironmentSecretsProvider::with_options(env, None, Arc::new(NoOpLogger));
/// assert_eq!(provider.get_secret("STANDARD_USER").as_deref(), Some("standard_user"));
/// ```
pub struct EnvironmentSecretsProvider {
    env: SharedEnv,
    dotenv_path: Option<PathBuf>,
    dotenv: RwLock<HashMap<String, String>>,
    cache: RwLock<HashMap<String, String>>,
    // Bumped on every reload so lookups that started before it don't refill
    // the cache with old values.
    generation: AtomicU64,
    reload_lock: Mutex<()>,
    logger: SharedLogger,
}

impl EnvironmentSecretsProvider {
    /// Provider over the real process environment and `./.env`
    pub fn new() -> Self {
        Self::with_options(
            Arc::new(ProcessEnv),
            Some(PathBuf::from(DEFAULT_DOTENV_PATH)),
            default_logger("secrets.env"),
        )
    }

    /// Provider over the real process environment and a specific dotenv file
    pub fn with_dotenv_path(path: impl Into<PathBuf>) -> Self {
        Self::with_options(Arc::new(ProcessEnv), Some(path.into()), default_logger("secrets.env"))
    }

    /// Fully configured provider
    ///
    /// `dotenv_path = None` disables the file fallback entirely.
    pub fn with_options(
        env: SharedEnv,
        dotenv_path: Option<PathBuf>,
        logger: SharedLogger,
    ) -> Self {
        let dotenv = load_dotenv(dotenv_path.as_deref(), logger.as_ref());
        Self {
            env,
            dotenv_path,
            dotenv: RwLock::new(dotenv),
            cache: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
            reload_lock: Mutex::new(()),
            logger,
        }
    }

    /// Path of the dotenv file, if the file fallback is enabled
    pub fn dotenv_path(&self) -> Option<&Path> {
        self.dotenv_path.as_deref()
    }

    /// Number of entries loaded from the dotenv file
    pub fn dotenv_entry_count(&self) -> usize {
        self.dotenv.read().len()
    }

    /// Number of cached lookups
    pub fn cached_len(&self) -> usize {
        self.cache.read().len()
    }

    fn remember(&self, generation: u64, key: &str, value: &str) {
        let mut cache = self.cache.write();
        if self.generation.load(Ordering::Acquire) == generation {
            cache.entry(key.to_string()).or_insert_with(|| value.to_string());
        }
    }
}

impl Default for EnvironmentSecretsProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretsProvider for EnvironmentSecretsProvider {
    fn name(&self) -> &str {
        "EnvironmentSecretsProvider"
    }

    fn get_secret(&self, key: &str) -> Option<String> {
        if key.is_empty() {
            return None;
        }

        let cached = self.cache.read().get(key).cloned();
        if cached.is_some() {
            return cached;
        }

        let generation = self.generation.load(Ordering::Acquire);

        if let Some(value) = self.env.non_empty(key) {
            self.logger
                .debug_fmt(format_args!("Secret '{}' loaded from environment variable", key));
            self.remember(generation, key, &value);
            return Some(value);
        }

        let from_file = self
            .dotenv
            .read()
            .get(key)
            .filter(|value| !value.is_empty())
            .cloned();
        if let Some(value) = from_file {
            self.logger.debug_fmt(format_args!("Secret '{}' loaded from .env file", key));
            self.remember(generation, key, &value);
            return Some(value);
        }

        self.logger.debug_fmt(format_args!(
            "Secret '{}' not found in environment variables or .env file",
            key
        ));
        None
    }

    fn reload(&self) -> SecretResult<()> {
        let _guard = self.reload_lock.lock();

        let fresh = load_dotenv(self.dotenv_path.as_deref(), self.logger.as_ref());
        *self.dotenv.write() = fresh;

        {
            let mut cache = self.cache.write();
            cache.clear();
            self.generation.fetch_add(1, Ordering::AcqRel);
        }

        self.logger.info("Secrets reloaded from environment and .env file");
        Ok(())
    }
}

impl std::fmt::Debug for EnvironmentSecretsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvironmentSecretsProvider")
            .field("dotenv_path", &self.dotenv_path)
            .field("dotenv_entries", &self.dotenv_entry_count())
            .field("cached", &self.cached_len())
            .finish()
    }
}

/// Best-effort dotenv load; never fails
fn load_dotenv(path: Option<&Path>, logger: &dyn Logger) -> HashMap<String, String> {
    let Some(path) = path else {
        return HashMap::new();
    };

    if !path.exists() {
        logger.info("No .env file found, will use environment variables only");
        return HashMap::new();
    }

    match read_dotenv(path) {
        Ok(vars) => {
            logger.info_fmt(format_args!("Loaded {} secrets from .env file", vars.len()));
            vars
        }
        Err(e) => {
            logger.warn_fmt(format_args!(
                "Failed to load .env file: {}. Will use environment variables only.",
                mask_text(&e.to_string())
            ));
            HashMap::new()
        }
    }
}

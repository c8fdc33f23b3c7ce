//! Process-wide configuration instance
//!
//! Components that cannot have a [`ConfigManager`] passed to them read the
//! shared one from here. It is never created implicitly: call [`init`] (or
//! [`init_default`]) once at startup, [`get`] afterwards, and [`reset`] to
//! drop it between tests.

use std::sync::Arc;

use once_cell::sync::Lazy;
use parking_lot::RwLock;

use crate::config::{ConfigError, ConfigManager, ConfigOptions, ConfigResult};
use crate::secrets::SecretsManager;

/// Errors from the process-wide instance
#[derive(Debug, thiserror::Error)]
pub enum GlobalError {
    #[error("Configuration has not been initialized; call global::init first")]
    NotInitialized,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type GlobalResult<T> = Result<T, GlobalError>;

static INSTANCE: Lazy<RwLock<Option<Arc<ConfigManager>>>> = Lazy::new(|| RwLock::new(None));

fn install<F>(build: F) -> GlobalResult<Arc<ConfigManager>>
where
    F: FnOnce() -> ConfigResult<ConfigManager>,
{
    let mut slot = INSTANCE.write();
    if let Some(existing) = slot.as_ref() {
        return Ok(Arc::clone(existing));
    }
    let manager = Arc::new(build()?);
    *slot = Some(Arc::clone(&manager));
    Ok(manager)
}

/// Build the shared instance
///
/// Only the first successful call builds anything; later (or concurrent)
/// callers get that same instance back and their arguments are dropped.
pub fn init(
    options: ConfigOptions,
    secrets: Arc<SecretsManager>,
) -> GlobalResult<Arc<ConfigManager>> {
    install(|| ConfigManager::new(options, secrets))
}

/// [`init`] with default options over the default secrets chain
pub fn init_default() -> GlobalResult<Arc<ConfigManager>> {
    install(ConfigManager::load_default)
}

/// The shared instance
pub fn get() -> GlobalResult<Arc<ConfigManager>> {
    try_get().ok_or(GlobalError::NotInitialized)
}

/// The shared instance, if initialized
pub fn try_get() -> Option<Arc<ConfigManager>> {
    INSTANCE.read().clone()
}

/// The shared instance, building it from `options` and `secrets` if needed
pub fn get_or_init(
    options: ConfigOptions,
    secrets: Arc<SecretsManager>,
) -> GlobalResult<Arc<ConfigManager>> {
    match try_get() {
        Some(manager) => Ok(manager),
        None => init(options, secrets),
    }
}

/// Check if the shared instance exists
pub fn is_initialized() -> bool {
    INSTANCE.read().is_some()
}

/// Drop the shared instance (mainly for testing)
///
/// Handles already returned by [`get`] stay valid.
pub fn reset() -> bool {
    INSTANCE.write().take().is_some()
}

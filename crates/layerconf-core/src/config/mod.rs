//! Layered configuration
//!
//! This module provides:
//! - `ConfigManager`, which merges defaults, a properties file, environment
//!   overrides, system properties and secrets into one key/value view
//! - `ConfigPolicy` for the defaults, env allow-list and required secrets
//! - A `.properties` parser

mod error;
mod manager;
mod policy;
mod properties;
mod store;
mod system;

pub use error::{ConfigError, ConfigResult};
pub use manager::{ConfigManager, ConfigOptions, DEFAULT_PROPERTIES_PATH};
pub use policy::{env_var_to_key, ConfigPolicy};
pub use properties::{load_properties, parse_properties};
pub use store::ConfigStore;
pub use system::SystemProperties;

//! Secret providers and the manager that chains them
//!
//! This module provides:
//! - `SecretsProvider` trait for implementing custom backends
//! - Built-in providers: `EnvironmentSecretsProvider`, `MemorySecretsProvider`
//! - `SecretsManager`, which walks an ordered provider chain
//! - A registry for creating providers by name
//! - A verbatim dotenv reader

mod traits;
mod dotenv;
mod env_provider;
mod memory_provider;
mod manager;
mod registry;

pub use traits::{SecretError, SecretResult, SecretsProvider};
pub use env_provider::{EnvironmentSecretsProvider, DEFAULT_DOTENV_PATH};
pub use memory_provider::MemorySecretsProvider;
pub use manager::{ResolvedSecret, SecretsManager, SecretsManagerBuilder};
pub use dotenv::{parse_dotenv, read_dotenv, DotenvError};
pub use registry::{
    build_chain, create_provider, has_provider, provider_names, register_provider,
    unregister_provider, ProviderContext, ProviderFactory,
};

// src/config/mod.rs

pub mod app;
pub mod environment;
pub mod loader;
pub mod validation;

pub use app::{AppConfig, Credential, ProviderConfig, ServerConfig};
pub use environment::{credentials_from_lookup, load_credentials_from_env, CREDENTIAL_ENV_VARS};
pub use loader::load_config;
pub use validation::ConfigValidator;

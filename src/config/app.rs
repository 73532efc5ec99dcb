// src/config/app.rs

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// A single OpenRouter API key together with its human-readable label.
///
/// The secret is never serialized and its `Debug` output is redacted.
#[derive(Debug, Clone)]
pub struct Credential {
    pub label: String,
    pub secret: SecretString,
}

impl Credential {
    pub fn new(label: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            secret: SecretString::new(secret.into()),
        }
    }

    /// Safe preview of the key for logs (`sk-o...cdef`).
    pub fn preview(&self) -> String {
        preview_key(self.secret.expose_secret())
    }
}

/// Counts chars, not bytes: a secret may hold non-ASCII text.
pub(crate) fn preview_key(key: &str) -> String {
    let len = key.chars().count();
    if len > 8 {
        let head: String = key.chars().take(4).collect();
        let tail: String = key.chars().skip(len - 4).collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

/// Settings for the provider's key-status endpoint and the status cache.
#[derive(Debug, Deserialize, Clone, PartialEq, Serialize)]
pub struct ProviderConfig {
    #[serde(default = "default_status_url")]
    pub status_url: String,
    /// Freshness window for cached key status.
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl_secs: u64,
    /// Out-of-band refresh period. Disabled when unset.
    #[serde(default)]
    pub refresh_interval_secs: Option<u64>,
    /// Upper bound on select/call/mark-failed rounds for one outbound call.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            status_url: default_status_url(),
            cache_ttl_secs: default_cache_ttl(),
            refresh_interval_secs: None,
            max_attempts: default_max_attempts(),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Populated from the environment only, never from the config file.
    #[serde(skip)]
    pub credentials: Vec<Credential>,
}

impl AppConfig {
    pub fn credential_labels(&self) -> Vec<&str> {
        self.credentials.iter().map(|c| c.label.as_str()).collect()
    }
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_request_timeout() -> u64 {
    30
}

fn default_status_url() -> String {
    "https://openrouter.ai/api/v1/key".to_string()
}

fn default_cache_ttl() -> u64 {
    4 * 60 * 60
}

fn default_max_attempts() -> u32 {
    3
}

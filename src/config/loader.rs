// src/config/loader.rs

use crate::config::{environment, AppConfig, ConfigValidator};
use crate::error::{AppError, Result};
use std::path::Path;
use tracing::{debug, info, warn};

/// Load configuration from file (optional) and environment variables
pub fn load_config(config_path: &Path) -> Result<AppConfig> {
    let mut config = if config_path.exists() {
        info!("Loading configuration from file: {}", config_path.display());
        load_from_file(config_path)?
    } else {
        info!("Configuration file not found, using defaults");
        AppConfig::default()
    };

    override_with_env(&mut config);
    config.credentials = environment::load_credentials_from_env();

    ConfigValidator::validate(&config)?;

    debug!(
        credentials = ?config.credential_labels(),
        "Configuration loaded and validated successfully"
    );
    Ok(config)
}

fn load_from_file(config_path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(config_path).map_err(|_| AppError::ConfigNotFound {
        path: config_path.display().to_string(),
    })?;

    if content.trim().is_empty() {
        warn!("Config file '{}' is empty. Using defaults.", config_path.display());
        return Ok(AppConfig::default());
    }

    Ok(serde_yaml::from_str(&content)?)
}

fn override_with_env(config: &mut AppConfig) {
    if let Ok(port_str) = std::env::var("PORT") {
        if let Ok(port) = port_str.parse::<u16>() {
            info!("Overriding server port from environment variable: {}", port);
            config.server.port = port;
        } else {
            warn!("Invalid PORT environment variable: {}", port_str);
        }
    }

    if let Ok(status_url) = std::env::var("OPENROUTER_STATUS_URL") {
        info!("Overriding provider status URL from environment variable");
        config.provider.status_url = status_url;
    }

    if let Ok(ttl_str) = std::env::var("KEY_SELECTOR_CACHE_TTL_SECS") {
        if let Ok(ttl) = ttl_str.parse::<u64>() {
            info!("Overriding cache TTL from environment: {}s", ttl);
            config.provider.cache_ttl_secs = ttl;
        } else {
            warn!("Invalid KEY_SELECTOR_CACHE_TTL_SECS environment variable: {}", ttl_str);
        }
    }

    if let Ok(interval_str) = std::env::var("KEY_SELECTOR_REFRESH_INTERVAL_SECS") {
        if let Ok(interval) = interval_str.parse::<u64>() {
            info!("Overriding refresh interval from environment: {}s", interval);
            config.provider.refresh_interval_secs = Some(interval);
        } else {
            warn!(
                "Invalid KEY_SELECTOR_REFRESH_INTERVAL_SECS environment variable: {}",
                interval_str
            );
        }
    }
}

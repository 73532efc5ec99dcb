// src/config/validation.rs

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use secrecy::ExposeSecret;
use std::collections::HashSet;
use tracing::{debug, warn};
use url::Url;

pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> Result<()> {
        debug!("Starting configuration validation");

        if let Err(e) = Self::validate_credentials(config) {
            warn!("Credential validation failed: {}", e);
            return Err(e);
        }
        debug!("Credential validation passed");

        if let Err(e) = Self::validate_provider_config(config) {
            warn!("Provider config validation failed: {}", e);
            return Err(e);
        }
        debug!("Provider config validation passed");

        if let Err(e) = Self::validate_server_config(config) {
            warn!("Server config validation failed: {}", e);
            return Err(e);
        }
        debug!("Server config validation passed");

        debug!("Configuration validation completed successfully");
        Ok(())
    }

    /// An empty credential list is allowed here; `select()` reports it per request.
    fn validate_credentials(config: &AppConfig) -> Result<()> {
        if config.credentials.is_empty() {
            warn!("No OpenRouter API keys configured; every key selection will fail");
            return Ok(());
        }

        let mut labels = HashSet::new();
        for credential in &config.credentials {
            if !labels.insert(credential.label.as_str()) {
                return Err(AppError::config_validation(
                    format!("Duplicate credential label: {}", credential.label),
                    Some("credentials.label"),
                ));
            }

            if credential.secret.expose_secret().trim().is_empty() {
                return Err(AppError::config_validation(
                    format!("Credential '{}' has an empty key", credential.label),
                    Some("credentials.secret"),
                ));
            }
        }

        debug!("Validated {} credentials", labels.len());
        Ok(())
    }

    fn validate_provider_config(config: &AppConfig) -> Result<()> {
        let provider = &config.provider;

        Self::validate_url(&provider.status_url, "provider.status_url")?;

        if provider.cache_ttl_secs == 0 {
            return Err(AppError::config_validation(
                "Cache TTL cannot be 0",
                Some("provider.cache_ttl_secs"),
            ));
        }

        if provider.refresh_interval_secs == Some(0) {
            return Err(AppError::config_validation(
                "Refresh interval cannot be 0 (omit it to disable background refresh)",
                Some("provider.refresh_interval_secs"),
            ));
        }

        if provider.max_attempts == 0 {
            return Err(AppError::config_validation(
                "Max attempts must be at least 1",
                Some("provider.max_attempts"),
            ));
        }

        Ok(())
    }

    fn validate_server_config(config: &AppConfig) -> Result<()> {
        if config.server.host.trim().is_empty() {
            return Err(AppError::config_validation(
                "Server host cannot be empty",
                Some("server.host"),
            ));
        }

        if config.server.port == 0 {
            return Err(AppError::config_validation(
                "Server port cannot be 0",
                Some("server.port"),
            ));
        }

        if config.server.connect_timeout_secs == 0 {
            return Err(AppError::config_validation(
                "Connect timeout cannot be 0",
                Some("server.connect_timeout_secs"),
            ));
        }

        if config.server.request_timeout_secs == 0 {
            return Err(AppError::config_validation(
                "Request timeout cannot be 0",
                Some("server.request_timeout_secs"),
            ));
        }

        Ok(())
    }

    fn validate_url(url_str: &str, field_name: &str) -> Result<()> {
        let url = Url::parse(url_str).map_err(|e| {
            AppError::config_validation(
                format!("Invalid URL in {}: {} - {}", field_name, url_str, e),
                Some(field_name),
            )
        })?;

        match url.scheme() {
            "http" | "https" => Ok(()),
            scheme => Err(AppError::config_validation(
                format!("Unsupported scheme '{}' in {}. Supported: http, https", scheme, field_name),
                Some(field_name),
            )),
        }
    }
}

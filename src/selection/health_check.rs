// src/selection/health_check.rs

use crate::config::{AppConfig, Credential};
use crate::error::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

/// Remaining-request figure assumed when the provider omits it
/// (the free tier's daily allowance).
pub const DEFAULT_RATE_LIMIT_REMAINING: u64 = 100;

/// Result of a single live status check against the provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProbeOutcome {
    Healthy {
        credits: f64,
        rate_limit_remaining: u64,
    },
    /// Zero requests remaining; the key is valid but unusable for now.
    QuotaExhausted { credits: Option<f64> },
    /// Network error, unexpected status or undecodable body.
    Failed { error: String },
}

/// Live status check for a single credential.
#[async_trait]
pub trait StatusProbe: Send + Sync {
    async fn check(&self, credential: &Credential) -> ProbeOutcome;
}

/// Queries OpenRouter's key endpoint (`GET /api/v1/key`) with the candidate
/// key as bearer token.
#[derive(Debug, Clone)]
pub struct OpenRouterProbe {
    client: Client,
    status_url: String,
}

impl OpenRouterProbe {
    pub fn new(client: Client, status_url: impl Into<String>) -> Self {
        Self {
            client,
            status_url: status_url.into(),
        }
    }

    /// Builds the probe with the shared HTTP client settings from config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(config.server.connect_timeout_secs))
            .timeout(Duration::from_secs(config.server.request_timeout_secs))
            .pool_idle_timeout(Duration::from_secs(90))
            .tcp_keepalive(Some(Duration::from_secs(60)))
            .build()?;
        Ok(Self::new(client, config.provider.status_url.clone()))
    }

    pub fn status_url(&self) -> &str {
        &self.status_url
    }
}

#[async_trait]
impl StatusProbe for OpenRouterProbe {
    async fn check(&self, credential: &Credential) -> ProbeOutcome {
        let response = match self
            .client
            .get(&self.status_url)
            .bearer_auth(credential.secret.expose_secret())
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                return ProbeOutcome::Failed {
                    error: e.to_string(),
                }
            }
        };

        let status = response.status();
        debug!(key.label = %credential.label, http.status_code = status.as_u16(), "Key status response");

        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProbeOutcome::QuotaExhausted { credits: None };
        }
        if !status.is_success() {
            return ProbeOutcome::Failed {
                error: format!("HTTP {}", status.as_u16()),
            };
        }

        match response.json::<Value>().await {
            Ok(body) => parse_key_info(&body),
            Err(e) => ProbeOutcome::Failed {
                error: format!("malformed key status response: {e}"),
            },
        }
    }
}

/// Reads `limit` and `rate_limit.remaining` from the root object or from a
/// `data` wrapper. Missing fields fall back to zero credits and
/// [`DEFAULT_RATE_LIMIT_REMAINING`].
pub fn parse_key_info(body: &Value) -> ProbeOutcome {
    let info = body.get("data").filter(|data| data.is_object()).unwrap_or(body);

    let credits = info.get("limit").and_then(Value::as_f64).unwrap_or(0.0);
    let remaining = info
        .get("rate_limit")
        .and_then(|rate_limit| rate_limit.get("remaining"))
        .and_then(Value::as_f64);

    match remaining {
        Some(remaining) if remaining <= 0.0 => ProbeOutcome::QuotaExhausted {
            credits: Some(credits),
        },
        // дробный остаток округляется вверх, а не до нуля
        Some(remaining) => ProbeOutcome::Healthy {
            credits,
            rate_limit_remaining: remaining.ceil() as u64,
        },
        None => ProbeOutcome::Healthy {
            credits,
            rate_limit_remaining: DEFAULT_RATE_LIMIT_REMAINING,
        },
    }
}

// src/storage/key_status.rs

use crate::selection::ProbeOutcome;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Last observed health of a key.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum KeyHealth {
    Available,
    /// The provider reported zero remaining quota.
    QuotaExhausted,
    /// The status endpoint could not be queried or returned garbage.
    CheckFailed,
    /// A caller reported a failed call through `mark_failed`.
    MarkedFailed,
}

/// Cached status of a single API key, keyed by its label.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct KeyStatus {
    pub label: String,
    pub health: KeyHealth,
    pub is_available: bool,
    pub last_checked: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credits: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit_remaining: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl KeyStatus {
    /// Builds the cache entry for the outcome of a live check.
    pub fn from_probe(label: impl Into<String>, outcome: &ProbeOutcome, now: DateTime<Utc>) -> Self {
        let label = label.into();
        match outcome {
            ProbeOutcome::Healthy {
                credits,
                rate_limit_remaining,
            } => Self {
                label,
                health: KeyHealth::Available,
                is_available: true,
                last_checked: now,
                credits: Some(*credits),
                rate_limit_remaining: Some(*rate_limit_remaining),
                error: None,
            },
            ProbeOutcome::QuotaExhausted { credits } => Self {
                label,
                health: KeyHealth::QuotaExhausted,
                is_available: false,
                last_checked: now,
                credits: *credits,
                rate_limit_remaining: Some(0),
                error: Some("rate limit exhausted".to_string()),
            },
            ProbeOutcome::Failed { error } => Self {
                label,
                health: KeyHealth::CheckFailed,
                is_available: false,
                last_checked: now,
                credits: None,
                rate_limit_remaining: None,
                error: Some(error.clone()),
            },
        }
    }

    /// Flags the key unavailable without waiting for the freshness window.
    pub fn mark_failed(&mut self, reason: impl Into<String>, now: DateTime<Utc>) {
        self.health = KeyHealth::MarkedFailed;
        self.is_available = false;
        self.error = Some(reason.into());
        self.last_checked = now;
    }

    /// A timestamp in the future (clock skew) counts as fresh.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match (now - self.last_checked).to_std() {
            Ok(age) => age < ttl,
            Err(_) => true,
        }
    }

    /// Known-unusable keys the selector passes over while the entry is fresh.
    pub fn should_skip(&self) -> bool {
        matches!(self.health, KeyHealth::QuotaExhausted | KeyHealth::MarkedFailed)
    }
}

use crate::config::{AppConfig, Credential};
use crate::error::{AppError, Result};
use crate::metrics;
use crate::selection::{OpenRouterProbe, ProbeOutcome, RoundRobinRotation, StatusProbe};
use crate::storage::{KeyStatus, StatusCache};
use chrono::Utc;
use secrecy::SecretString;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// How a key ended up selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionSource {
    /// Fresh cached status said the key is available.
    Cache,
    /// A live check reported remaining quota.
    Probe,
    /// The live check failed; the key is used anyway.
    Optimistic,
    /// Every candidate was known to be exhausted; first candidate returned.
    Fallback,
}

impl SelectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Probe => "probe",
            Self::Optimistic => "optimistic",
            Self::Fallback => "fallback",
        }
    }
}

/// The key handed to a caller for one outbound call.
#[derive(Debug, Clone)]
pub struct SelectedKey {
    pub label: String,
    pub credential: SecretString,
    pub source: SelectionSource,
}

/// Picks an OpenRouter key for each outbound call.
///
/// Keys are tried in round-robin order. Fresh cached status is trusted, stale
/// or missing status triggers a live check, and a failing check fails open.
pub struct KeySelector {
    credentials: Vec<Credential>,
    cache: StatusCache,
    rotation: RoundRobinRotation,
    probe: Arc<dyn StatusProbe>,
    cache_ttl: Duration,
}

impl KeySelector {
    pub fn new(
        credentials: Vec<Credential>,
        probe: Arc<dyn StatusProbe>,
        cache_ttl: Duration,
    ) -> Self {
        Self {
            credentials,
            cache: StatusCache::new(),
            rotation: RoundRobinRotation::new(),
            probe,
            cache_ttl,
        }
    }

    /// Builds a selector backed by [`OpenRouterProbe`].
    #[instrument(skip(config), name = "key_selector_init")]
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let probe = OpenRouterProbe::from_config(config)?;
        info!(
            credentials = ?config.credential_labels(),
            status_url = %probe.status_url(),
            cache_ttl_secs = config.provider.cache_ttl_secs,
            "Key selector initialized"
        );
        Ok(Self::new(
            config.credentials.clone(),
            Arc::new(probe),
            Duration::from_secs(config.provider.cache_ttl_secs),
        ))
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn cache_ttl(&self) -> Duration {
        self.cache_ttl
    }

    /// Configured credentials rotated round-robin. Advances the rotation
    /// cursor on every call, including when nothing is configured.
    pub fn enumerate(&self) -> Vec<Credential> {
        let rotated = self.rotation.rotate(&self.credentials);
        if rotated.is_empty() {
            error!("No OpenRouter API keys configured");
            return rotated;
        }

        debug!(
            rotation.cursor = self.rotation.position(),
            selected = %rotated[0].label,
            fallbacks = ?rotated[1..].iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
            "Round-robin rotation"
        );
        rotated
    }

    /// Selects a key for the next outbound call.
    ///
    /// Fails only when no credentials are configured. When every candidate
    /// is known to be exhausted, the first rotated candidate is returned.
    #[instrument(level = "debug", skip(self))]
    pub async fn select(&self) -> Result<SelectedKey> {
        let candidates = self.enumerate();
        let Some(fallback) = candidates.first().cloned() else {
            return Err(AppError::NoCredentialsConfigured);
        };

        for candidate in &candidates {
            let now = Utc::now();

            if let Some(cached) = self.cache.get(&candidate.label) {
                if cached.is_fresh(now, self.cache_ttl) {
                    if cached.should_skip() {
                        debug!(
                            key.label = %candidate.label,
                            reason = cached.error.as_deref().unwrap_or("unavailable"),
                            "Skipping key with fresh unavailable status"
                        );
                        continue;
                    }
                    if cached.is_available {
                        return Ok(self.selected(candidate, SelectionSource::Cache));
                    }
                }
            }

            match self.check_and_record(candidate).await {
                ProbeOutcome::Healthy {
                    rate_limit_remaining,
                    ..
                } => {
                    info!(
                        key.label = %candidate.label,
                        rate_limit_remaining,
                        "Selected key after live check"
                    );
                    return Ok(self.selected(candidate, SelectionSource::Probe));
                }
                ProbeOutcome::QuotaExhausted { .. } => {
                    warn!(key.label = %candidate.label, "Key rate limited, trying next key");
                    continue;
                }
                ProbeOutcome::Failed { .. } => {
                    info!(key.label = %candidate.label, "Using key despite failed status check");
                    return Ok(self.selected(candidate, SelectionSource::Optimistic));
                }
            }
        }

        warn!(key.label = %fallback.label, "All keys exhausted, using fallback key");
        Ok(self.selected(&fallback, SelectionSource::Fallback))
    }

    /// Marks a key unavailable right away. Labels with no status entry are
    /// ignored.
    #[instrument(level = "debug", skip(self, reason))]
    pub fn mark_failed(&self, label: &str, reason: &str) {
        if self.cache.mark_failed(label, reason, Utc::now()) {
            metrics::record_marked_failed(label);
            warn!(key.label = %label, reason = %reason, "Marked key as failed");
        } else {
            debug!(key.label = %label, "mark_failed ignored for key without status");
        }
    }

    /// Read-only copy of every status entry, keyed by label.
    pub fn status(&self) -> BTreeMap<String, KeyStatus> {
        self.cache.snapshot()
    }

    /// Live-checks every configured key in configured order, regardless of
    /// cached state. One failed check does not stop the others.
    #[instrument(skip(self))]
    pub async fn refresh_all(&self) -> BTreeMap<String, KeyStatus> {
        for credential in &self.credentials {
            self.check_and_record(credential).await;
        }
        let snapshot = self.status();
        info!(keys = snapshot.len(), "Refreshed all key statuses");
        snapshot
    }

    /// True when no key has been checked yet or any entry is older than the
    /// freshness window.
    pub fn is_stale(&self) -> bool {
        self.cache.is_stale(Utc::now(), self.cache_ttl)
    }

    async fn check_and_record(&self, credential: &Credential) -> ProbeOutcome {
        debug!(
            key.label = %credential.label,
            api_key.preview = %credential.preview(),
            "Checking key status"
        );
        let outcome = self.probe.check(credential).await;

        let outcome_name = match &outcome {
            ProbeOutcome::Healthy { .. } => "healthy",
            ProbeOutcome::QuotaExhausted { .. } => "quota_exhausted",
            ProbeOutcome::Failed { error } => {
                let err = AppError::ProviderCheck {
                    label: credential.label.clone(),
                    message: error.clone(),
                };
                warn!(key.label = %credential.label, error = %err, "Key status check failed");
                "failed"
            }
        };
        metrics::record_probe(&credential.label, outcome_name);

        self.cache
            .record(KeyStatus::from_probe(&credential.label, &outcome, Utc::now()));
        outcome
    }

    fn selected(&self, credential: &Credential, source: SelectionSource) -> SelectedKey {
        metrics::record_selection(&credential.label, source.as_str());
        debug!(
            key.label = %credential.label,
            api_key.preview = %credential.preview(),
            source = source.as_str(),
            "API key selected for request"
        );
        SelectedKey {
            label: credential.label.clone(),
            credential: credential.secret.clone(),
            source,
        }
    }
}

impl std::fmt::Debug for KeySelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeySelector")
            .field(
                "credentials",
                &self.credentials.iter().map(|c| c.label.as_str()).collect::<Vec<_>>(),
            )
            .field("cache", &self.cache)
            .field("rotation", &self.rotation)
            .field("cache_ttl", &self.cache_ttl)
            .finish_non_exhaustive()
    }
}

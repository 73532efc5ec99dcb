// src/storage/memory.rs

use crate::storage::KeyStatus;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tracing::trace;

/// Process-wide status cache, one entry per label.
///
/// Entries are created by the first live check, overwritten by later checks
/// and never removed. Nothing here is persisted. Guards are never held
/// across an await point.
#[derive(Debug, Default)]
pub struct StatusCache {
    entries: RwLock<HashMap<String, KeyStatus>>,
}

impl StatusCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, label: &str) -> Option<KeyStatus> {
        self.entries.read().get(label).cloned()
    }

    /// Inserts or replaces the entry for `status.label`.
    pub fn record(&self, status: KeyStatus) {
        trace!(key.label = %status.label, health = ?status.health, "Recording key status");
        self.entries.write().insert(status.label.clone(), status);
    }

    /// Returns `false` when no entry exists for `label`; nothing is created.
    pub fn mark_failed(&self, label: &str, reason: &str, now: DateTime<Utc>) -> bool {
        let mut entries = self.entries.write();
        match entries.get_mut(label) {
            Some(status) => {
                status.mark_failed(reason, now);
                true
            }
            None => false,
        }
    }

    pub fn snapshot(&self) -> BTreeMap<String, KeyStatus> {
        self.entries
            .read()
            .iter()
            .map(|(label, status)| (label.clone(), status.clone()))
            .collect()
    }

    /// True when nothing has been checked yet or any entry is past `ttl`.
    pub fn is_stale(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        let entries = self.entries.read();
        entries.is_empty() || entries.values().any(|status| !status.is_fresh(now, ttl))
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::ProbeOutcome;
    use crate::storage::KeyHealth;

    fn healthy(label: &str, at: DateTime<Utc>) -> KeyStatus {
        let outcome = ProbeOutcome::Healthy {
            credits: 0.0,
            rate_limit_remaining: 50,
        };
        KeyStatus::from_probe(label, &outcome, at)
    }

    #[test]
    fn test_record_replaces_single_entry() {
        let cache = StatusCache::new();
        let now = Utc::now();
        cache.record(healthy("openrouter-one", now));
        cache.record(KeyStatus::from_probe(
            "openrouter-one",
            &ProbeOutcome::QuotaExhausted { credits: None },
            now,
        ));

        assert_eq!(cache.len(), 1);
        assert_eq!(
            cache.get("openrouter-one").map(|s| s.health),
            Some(KeyHealth::QuotaExhausted)
        );
    }

    #[test]
    fn test_mark_failed_unknown_label_is_noop() {
        let cache = StatusCache::new();
        assert!(!cache.mark_failed("never-seen", "boom", Utc::now()));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_mark_failed_existing_label() {
        let cache = StatusCache::new();
        cache.record(healthy("openrouter-default", Utc::now()));
        assert!(cache.mark_failed("openrouter-default", "boom", Utc::now()));

        let status = cache.get("openrouter-default").unwrap();
        assert_eq!(status.health, KeyHealth::MarkedFailed);
        assert_eq!(status.error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_staleness() {
        let cache = StatusCache::new();
        let ttl = Duration::from_secs(60);
        let now = Utc::now();
        assert!(cache.is_stale(now, ttl));

        cache.record(healthy("a", now));
        assert!(!cache.is_stale(now, ttl));

        cache.record(healthy("b", now - chrono::Duration::minutes(2)));
        assert!(cache.is_stale(now, ttl));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let cache = StatusCache::new();
        cache.record(healthy("a", Utc::now()));
        let snapshot = cache.snapshot();
        cache.mark_failed("a", "later", Utc::now());

        assert_eq!(snapshot["a"].health, KeyHealth::Available);
    }
}

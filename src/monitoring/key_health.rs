// src/monitoring/key_health.rs

use crate::key_manager::KeySelector;
use crate::storage::{KeyHealth, KeyStatus};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

/// Сводка состояния ключей для health-эндпоинта
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyHealthSummary {
    pub configured: usize,
    pub checked: usize,
    pub available: usize,
    pub quota_exhausted: usize,
    pub check_failed: usize,
    pub marked_failed: usize,
    pub stale: bool,
}

impl KeyHealthSummary {
    pub fn from_selector(selector: &KeySelector) -> Self {
        Self::from_statuses(
            selector.credentials().len(),
            &selector.status(),
            selector.is_stale(),
        )
    }

    pub fn from_statuses(
        configured: usize,
        statuses: &BTreeMap<String, KeyStatus>,
        stale: bool,
    ) -> Self {
        let mut summary = Self {
            configured,
            checked: statuses.len(),
            stale,
            ..Self::default()
        };
        for status in statuses.values() {
            match status.health {
                KeyHealth::Available => summary.available += 1,
                KeyHealth::QuotaExhausted => summary.quota_exhausted += 1,
                KeyHealth::CheckFailed => summary.check_failed += 1,
                KeyHealth::MarkedFailed => summary.marked_failed += 1,
            }
        }
        summary
    }
}

/// Запускает фоновое обновление статусов ключей.
///
/// The first tick fires immediately and is skipped; afterwards every tick
/// runs `refresh_all` when the cache is stale.
pub fn spawn_refresh_task(selector: Arc<KeySelector>, every: Duration) -> JoinHandle<()> {
    info!(interval_secs = every.as_secs(), "Key status refresh task started");

    tokio::spawn(async move {
        let mut ticker = interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        ticker.tick().await;

        loop {
            ticker.tick().await;
            refresh_if_stale(&selector).await;
        }
    })
}

/// Runs one refresh cycle. Returns whether a refresh happened.
pub async fn refresh_if_stale(selector: &KeySelector) -> bool {
    if !selector.is_stale() {
        debug!("Key status cache is fresh, skipping refresh");
        return false;
    }

    let statuses = selector.refresh_all().await;
    let summary = KeyHealthSummary::from_statuses(selector.credentials().len(), &statuses, false);

    if summary.available < summary.configured {
        warn!(
            configured = summary.configured,
            available = summary.available,
            quota_exhausted = summary.quota_exhausted,
            check_failed = summary.check_failed,
            "Key status refresh completed with unavailable keys"
        );
    } else {
        debug!(configured = summary.configured, "All keys are available");
    }
    true
}

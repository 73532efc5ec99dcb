//! Common test utilities and fixtures

#![allow(dead_code)]

use async_trait::async_trait;
use openrouter_key_selector::{
    config::{AppConfig, Credential},
    selection::{ProbeOutcome, StatusProbe},
    AppState, KeySelector,
};
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const FOUR_HOURS: Duration = Duration::from_secs(4 * 60 * 60);

pub fn healthy(remaining: u64) -> ProbeOutcome {
    ProbeOutcome::Healthy {
        credits: 10.0,
        rate_limit_remaining: remaining,
    }
}

pub fn exhausted() -> ProbeOutcome {
    ProbeOutcome::QuotaExhausted { credits: None }
}

pub fn failed(error: &str) -> ProbeOutcome {
    ProbeOutcome::Failed {
        error: error.to_string(),
    }
}

/// Credentials `label -> sk-or-<label>-0123456789` in the given order.
pub fn credentials(labels: &[&str]) -> Vec<Credential> {
    labels
        .iter()
        .map(|label| Credential::new(*label, format!("sk-or-{label}-0123456789")))
        .collect()
}

/// Scripted probe: each label answers with queued outcomes, then repeats
/// its default (healthy when none was set). Every call is recorded.
#[derive(Default)]
pub struct MockProbe {
    scripted: Mutex<HashMap<String, VecDeque<ProbeOutcome>>>,
    defaults: Mutex<HashMap<String, ProbeOutcome>>,
    calls: Mutex<Vec<String>>,
    call_count: AtomicUsize,
}

impl MockProbe {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Answers every check of `label` with `outcome`.
    pub fn always(self: &Arc<Self>, label: &str, outcome: ProbeOutcome) -> Arc<Self> {
        self.defaults.lock().insert(label.to_string(), outcome);
        self.clone()
    }

    /// Queues a one-shot answer for `label`.
    pub fn then(self: &Arc<Self>, label: &str, outcome: ProbeOutcome) -> Arc<Self> {
        self.scripted
            .lock()
            .entry(label.to_string())
            .or_default()
            .push_back(outcome);
        self.clone()
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    pub fn calls_for(&self, label: &str) -> usize {
        self.calls.lock().iter().filter(|l| *l == label).count()
    }
}

#[async_trait]
impl StatusProbe for MockProbe {
    async fn check(&self, credential: &Credential) -> ProbeOutcome {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().push(credential.label.clone());

        if let Some(outcome) = self
            .scripted
            .lock()
            .get_mut(&credential.label)
            .and_then(VecDeque::pop_front)
        {
            return outcome;
        }
        self.defaults
            .lock()
            .get(&credential.label)
            .cloned()
            .unwrap_or_else(|| healthy(100))
    }
}

pub fn selector(labels: &[&str], probe: Arc<MockProbe>, ttl: Duration) -> Arc<KeySelector> {
    Arc::new(KeySelector::new(credentials(labels), probe, ttl))
}

/// Application state around a selector driven by `probe`.
pub fn app_state(labels: &[&str], probe: Arc<MockProbe>) -> Arc<AppState> {
    let mut config = AppConfig::default();
    config.credentials = credentials(labels);
    let selector = Arc::new(KeySelector::new(config.credentials.clone(), probe, FOUR_HOURS));
    Arc::new(AppState::with_selector(config, selector))
}

// src/metrics.rs
//
// Counters for key selection. Every `record_*` call is a no-op when the
// `metrics` feature is disabled or no recorder has been installed.

use axum::{http::StatusCode, response::IntoResponse};

#[cfg(feature = "metrics")]
use metrics::counter;
#[cfg(feature = "metrics")]
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
#[cfg(feature = "metrics")]
use once_cell::sync::OnceCell;

#[cfg(feature = "metrics")]
static PROMETHEUS: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the global Prometheus recorder. Safe to call more than once.
#[cfg(feature = "metrics")]
pub fn initialize_metrics() -> crate::Result<()> {
    PROMETHEUS
        .get_or_try_init(|| PrometheusBuilder::new().install_recorder())
        .map_err(|e| crate::AppError::internal(format!("failed to install Prometheus recorder: {e}")))?;
    Ok(())
}

#[cfg(not(feature = "metrics"))]
pub fn initialize_metrics() -> crate::Result<()> {
    Ok(())
}

#[cfg(feature = "metrics")]
fn render() -> Option<String> {
    PROMETHEUS.get().map(PrometheusHandle::render)
}

#[cfg(not(feature = "metrics"))]
fn render() -> Option<String> {
    None
}

/// `source` is one of `cache`, `probe`, `optimistic`, `fallback`.
pub fn record_selection(label: &str, source: &'static str) {
    #[cfg(feature = "metrics")]
    counter!("key_selector_selections_total", "label" => label.to_string(), "source" => source)
        .increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (label, source);
}

/// `outcome` is one of `healthy`, `quota_exhausted`, `failed`.
pub fn record_probe(label: &str, outcome: &'static str) {
    #[cfg(feature = "metrics")]
    counter!("key_selector_probes_total", "label" => label.to_string(), "outcome" => outcome)
        .increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = (label, outcome);
}

pub fn record_marked_failed(label: &str) {
    #[cfg(feature = "metrics")]
    counter!("key_selector_marked_failed_total", "label" => label.to_string()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = label;
}

/// Prometheus text exposition of all recorded counters.
pub async fn metrics_handler() -> impl IntoResponse {
    match render() {
        Some(body) => (StatusCode::OK, body),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed\n".to_string(),
        ),
    }
}

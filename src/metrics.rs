//! Prometheus counters for predictions and remote-advisor health.
//!
//! Recording is a no-op until [`Metrics::global`] has installed the recorder.

use std::sync::OnceLock;

use axum::{routing::get, Router};
use metrics::{counter, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tracing::warn;

use crate::model::Source;

static METRICS: OnceLock<Option<Metrics>> = OnceLock::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the process-wide recorder on first use. `None` if another recorder
    /// was installed first.
    pub fn global() -> Option<&'static Metrics> {
        METRICS
            .get_or_init(|| match PrometheusBuilder::new().install_recorder() {
                Ok(handle) => Some(Metrics { handle }),
                Err(e) => {
                    warn!(error = %e, "prometheus recorder not installed");
                    None
                }
            })
            .as_ref()
    }

    /// Returns a router exposing `/metrics` with the Prometheus exposition format.
    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

pub fn source_label(source: Source) -> &'static str {
    match source {
        Source::FormulaBasic => "formula_basic",
        Source::FormulaEnhanced => "formula_enhanced",
        Source::RemoteModel => "remote_model",
    }
}

pub fn record_prediction(source: Source) {
    counter!("oracle_predictions_total", "source" => source_label(source)).increment(1);
}

pub fn record_fallback(kind: &'static str) {
    counter!("oracle_remote_fallback_total", "kind" => kind).increment(1);
}

pub fn record_remote_latency(ms: f64) {
    histogram!("oracle_remote_call_duration_ms").record(ms);
}

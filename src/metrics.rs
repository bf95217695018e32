use anyhow::{Context, Result};
use axum::{routing::get, Router};
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

pub const REQUESTS_TOTAL: &str = "climate_requests_total";
pub const CORPUS_TEXTS: &str = "climate_corpus_texts";
pub const COMPUTE_DURATION_MS: &str = "climate_compute_duration_ms";
pub const OFFLOADED_TOTAL: &str = "climate_offloaded_total";

// A process can only own one global recorder.
static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

#[derive(Clone)]
pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder once per process and describe the series.
    pub fn init() -> Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| {
                let handle = PrometheusBuilder::new()
                    .install_recorder()
                    .context("prometheus: install recorder")?;
                describe_counter!(REQUESTS_TOTAL, "Requests served, by endpoint");
                describe_histogram!(CORPUS_TEXTS, "Texts per analyzed corpus");
                describe_histogram!(COMPUTE_DURATION_MS, "Analysis compute time in ms");
                describe_counter!(OFFLOADED_TOTAL, "Requests moved to the blocking pool");
                Ok::<_, anyhow::Error>(handle)
            })?
            .clone();
        Ok(Self { handle })
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

pub fn record_request(endpoint: &'static str) {
    counter!(REQUESTS_TOTAL, "endpoint" => endpoint).increment(1);
}

pub fn observe_corpus(texts: usize, elapsed_ms: f64) {
    histogram!(CORPUS_TEXTS).record(texts as f64);
    histogram!(COMPUTE_DURATION_MS).record(elapsed_ms);
}

pub fn record_offload() {
    counter!(OFFLOADED_TOTAL).increment(1);
}

use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder (once per process) and publish tagger availability.
    pub fn init(tagger_loaded: bool) -> anyhow::Result<Self> {
        let handle = HANDLE
            .get_or_try_init(|| PrometheusBuilder::new().install_recorder())?
            .clone();

        gauge!("dam_tagger_loaded").set(if tagger_loaded { 1.0 } else { 0.0 });

        Ok(Self { handle })
    }

    /// Prometheus exposition text.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

pub fn record_request(endpoint: &'static str, outcome: &'static str) {
    counter!("dam_requests_total", "endpoint" => endpoint, "outcome" => outcome).increment(1);
}

pub fn record_latency(endpoint: &'static str, ms: f64) {
    histogram!("dam_analysis_duration_ms", "endpoint" => endpoint).record(ms);
}

pub fn record_degraded(endpoint: &'static str) {
    counter!("dam_oracle_degraded_total", "endpoint" => endpoint).increment(1);
}

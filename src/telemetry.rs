use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use tracing_subscriber::EnvFilter;

pub const PREDICTIONS_TOTAL: &str = "predictions_total";
pub const PREDICTION_LATENCY: &str = "prediction_latency_seconds";
pub const EXTRACTIONS_TOTAL: &str = "extractions_total";

/// `RUST_LOG` wins; defaults to `info`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

pub fn install_metrics() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    describe_counter!(PREDICTIONS_TOTAL, "Prediction requests by outcome");
    describe_histogram!(PREDICTION_LATENCY, "Time spent serving a prediction");
    describe_counter!(EXTRACTIONS_TOTAL, "Text extraction requests by outcome");
    Ok(handle)
}

/// `success`, `rejected` (client error) or `error`.
pub fn outcome<T>(result: &Result<T, crate::ServiceError>) -> &'static str {
    match result {
        Ok(_) => "success",
        Err(e) if e.is_client_error() => "rejected",
        Err(_) => "error",
    }
}

pub fn record_prediction(outcome: &'static str, seconds: f64) {
    counter!(PREDICTIONS_TOTAL, "outcome" => outcome).increment(1);
    histogram!(PREDICTION_LATENCY).record(seconds);
}

pub fn record_extraction(outcome: &'static str) {
    counter!(EXTRACTIONS_TOTAL, "outcome" => outcome).increment(1);
}

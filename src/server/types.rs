use crate::config::ExtractionConfig;
use crate::inference::PredictionResult;
use crate::model::store::ArtifactStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

pub const PREDICTION_MESSAGE: &str = "Prediction successful";

/// Shared Application State
#[derive(Clone)]
pub struct AppState {
    pub store: ArtifactStore,
    pub extraction: ExtractionConfig,
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    pub fn new(store: ArtifactStore, extraction: ExtractionConfig) -> Self {
        Self {
            store,
            extraction,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }
}

// --- DTOs (Data Transfer Objects) ---

#[derive(Serialize, Debug)]
pub struct PredictResponse {
    pub prediction: f64,
    pub message: &'static str,
}

impl From<PredictionResult> for PredictResponse {
    fn from(result: PredictionResult) -> Self {
        Self {
            prediction: result.value,
            message: PREDICTION_MESSAGE,
        }
    }
}

#[derive(Serialize, Debug)]
pub struct ExtractResponse {
    pub text: String,
}

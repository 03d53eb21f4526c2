use crate::error::ServiceError;
use crate::model::pipeline::Pipeline;
use crate::model::store::ArtifactStore;
use crate::preprocessing::encoding::{encode_record, EncodedRecord};
use crate::preprocessing::schema::{into_object, validate};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Rounded to two decimals.
    pub value: f64,
    pub success: bool,
}

/// Rounds half away from zero at the second decimal.
pub fn round_prediction(value: f64) -> f64 {
    let scaled = value * 100.0;
    // near f64::MAX the scaling overflows; such values carry no fraction anyway
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}

pub fn run_inference(
    pipeline: &dyn Pipeline,
    record: &EncodedRecord,
) -> Result<PredictionResult, ServiceError> {
    let raw = pipeline.predict(record)?;
    if !raw.is_finite() {
        return Err(ServiceError::Inference(format!(
            "pipeline returned a non-finite prediction: {}",
            raw
        )));
    }

    Ok(PredictionResult {
        value: round_prediction(raw),
        success: true,
    })
}

/// Full request pipeline: body check, schema validation, label encoding,
/// then inference.
pub fn predict(store: &ArtifactStore, body: Value) -> Result<PredictionResult, ServiceError> {
    let raw = into_object(body)?;
    let record = validate(raw, store.encoders())?;
    let encoded = encode_record(&record, store.encoders())?;
    run_inference(store.pipeline(), &encoded)
}

use crate::error::ServiceError;
use crate::preprocessing::encoding::EncodedRecord;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// A fitted prediction pipeline. Implementations are read-only after load
/// and shared by every request.
pub trait Pipeline: Send + Sync {
    /// Raw (unrounded) prediction for a single encoded row.
    fn predict(&self, record: &EncodedRecord) -> Result<f64, ServiceError>;
}

/// Linear regression artifact stored as JSON:
/// `{"intercept": 1.0, "coefficients": {"Age": 2.5, ...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearPipeline {
    intercept: f64,
    coefficients: BTreeMap<String, f64>,
}

impl LinearPipeline {
    pub fn new(intercept: f64, coefficients: impl IntoIterator<Item = (String, f64)>) -> Self {
        Self {
            intercept,
            coefficients: coefficients.into_iter().collect(),
        }
    }

    pub fn from_json(content: &str) -> Result<Self, ServiceError> {
        serde_json::from_str(content)
            .map_err(|e| ServiceError::InvalidArtifact(format!("linear pipeline: {}", e)))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ServiceError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ServiceError::ArtifactNotFound(path.display().to_string()));
        }
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}

impl Pipeline for LinearPipeline {
    fn predict(&self, record: &EncodedRecord) -> Result<f64, ServiceError> {
        let unseen: Vec<&str> = record
            .columns()
            .filter(|c| !self.coefficients.contains_key(*c))
            .collect();
        if !unseen.is_empty() {
            return Err(ServiceError::Inference(format!(
                "The feature names should match those that were passed during fit. Unseen: {:?}",
                unseen
            )));
        }

        let mut total = self.intercept;
        for (column, weight) in &self.coefficients {
            let feature = record.get(column).ok_or_else(|| {
                ServiceError::Inference(format!("columns are missing: {{'{}'}}", column))
            })?;
            total += weight * feature.as_f64();
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::encoding::Feature;

    fn record(values: &[(&str, Feature)]) -> EncodedRecord {
        EncodedRecord::new(
            values
                .iter()
                .map(|(name, feature)| (name.to_string(), feature.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_linear_prediction() {
        let pipeline = LinearPipeline::new(
            1000.0,
            vec![("Age".to_string(), 10.0), ("Gender".to_string(), 500.0)],
        );
        let row = record(&[("Age", Feature::Number(30.0)), ("Gender", Feature::Code(1))]);

        assert_eq!(pipeline.predict(&row).unwrap(), 1000.0 + 300.0 + 500.0);
    }

    #[test]
    fn test_missing_feature_is_inference_error() {
        let pipeline = LinearPipeline::new(0.0, vec![("Age".to_string(), 1.0)]);
        let row = record(&[]);

        match pipeline.predict(&row) {
            Err(ServiceError::Inference(msg)) => assert!(msg.contains("Age")),
            other => panic!("Expected Inference error, got {:?}", other),
        }
    }

    #[test]
    fn test_unseen_feature_is_inference_error() {
        let pipeline = LinearPipeline::new(0.0, vec![("Age".to_string(), 1.0)]);
        let row = record(&[("Age", Feature::Number(1.0)), ("Country", Feature::Code(0))]);

        match pipeline.predict(&row) {
            Err(ServiceError::Inference(msg)) => assert!(msg.contains("Country")),
            other => panic!("Expected Inference error, got {:?}", other),
        }
    }

    #[test]
    fn test_from_json() {
        let pipeline =
            LinearPipeline::from_json(r#"{"intercept": 2.0, "coefficients": {"Age": 3.0}}"#)
                .unwrap();
        let row = record(&[("Age", Feature::Number(4.0))]);
        assert_eq!(pipeline.predict(&row).unwrap(), 14.0);

        assert!(LinearPipeline::from_json(r#"{"coefficients": {}}"#).is_err());
    }
}

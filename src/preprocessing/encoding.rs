use crate::error::ServiceError;
use crate::model::encoder::EncoderTable;
use crate::preprocessing::schema::{PredictionRecord, REQUIRED_FIELDS};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum Feature {
    /// Training-time label code of a categorical value.
    Code(u32),
    Number(f64),
}

impl Feature {
    pub fn as_f64(&self) -> f64 {
        match self {
            Feature::Code(code) => f64::from(*code),
            Feature::Number(value) => *value,
        }
    }

    /// `None` unless the value is a whole number that fits in an `i64`.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Feature::Code(code) => Some(i64::from(*code)),
            Feature::Number(value) => {
                // 2^63 is exactly representable; i64::MAX is not
                let in_range = *value >= -9_223_372_036_854_775_808.0
                    && *value < 9_223_372_036_854_775_808.0;
                (value.fract() == 0.0 && in_range).then_some(*value as i64)
            }
        }
    }
}

/// One fully numeric row, ready for the pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    features: Vec<(String, Feature)>,
}

impl EncodedRecord {
    pub fn new(features: Vec<(String, Feature)>) -> Self {
        Self { features }
    }

    pub fn get(&self, column: &str) -> Option<&Feature> {
        self.features
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, feature)| feature)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Replaces every encoder column with its label code, then coerces the
/// remaining required fields to numbers.
pub fn encode_record(
    record: &PredictionRecord,
    encoders: &EncoderTable,
) -> Result<EncodedRecord, ServiceError> {
    let mut features = Vec::with_capacity(REQUIRED_FIELDS.len() + encoders.len());

    for (column, encoder) in encoders.iter() {
        let code = record
            .get(column)
            .and_then(Value::as_str)
            .and_then(|value| encoder.encode(value))
            .ok_or_else(|| ServiceError::UnknownCategory {
                column: column.to_string(),
                classes: encoder.classes().to_vec(),
            })?;
        features.push((column.to_string(), Feature::Code(code)));
    }

    for field in REQUIRED_FIELDS.iter().filter(|f| !encoders.contains(f)) {
        let value = record
            .get(field)
            .and_then(coerce_number)
            .ok_or_else(|| ServiceError::InvalidNumber {
                column: field.to_string(),
            })?;
        features.push((field.to_string(), Feature::Number(value)));
    }

    Ok(EncodedRecord::new(features))
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

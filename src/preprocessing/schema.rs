use crate::error::ServiceError;
use crate::model::encoder::EncoderTable;
use serde_json::{Map, Value};

/// Fields every prediction request must carry.
pub const REQUIRED_FIELDS: [&str; 5] = [
    "Age",
    "Gender",
    "Education Level",
    "Job Title",
    "Years of Experience",
];

/// A request body that passed schema validation. Only [`validate`] builds
/// one, so the encoding stage never sees unchecked input.
#[derive(Debug, Clone)]
pub struct PredictionRecord {
    values: Map<String, Value>,
}

impl PredictionRecord {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values.get(field)
    }
}

/// Accepts only a JSON object as the request body.
pub fn into_object(body: Value) -> Result<Map<String, Value>, ServiceError> {
    match body {
        Value::Object(map) => Ok(map),
        other => Err(ServiceError::InvalidBody(format!(
            "expected a JSON object, got {}",
            json_kind(&other)
        ))),
    }
}

/// Checks required fields first, then that every encoded column is present
/// (in encoder table order). Extra keys are kept and ignored downstream.
pub fn validate(
    raw: Map<String, Value>,
    encoders: &EncoderTable,
) -> Result<PredictionRecord, ServiceError> {
    let missing: Vec<String> = REQUIRED_FIELDS
        .iter()
        .filter(|field| !raw.contains_key(**field))
        .map(|field| field.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(ServiceError::MissingFields(missing));
    }

    if let Some(column) = encoders.columns().find(|column| !raw.contains_key(*column)) {
        return Err(ServiceError::MissingColumn(column.to_string()));
    }

    Ok(PredictionRecord { values: raw })
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

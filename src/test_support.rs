use crate::config::ExtractionConfig;
use crate::model::encoder::{CategoryEncoder, EncoderTable};
use crate::model::pipeline::LinearPipeline;
use crate::model::store::ArtifactStore;
use crate::server::types::AppState;
use serde_json::{json, Value};
use std::path::Path;
use std::sync::Arc;

fn encoder(classes: &[&str]) -> CategoryEncoder {
    CategoryEncoder::new(classes.iter().map(|c| c.to_string()).collect()).unwrap()
}

pub(crate) fn encoder_table() -> EncoderTable {
    EncoderTable::new(vec![
        ("Gender".to_string(), encoder(&["Female", "Male", "Other"])),
        (
            "Education Level".to_string(),
            encoder(&["Bachelor's", "High School", "Master's", "PhD"]),
        ),
        (
            "Job Title".to_string(),
            encoder(&["Data Analyst", "Data Scientist", "Software Engineer"]),
        ),
    ])
}

/// Intercept -5000; with `valid_body` this predicts 45900.375.
pub(crate) fn salary_pipeline() -> LinearPipeline {
    LinearPipeline::new(
        -5000.0,
        vec![
            ("Age".to_string(), 1200.0),
            ("Gender".to_string(), 800.0),
            ("Education Level".to_string(), 9000.0),
            ("Job Title".to_string(), 1500.0),
            ("Years of Experience".to_string(), 4100.125),
        ],
    )
}

pub(crate) fn test_store() -> ArtifactStore {
    ArtifactStore::new(Arc::new(salary_pipeline()), encoder_table())
}

pub(crate) fn test_state(staging_dir: &Path) -> AppState {
    AppState::new(
        test_store(),
        ExtractionConfig {
            staging_dir: staging_dir.to_path_buf(),
            max_upload_bytes: 1024 * 1024,
        },
    )
}

pub(crate) fn valid_body() -> Value {
    json!({
        "Age": 29,
        "Gender": "Male",
        "Education Level": "Bachelor's",
        "Job Title": "Software Engineer",
        "Years of Experience": 3
    })
}

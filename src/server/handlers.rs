use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::JsonRejection,
        State,
    },
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;

use crate::error::ServiceError;
use crate::server::types::*;
use crate::{extraction, inference, telemetry};

pub async fn health_check() -> &'static str {
    "OK"
}

pub async fn metrics_report(State(state): State<Arc<AppState>>) -> String {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .unwrap_or_default()
}

pub async fn predict(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<PredictResponse>, ServiceError> {
    let start = Instant::now();

    let result = payload
        .map_err(|e| ServiceError::InvalidBody(e.body_text()))
        .and_then(|Json(body)| {
            tracing::debug!(payload = %body, "incoming prediction request");
            inference::predict(&state.store, body)
        });

    telemetry::record_prediction(
        telemetry::outcome(&result),
        start.elapsed().as_secs_f64(),
    );

    let prediction = result?;
    tracing::info!(prediction = prediction.value, "prediction served");
    Ok(Json(PredictResponse::from(prediction)))
}

pub async fn extract_text(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<ExtractResponse>, ServiceError> {
    let result = extract_upload(&state, multipart).await;
    telemetry::record_extraction(telemetry::outcome(&result));

    let text = result?;
    Ok(Json(ExtractResponse { text }))
}

async fn extract_upload(
    state: &AppState,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<String, ServiceError> {
    // A body that is not multipart carries no file at all
    let mut multipart = multipart.map_err(|_| ServiceError::NoFileUploaded)?;

    // 1. Find the upload field
    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServiceError::InvalidUpload(e.body_text()))?
    {
        if field.name() != Some(extraction::UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or_default().to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServiceError::InvalidUpload(e.body_text()))?;
        upload = Some((file_name, bytes));
        break;
    }
    let (file_name, bytes) = upload.ok_or(ServiceError::NoFileUploaded)?;

    // 2. Validate
    extraction::check_pdf_filename(&file_name)?;

    // 3. Stage & extract
    tracing::debug!(file = %file_name, bytes = bytes.len(), "extracting upload");
    extraction::extract_upload(state.extraction.staging_dir.clone(), bytes.to_vec()).await
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use ndarray::ShapeError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Missing one or more required fields")]
    MissingFields(Vec<String>),

    #[error("Missing required column: {0}")]
    MissingColumn(String),

    #[error("Invalid value for {column}. Must be one of {}", format_classes(.classes))]
    UnknownCategory {
        column: String,
        classes: Vec<String>,
    },

    #[error("Invalid value for {column}. Must be a number")]
    InvalidNumber { column: String },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("Only PDF files are supported")]
    UnsupportedFile,

    #[error("Invalid upload: {0}")]
    InvalidUpload(String),

    #[error("Artifact not found at path: {0}")]
    ArtifactNotFound(String),

    #[error("Invalid artifact: {0}")]
    InvalidArtifact(String),

    #[error("{0}")]
    Inference(String),

    #[error("{0}")]
    Internal(String),

    #[error("ONNX Runtime error: {0}")]
    OrtError(#[from] ort::Error),

    #[error("Shape error: {0}")]
    ShapeError(#[from] ShapeError),

    #[error("{0}")]
    Pdf(#[from] lopdf::Error),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

impl ServiceError {
    /// Client-caused failures; everything else is a server fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::MissingFields(_)
                | ServiceError::MissingColumn(_)
                | ServiceError::UnknownCategory { .. }
                | ServiceError::InvalidNumber { .. }
                | ServiceError::InvalidBody(_)
                | ServiceError::NoFileUploaded
                | ServiceError::UnsupportedFile
                | ServiceError::InvalidUpload(_)
        )
    }

    pub fn status(&self) -> StatusCode {
        if self.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Renders a class list the way the training tooling prints it,
/// e.g. `['Female', 'Male', "Master's"]`.
pub fn format_classes(classes: &[String]) -> String {
    let quoted: Vec<String> = classes
        .iter()
        .map(|c| {
            if c.contains('\'') && !c.contains('"') {
                format!("\"{}\"", c)
            } else {
                format!("'{}'", c.replace('\\', "\\\\").replace('\'', "\\'"))
            }
        })
        .collect();
    format!("[{}]", quoted.join(", "))
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_client_error() {
            tracing::warn!(error = %self, "rejected request");
        } else {
            tracing::error!(error = ?self, "request failed");
        }

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

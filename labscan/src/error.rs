use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabScanError {
    #[error("Failed to decode image: {0}")]
    Decode(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Upload too large: {0}")]
    PayloadTooLarge(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("OCR unavailable: {0}")]
    OcrUnavailable(String),

    #[error("Could not evaluate lab test pattern: {0}")]
    PatternEvaluation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LabScanError {
    pub fn status(&self) -> StatusCode {
        match self {
            LabScanError::Decode(_) | LabScanError::Validation(_) => StatusCode::BAD_REQUEST,
            LabScanError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            LabScanError::OcrUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            LabScanError::Recognition(_)
            | LabScanError::PatternEvaluation(_)
            | LabScanError::Config(_)
            | LabScanError::Internal(_)
            | LabScanError::Http(_)
            | LabScanError::Json(_)
            | LabScanError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for LabScanError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Lab report request failed");
        } else {
            tracing::warn!(error = %self, "Lab report request rejected");
        }

        let body = Json(json!({
            "is_success": false,
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, LabScanError>;

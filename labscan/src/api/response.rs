//! Wire format of `/get-lab-tests`.
//!
//! Success and failure share the `is_success` flag:
//!
//! ```json
//! { "is_success": true, "recognized_text": ["..."], "data": [ { ... } ] }
//! { "is_success": false, "error": "Failed to decode image: ..." }
//! ```
//!
//! Failures are rendered by [`LabScanError`](crate::error::LabScanError)'s
//! `IntoResponse` impl; [`ErrorResponse`] describes the same shape for
//! clients and the OpenAPI document.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{LabReport, LabTest};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LabTestsResponse {
    pub is_success: bool,
    /// Recognized lines in reading order.
    pub recognized_text: Vec<String>,
    pub data: Vec<LabTest>,
}

impl From<LabReport> for LabTestsResponse {
    fn from(report: LabReport) -> Self {
        Self {
            is_success: true,
            recognized_text: report.recognized_text,
            data: report.data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub is_success: bool,
    pub error: String,
}

/// Multipart body accepted by `/get-lab-tests`.
#[derive(Debug, ToSchema)]
pub struct LabReportUpload {
    /// Lab report image (PNG, JPEG, TIFF, BMP, ...).
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
}

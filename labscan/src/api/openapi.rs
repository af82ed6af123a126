use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::handlers;
use super::response;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Labscan API",
        version = "0.1.0",
        description = "Reads lab report images and returns structured lab test results.",
    ),
    paths(handlers::lab_tests::get_lab_tests, handlers::health::health_check),
    components(schemas(
        response::LabTestsResponse,
        response::ErrorResponse,
        response::LabReportUpload,
        models::LabTest,
        handlers::health::HealthData,
        handlers::health::OcrStatus,
    )),
    tags(
        (name = "lab-tests", description = "Lab report recognition and extraction"),
        (name = "health", description = "Health check"),
    ),
)]
pub struct ApiDoc;

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}

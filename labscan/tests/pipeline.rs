mod common;

use std::sync::Arc;

use image::ImageFormat;
use labscan::config::{OcrConfig, PreprocessingConfig};
use labscan::error::LabScanError;
use labscan::ocr::{preprocess_image, ImagePreprocessor, OcrProvider, TextRecognizer};
use labscan::services::LabReportService;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{report_page, SAMPLE_REPORT_LINES};

fn vision_config(server: &MockServer) -> OcrConfig {
    OcrConfig {
        model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("sk-test".to_string()),
        base_url: Some(server.uri()),
        languages: "eng".to_string(),
        timeout_secs: 5,
    }
}

async fn mount_transcription(server: &MockServer, text: &str) {
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_string_contains("data:image/png;base64,"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "choices": [ { "message": { "content": text } } ]
        })))
        .mount(server)
        .await;
}

fn service_with(recognizer: Arc<dyn TextRecognizer>) -> LabReportService {
    let preprocessor = ImagePreprocessor::new(&PreprocessingConfig::default()).unwrap();
    LabReportService::new(preprocessor, recognizer)
}

#[test]
fn test_preprocessing_accepts_common_formats() {
    for format in [ImageFormat::Png, ImageFormat::Jpeg, ImageFormat::Bmp, ImageFormat::Tiff] {
        let page = preprocess_image(&report_page(format), &PreprocessingConfig::default())
            .unwrap_or_else(|e| panic!("{format:?} page should preprocess: {e}"));

        assert_eq!(page.dimensions(), (200, 80));
        assert!(page.pixels().all(|p| p[0] == 0 || p[0] == 255));
    }
}

#[test]
fn test_preprocessing_keeps_text_rows_dark() {
    let page = preprocess_image(&report_page(ImageFormat::Png), &PreprocessingConfig::default())
        .unwrap();

    // Row edges sit next to the light background, so they stay below the local mean.
    assert_eq!(page.get_pixel(100, 8)[0], 0);
    assert_eq!(page.get_pixel(100, 11)[0], 0);
    assert_eq!(page.get_pixel(100, 2)[0], 255);
    assert_eq!(page.get_pixel(5, 9)[0], 255);
}

#[tokio::test]
async fn test_vision_provider_end_to_end() {
    let server = MockServer::start().await;
    mount_transcription(&server, &SAMPLE_REPORT_LINES.join("\n\n")).await;

    let provider = OcrProvider::new(&vision_config(&server)).unwrap();
    assert!(provider.is_available());

    let report = service_with(Arc::new(provider))
        .analyze(report_page(ImageFormat::Jpeg))
        .await
        .unwrap();

    assert_eq!(report.recognized_text, SAMPLE_REPORT_LINES);
    let names: Vec<&str> = report.data.iter().map(|t| t.test_name.as_str()).collect();
    assert_eq!(names, vec!["Glucose", "Hemoglobin", "WBC", "Platelets"]);
}

#[tokio::test]
async fn test_vision_provider_failure_is_recognition_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let provider = OcrProvider::new(&vision_config(&server)).unwrap();
    let result = service_with(Arc::new(provider))
        .analyze(report_page(ImageFormat::Png))
        .await;

    match result {
        Err(LabScanError::Recognition(message)) => assert!(message.contains("401")),
        other => panic!("expected a recognition error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_slow_recognizer_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "choices": [ { "message": { "content": "Glucose: 85 mg/dL (70-99)" } } ]
                }))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let config = OcrConfig {
        timeout_secs: 1,
        ..vision_config(&server)
    };
    let provider = OcrProvider::new(&config).unwrap();
    let result = service_with(Arc::new(provider))
        .analyze(report_page(ImageFormat::Png))
        .await;

    match result {
        Err(LabScanError::Recognition(message)) => assert!(message.contains("timed out")),
        other => panic!("expected a timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_missing_api_key_disables_recognizer() {
    let config = OcrConfig {
        model: "openai/gpt-4o-mini".to_string(),
        ..OcrConfig::default()
    };
    let provider = OcrProvider::new(&config).unwrap();
    assert!(!provider.is_available());

    let result = service_with(Arc::new(provider))
        .analyze(report_page(ImageFormat::Png))
        .await;
    assert!(matches!(result, Err(LabScanError::OcrUnavailable(_))));
}

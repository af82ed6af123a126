use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};

use crate::error::{LabScanError, Result};
use crate::extraction::LabTestExtractor;
use crate::models::LabReport;
use crate::ocr::{ImagePreprocessor, TextRecognizer};

/// Runs one uploaded report through preprocessing, recognition and extraction.
///
/// The recognizer is built once at startup and shared by every request.
/// Failures in any stage abort the whole analysis; partial reports are never
/// produced.
#[derive(Clone)]
pub struct LabReportService {
    preprocessor: Arc<ImagePreprocessor>,
    recognizer: Arc<dyn TextRecognizer>,
    extractor: LabTestExtractor,
}

impl LabReportService {
    pub fn new(preprocessor: ImagePreprocessor, recognizer: Arc<dyn TextRecognizer>) -> Self {
        Self {
            preprocessor: Arc::new(preprocessor),
            recognizer,
            extractor: LabTestExtractor::new(),
        }
    }

    pub fn recognizer(&self) -> &Arc<dyn TextRecognizer> {
        &self.recognizer
    }

    pub async fn analyze(&self, bytes: Vec<u8>) -> Result<LabReport> {
        let started = Instant::now();
        let upload_size = bytes.len();

        let preprocessor = Arc::clone(&self.preprocessor);
        let page = tokio::task::spawn_blocking(move || preprocessor.preprocess(&bytes))
            .await
            .map_err(|e| LabScanError::Internal(format!("Preprocessing task failed: {e}")))??;
        debug!(
            upload_size,
            width = page.width(),
            height = page.height(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Preprocessed report image"
        );

        let recognized_text = self.recognizer.recognize(&page).await?;
        let data = self.extractor.extract(&recognized_text)?;

        info!(
            recognizer = %self.recognizer.name(),
            lines = recognized_text.len(),
            records = data.len(),
            out_of_range = data.iter().filter(|t| t.lab_test_out_of_range).count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Lab report analyzed"
        );

        Ok(LabReport {
            recognized_text,
            data,
        })
    }
}

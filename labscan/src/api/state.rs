use std::sync::Arc;

use crate::config::Config;
use crate::ocr::{ImagePreprocessor, TextRecognizer};
use crate::services::LabReportService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub lab_reports: LabReportService,
}

impl AppState {
    pub fn new(
        config: Config,
        preprocessor: ImagePreprocessor,
        recognizer: Arc<dyn TextRecognizer>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            lab_reports: LabReportService::new(preprocessor, recognizer),
        }
    }

    pub fn recognizer(&self) -> &Arc<dyn TextRecognizer> {
        self.lab_reports.recognizer()
    }
}

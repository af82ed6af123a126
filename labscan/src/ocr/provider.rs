use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use image::GrayImage;
use leptess::LepTess;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::config::{parse_ocr_provider_model, OcrConfig};
use crate::error::{LabScanError, Result};

use super::api::OpenAiVisionClient;
use super::preprocessing::encode_png;
use super::recognizer::{split_lines, TextRecognizer};

enum OcrBackend {
    Local { tesseract: Arc<Mutex<LepTess>> },
    Api { client: OpenAiVisionClient },
    Unavailable { reason: String },
}

/// Recognizer selected by `OCR_MODEL`.
///
/// Backend construction never fails the process: a missing Tesseract install
/// or API key leaves the provider in an unavailable state and every call
/// returns [`LabScanError::OcrUnavailable`].
///
/// The local engine serves one page at a time. A request that times out while
/// queued for the engine is dropped before it runs, but a page Tesseract has
/// already started keeps the engine until Tesseract returns.
#[derive(Clone)]
pub struct OcrProvider {
    backend: Arc<OcrBackend>,
    config: OcrConfig,
}

fn create_tesseract(languages: &str) -> std::result::Result<LepTess, String> {
    LepTess::new(None, languages).map_err(|e| e.to_string())
}

/// Run `job` on the blocking pool with exclusive use of `engine`.
///
/// The lock is taken on the async side, so dropping the returned future while
/// it waits never schedules the job.
async fn run_exclusive<E, T, F>(engine: &Arc<Mutex<E>>, job: F) -> Result<T>
where
    E: Send + 'static,
    T: Send + 'static,
    F: FnOnce(&mut E) -> Result<T> + Send + 'static,
{
    let mut guard = Arc::clone(engine).lock_owned().await;
    tokio::task::spawn_blocking(move || job(&mut *guard))
        .await
        .map_err(|e| LabScanError::Recognition(format!("OCR task panicked: {e}")))?
}

impl OcrProvider {
    pub fn new(config: &OcrConfig) -> Result<Self> {
        let (provider, _) = parse_ocr_provider_model(&config.model);

        let backend = match provider.to_lowercase().as_str() {
            "openai" => match OpenAiVisionClient::new(config) {
                Ok(client) => {
                    info!(model = %client.model(), "OpenAI Vision OCR API backend initialized");
                    OcrBackend::Api { client }
                }
                Err(e) => {
                    let reason = format!("OpenAI Vision OCR backend unavailable: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
            "local" => match create_tesseract(&config.languages) {
                Ok(lt) => {
                    info!(languages = %config.languages, "Tesseract OCR initialized");
                    OcrBackend::Local {
                        tesseract: Arc::new(Mutex::new(lt)),
                    }
                }
                Err(e) => {
                    let reason = format!("Tesseract not available: {e}");
                    warn!("{}", reason);
                    OcrBackend::Unavailable { reason }
                }
            },
            other => {
                let reason = format!("Unknown OCR provider '{other}'");
                warn!("{}", reason);
                OcrBackend::Unavailable { reason }
            }
        };

        Ok(Self {
            backend: Arc::new(backend),
            config: config.clone(),
        })
    }

    /// Provider that rejects every request with `reason`.
    pub fn unavailable(config: &OcrConfig, reason: impl Into<String>) -> Self {
        Self {
            backend: Arc::new(OcrBackend::Unavailable {
                reason: reason.into(),
            }),
            config: config.clone(),
        }
    }

    pub fn unavailable_reason(&self) -> Option<&str> {
        match self.backend.as_ref() {
            OcrBackend::Unavailable { reason } => Some(reason),
            _ => None,
        }
    }

    pub async fn ocr(&self, image: &GrayImage) -> Result<String> {
        let timeout_duration = Duration::from_secs(self.config.timeout_secs);

        match tokio::time::timeout(timeout_duration, self.ocr_internal(image)).await {
            Ok(inner_result) => inner_result,
            Err(_) => Err(LabScanError::Recognition(format!(
                "OCR operation timed out after {} seconds",
                self.config.timeout_secs
            ))),
        }
    }

    async fn ocr_internal(&self, image: &GrayImage) -> Result<String> {
        match self.backend.as_ref() {
            OcrBackend::Local { tesseract } => {
                let bytes = encode_png(image)?;
                run_exclusive(tesseract, move |lt| {
                    lt.set_image_from_mem(&bytes).map_err(|e| {
                        LabScanError::Recognition(format!("Failed to set image: {e}"))
                    })?;
                    lt.get_utf8_text().map_err(|e| {
                        LabScanError::Recognition(format!("Failed to extract text: {e}"))
                    })
                })
                .await
            }
            OcrBackend::Api { client } => client.ocr(&encode_png(image)?).await,
            OcrBackend::Unavailable { reason } => {
                Err(LabScanError::OcrUnavailable(reason.clone()))
            }
        }
    }
}

#[async_trait]
impl TextRecognizer for OcrProvider {
    async fn recognize(&self, image: &GrayImage) -> Result<Vec<String>> {
        let text = self.ocr(image).await?;
        let lines = split_lines(&text);
        debug!(model = %self.config.model, lines = lines.len(), "Recognized text");
        Ok(lines)
    }

    fn is_available(&self) -> bool {
        !matches!(self.backend.as_ref(), OcrBackend::Unavailable { .. })
    }

    fn name(&self) -> &str {
        &self.config.model
    }
}

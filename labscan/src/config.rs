use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub ocr: OcrConfig,
    pub preprocessing: PreprocessingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Upper bound on the request body, enforced before the handler runs.
    pub max_upload_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OcrConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub languages: String,
    pub timeout_secs: u64,
}

/// Parameters of the binarization pipeline applied before recognition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PreprocessingConfig {
    /// Side of the Gaussian window used for the local threshold. Must be odd.
    pub block_size: u32,
    /// Constant subtracted from the local weighted mean.
    pub offset: f32,
    /// Side of the square structuring element used for the opening pass.
    pub opening_kernel: u32,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            model: "local/tesseract".to_string(),
            api_key: None,
            base_url: None,
            languages: "eng".to_string(),
            timeout_secs: 60,
        }
    }
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            block_size: 11,
            offset: 2.0,
            opening_kernel: 1,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PORT", 8000),
                max_upload_bytes: parse_env_or("MAX_UPLOAD_BYTES", 20 * 1024 * 1024),
            },
            ocr: OcrConfig {
                model: env::var("OCR_MODEL").unwrap_or_else(|_| "local/tesseract".to_string()),
                api_key: env::var("OCR_API_KEY").ok(),
                base_url: env::var("OCR_BASE_URL").ok(),
                languages: env::var("OCR_LANGUAGES").unwrap_or_else(|_| "eng".to_string()),
                timeout_secs: parse_env_or("OCR_TIMEOUT", 60),
            },
            preprocessing: PreprocessingConfig {
                block_size: parse_env_or("PREPROCESS_BLOCK_SIZE", 11),
                offset: parse_env_or("PREPROCESS_OFFSET", 2.0),
                opening_kernel: parse_env_or("PREPROCESS_OPENING_KERNEL", 1),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Split an OCR model name into `(provider, model)`.
///
/// Names without a known provider prefix resolve to the local engine.
pub fn parse_ocr_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_OCR_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}

/// Known OCR providers.
pub const KNOWN_OCR_PROVIDERS: &[&str] = &["local", "openai"];

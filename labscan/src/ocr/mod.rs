//! Image to text.
//!
//! Uploads go through two stages before extraction sees them:
//! - [`ImagePreprocessor`] binarizes the page (grayscale, adaptive Gaussian
//!   threshold, morphological opening)
//! - a [`TextRecognizer`] turns the binary page into text lines
//!
//! [`OcrProvider`] is the recognizer used in production. The backend is picked
//! from `OCR_MODEL`:
//! - `local/tesseract` runs Tesseract in-process through leptess
//! - `openai/<model>` sends the page to a vision-capable chat completion API
//!
//! ```rust,ignore
//! let preprocessor = ImagePreprocessor::new(&config.preprocessing)?;
//! let ocr = OcrProvider::new(&config.ocr)?;
//! let lines = ocr.recognize(&preprocessor.preprocess(&bytes)?).await?;
//! ```

mod api;
mod preprocessing;
mod provider;
mod recognizer;

pub use api::OpenAiVisionClient;
pub use preprocessing::{encode_png, preprocess_image, ImagePreprocessor};
pub use provider::OcrProvider;
pub use recognizer::{split_lines, TextRecognizer};

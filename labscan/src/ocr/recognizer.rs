use async_trait::async_trait;
use image::GrayImage;

use crate::error::Result;

/// Turns a preprocessed page into text lines.
///
/// Implementations are created once at startup and shared across requests,
/// so they must be safe to call concurrently.
#[async_trait]
pub trait TextRecognizer: Send + Sync {
    /// Recognize `image` and return its text lines in reading order.
    async fn recognize(&self, image: &GrayImage) -> Result<Vec<String>>;

    fn is_available(&self) -> bool {
        true
    }

    /// Short backend description for logs and health output.
    fn name(&self) -> &str;
}

/// Split raw recognizer output into trimmed, non-empty lines.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

use image::metadata::Orientation;
use image::{DynamicImage, GrayImage, ImageDecoder, ImageFormat, ImageReader, Luma};
use imageproc::distance_transform::Norm;
use imageproc::morphology::open;
use tracing::debug;

use crate::config::PreprocessingConfig;
use crate::error::{LabScanError, Result};

const WHITE: u8 = 255;
const BLACK: u8 = 0;

/// Binarizes report scans before they reach the recognizer.
///
/// Pipeline:
/// 1. Decode the upload (any format the `image` crate understands) and apply
///    its EXIF orientation
/// 2. Convert to grayscale with BT.601 weights
/// 3. Adaptive Gaussian threshold: a pixel turns white when it is brighter
///    than the Gaussian-weighted mean of its `block_size` window minus `offset`
/// 4. One morphological opening with an `opening_kernel` square element
///
/// The output keeps the decoded image's dimensions and only ever holds the
/// values 0 and 255.
#[derive(Debug, Clone)]
pub struct ImagePreprocessor {
    config: PreprocessingConfig,
    kernel: Vec<f32>,
}

impl ImagePreprocessor {
    pub fn new(config: &PreprocessingConfig) -> Result<Self> {
        if config.block_size < 3 || config.block_size % 2 == 0 {
            return Err(LabScanError::Config(format!(
                "Threshold block size must be an odd number >= 3, got {}",
                config.block_size
            )));
        }
        if config.opening_kernel == 0
            || config.opening_kernel % 2 == 0
            || config.opening_kernel > 511
        {
            return Err(LabScanError::Config(format!(
                "Opening kernel must be an odd number between 1 and 511, got {}",
                config.opening_kernel
            )));
        }
        if !config.offset.is_finite() {
            return Err(LabScanError::Config(
                "Threshold offset must be a finite number".to_string(),
            ));
        }

        Ok(Self {
            config: config.clone(),
            kernel: gaussian_kernel(config.block_size),
        })
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    pub fn preprocess(&self, bytes: &[u8]) -> Result<GrayImage> {
        let img = decode(bytes)?;
        let gray = to_gray_bt601(&img);
        debug!(
            width = gray.width(),
            height = gray.height(),
            "Decoded report image"
        );

        let binary = adaptive_threshold_gaussian(&gray, &self.kernel, self.config.offset);
        let radius = ((self.config.opening_kernel - 1) / 2) as u8;

        Ok(open(&binary, Norm::LInf, radius))
    }
}

/// Preprocess raw image bytes with the given configuration.
pub fn preprocess_image(bytes: &[u8], config: &PreprocessingConfig) -> Result<GrayImage> {
    ImagePreprocessor::new(config)?.preprocess(bytes)
}

/// Encode a preprocessed image as PNG for recognizers that take encoded bytes.
pub fn encode_png(image: &GrayImage) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    DynamicImage::ImageLuma8(image.clone())
        .write_to(&mut std::io::Cursor::new(&mut output), ImageFormat::Png)
        .map_err(|e| LabScanError::Internal(format!("Failed to encode image: {e}")))?;
    Ok(output)
}

fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    if bytes.is_empty() {
        return Err(LabScanError::Decode("uploaded file is empty".to_string()));
    }

    let mut decoder = ImageReader::new(std::io::Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| LabScanError::Decode(format!("Failed to read image: {e}")))?
        .into_decoder()
        .map_err(|e| LabScanError::Decode(e.to_string()))?;
    let orientation = decoder.orientation().unwrap_or(Orientation::NoTransforms);

    let mut img =
        DynamicImage::from_decoder(decoder).map_err(|e| LabScanError::Decode(e.to_string()))?;
    if orientation != Orientation::NoTransforms {
        debug!(?orientation, "Applying EXIF orientation");
        img.apply_orientation(orientation);
    }
    Ok(img)
}

/// Grayscale with ITU-R BT.601 luma, in 14-bit fixed point.
///
/// `DynamicImage::to_luma8` uses Rec.709 weights, which darken saturated
/// greens and reds relative to scanner-style luma. Alpha is dropped.
fn to_gray_bt601(img: &DynamicImage) -> GrayImage {
    const R: u32 = 4899;
    const G: u32 = 9617;
    const B: u32 = 1868;
    const SHIFT: u32 = 14;

    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let luma = (r as u32 * R + g as u32 * G + b as u32 * B + (1 << (SHIFT - 1))) >> SHIFT;
        Luma([luma.min(255) as u8])
    })
}

/// Normalized 1-D Gaussian weights for a window of `size` taps.
///
/// Sigma follows the usual derivation from the window size:
/// `0.3 * ((size - 1) * 0.5 - 1) + 0.8`.
fn gaussian_kernel(size: u32) -> Vec<f32> {
    let sigma = 0.3 * ((size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
    let center = (size as f32 - 1.0) / 2.0;
    let scale = -0.5 / (sigma * sigma);

    let weights: Vec<f32> = (0..size)
        .map(|i| {
            let x = i as f32 - center;
            (scale * x * x).exp()
        })
        .collect();
    let sum: f32 = weights.iter().sum();

    weights.into_iter().map(|w| w / sum).collect()
}

/// Separable Gaussian mean with replicated borders, rounded to 8 bits.
///
/// Rounds once after both passes; `imageproc::filter::separable_filter`
/// rounds the row pass back to `u8` first and drifts off the local mean.
fn gaussian_mean(gray: &GrayImage, kernel: &[f32]) -> GrayImage {
    let (width, height) = gray.dimensions();
    let radius = (kernel.len() / 2) as i64;
    let clamp = |v: i64, len: u32| v.clamp(0, len as i64 - 1) as u32;

    let mut horizontal = vec![0f32; (width * height) as usize];
    for y in 0..height {
        for x in 0..width {
            let mut acc = 0f32;
            for (k, weight) in kernel.iter().enumerate() {
                let sx = clamp(x as i64 + k as i64 - radius, width);
                acc += weight * gray.get_pixel(sx, y)[0] as f32;
            }
            horizontal[(y * width + x) as usize] = acc;
        }
    }

    GrayImage::from_fn(width, height, |x, y| {
        let mut acc = 0f32;
        for (k, weight) in kernel.iter().enumerate() {
            let sy = clamp(y as i64 + k as i64 - radius, height);
            acc += weight * horizontal[(sy * width + x) as usize];
        }
        Luma([acc.round().clamp(0.0, 255.0) as u8])
    })
}

fn adaptive_threshold_gaussian(gray: &GrayImage, kernel: &[f32], offset: f32) -> GrayImage {
    let mean = gaussian_mean(gray, kernel);
    let delta = offset.ceil() as i32;

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let pixel = gray.get_pixel(x, y)[0] as i32;
        let local = mean.get_pixel(x, y)[0] as i32;
        if pixel > local - delta {
            Luma([WHITE])
        } else {
            Luma([BLACK])
        }
    })
}

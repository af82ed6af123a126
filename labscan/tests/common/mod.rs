#![allow(dead_code)]

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

pub const BOUNDARY: &str = "labscan-integration-boundary";

/// Lines of a typical recognized report, header noise included.
pub const SAMPLE_REPORT_LINES: &[&str] = &[
    "CITY GENERAL HOSPITAL - CLINICAL LABORATORY",
    "Patient Name John Smith",
    "Report date 2024-01-05",
    "Glucose: 85 mg/dL (70-99)",
    "Hemoglobin 16.5 g/dL 13.5 - 17.5",
    "WBC: 15.2 (4.5-11.0)",
    "Platelets: 130 K/uL (150-400)",
    "Verified by Dr. A. Jones",
];

/// Light page with a few dark horizontal strokes standing in for text rows.
pub fn report_page(format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(200, 80, |x, y| {
        let on_row = matches!(y % 20, 8..=11);
        if on_row && (20..180).contains(&x) {
            Rgb([30, 30, 30])
        } else {
            Rgb([235, 235, 235])
        }
    });

    let mut output = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut output), format)
        .unwrap_or_else(|e| panic!("Failed to encode test page as {format:?}: {e}"));
    output
}

pub fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; \
         filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn multipart_content_type() -> String {
    format!("multipart/form-data; boundary={BOUNDARY}")
}

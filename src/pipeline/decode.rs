//! Image codec glue: upload bytes → `DynamicImage`, `DynamicImage` → PNG.
//!
//! Uploaded images are decoded with the format implied by their extension and
//! flattened to RGB (tesseract handles alpha and palette images poorly). Pages
//! handed to the engine are always PNG: lossless, so thin strokes survive.

use crate::error::OcrConvertError;
use image::{DynamicImage, ImageFormat};
use std::io::Cursor;
use tracing::debug;

/// Decode an uploaded image and convert it to RGB.
pub fn decode_image(bytes: &[u8], extension: &str) -> Result<DynamicImage, OcrConvertError> {
    let decoded = match format_for_extension(extension) {
        Some(format) => image::load_from_memory_with_format(bytes, format),
        None => image::load_from_memory(bytes),
    }
    .map_err(|e| OcrConvertError::DecodeFailed {
        extension: extension.to_string(),
        detail: e.to_string(),
    })?;

    debug!(
        "Decoded .{} image → {}x{} px",
        extension,
        decoded.width(),
        decoded.height()
    );

    Ok(match decoded {
        rgb @ DynamicImage::ImageRgb8(_) => rgb,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    })
}

/// Encode a page bitmap as PNG bytes for the OCR engine.
pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, image::ImageError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    debug!("Encoded page → {} bytes PNG", buf.len());
    Ok(buf)
}

fn format_for_extension(extension: &str) -> Option<ImageFormat> {
    match extension {
        "png" => Some(ImageFormat::Png),
        "jpg" | "jpeg" => Some(ImageFormat::Jpeg),
        "tiff" => Some(ImageFormat::Tiff),
        "bmp" => Some(ImageFormat::Bmp),
        _ => None,
    }
}

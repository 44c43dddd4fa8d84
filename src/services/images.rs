use std::io::Cursor;

use base64::Engine;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{ColorType, ImageEncoder};

use crate::errors::AppError;

pub const MAX_UPLOAD_BYTES: usize = 2 * 1024 * 1024;
pub const MAX_EDGE: u32 = 600;
pub const JPEG_QUALITY: u8 = 60;

/// Turns an uploaded reference picture into a compact JPEG data URL that can
/// be stored on the appointment.
pub fn normalize_image(bytes: &[u8], content_type: Option<&str>) -> Result<String, AppError> {
    match content_type {
        Some(ct) if ct.starts_with("image/") => {}
        _ => return Err(AppError::validation("only image files are allowed")),
    }
    if bytes.is_empty() {
        return Err(AppError::validation("no file uploaded"));
    }
    if bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::validation("image is too large (max 2 MB)"));
    }

    let decoded = image::load_from_memory(bytes)
        .map_err(|e| AppError::validation(format!("could not read image: {e}")))?;

    let fitted = if decoded.width() > MAX_EDGE || decoded.height() > MAX_EDGE {
        decoded.resize(MAX_EDGE, MAX_EDGE, FilterType::Triangle)
    } else {
        decoded
    };
    let rgb = fitted.to_rgb8();

    let mut jpeg = Cursor::new(Vec::new());
    JpegEncoder::new_with_quality(&mut jpeg, JPEG_QUALITY)
        .write_image(rgb.as_raw(), rgb.width(), rgb.height(), ColorType::Rgb8)
        .map_err(|e| AppError::Storage(anyhow::anyhow!("jpeg encoding failed: {e}")))?;

    tracing::debug!(
        original_bytes = bytes.len(),
        jpeg_bytes = jpeg.get_ref().len(),
        width = rgb.width(),
        height = rgb.height(),
        "image normalized"
    );

    let encoded = base64::engine::general_purpose::STANDARD.encode(jpeg.into_inner());
    Ok(format!("data:image/jpeg;base64,{encoded}"))
}

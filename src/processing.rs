//! Image compression for capture artifacts.
//!
//! Pure transformation: decode, bound to the target box, re-encode as JPEG.
//! Encoding is an optimization, not a correctness requirement; when the
//! re-encode fails the original bytes pass through unchanged.

use std::io::Cursor;

use image::{codecs::jpeg::JpegEncoder, imageops::FilterType, GenericImageView};
use log::warn;
use tokio::time::{sleep, Duration};

use crate::error::CaptureError;

pub const MAX_WIDTH: u32 = 1200;
pub const MAX_HEIGHT: u32 = 1600;
pub const JPEG_QUALITY: u8 = 80;

/// Minimum visible processing window: without it small images finish faster
/// than the host can render its "processing" state.
const PROCESSING_DELAY_MS: u64 = 400;

/// Bounds `width` x `height` into the target box, preserving aspect ratio.
/// Landscape inputs bound by width, portrait and square inputs by height;
/// images already inside their bound keep the original size. Never enlarges.
pub fn target_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width > height {
        if width > MAX_WIDTH {
            let scaled = (height as f64 * MAX_WIDTH as f64 / width as f64).round() as u32;
            return (MAX_WIDTH, scaled.max(1));
        }
    } else if height > MAX_HEIGHT {
        let scaled = (width as f64 * MAX_HEIGHT as f64 / height as f64).round() as u32;
        return (scaled.max(1), MAX_HEIGHT);
    }
    (width, height)
}

/// Decodes `raw`, resizes it under the target bounds and re-encodes it as a
/// JPEG artifact. Fails only when the input cannot be decoded.
pub async fn compress(raw: &[u8]) -> Result<Vec<u8>, CaptureError> {
    let decoded = image::load_from_memory(raw).map_err(CaptureError::Decode)?;

    let (width, height) = decoded.dimensions();
    let (target_w, target_h) = target_dimensions(width, height);

    let resized = if (target_w, target_h) == (width, height) {
        decoded
    } else {
        decoded.resize_exact(target_w, target_h, FilterType::Triangle)
    };

    let mut encoded = Vec::new();
    let encoder = JpegEncoder::new_with_quality(Cursor::new(&mut encoded), JPEG_QUALITY);
    let artifact = match resized.to_rgb8().write_with_encoder(encoder) {
        Ok(()) => encoded,
        Err(err) => {
            warn!("JPEG re-encode failed, passing original through: {err}");
            raw.to_vec()
        }
    };

    sleep(Duration::from_millis(PROCESSING_DELAY_MS)).await;

    Ok(artifact)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 60]));
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .expect("encode fixture");
        bytes
    }

    #[test]
    fn landscape_bounds_by_width() {
        assert_eq!(target_dimensions(3000, 2000), (1200, 800));
    }

    #[test]
    fn portrait_bounds_by_height() {
        assert_eq!(target_dimensions(800, 2000), (640, 1600));
    }

    #[test]
    fn in_bounds_images_keep_their_size() {
        assert_eq!(target_dimensions(1200, 1600), (1200, 1600));
        assert_eq!(target_dimensions(640, 480), (640, 480));
        assert_eq!(target_dimensions(100, 1600), (100, 1600));
    }

    #[test]
    fn never_enlarges_small_inputs() {
        let (w, h) = target_dimensions(30, 40);
        assert!(w <= 30 && h <= 40);
    }

    #[tokio::test]
    async fn compress_resizes_landscape_input() {
        let artifact = compress(&png_bytes(3000, 2000)).await.expect("compress");
        let decoded = image::load_from_memory(&artifact).expect("decode artifact");
        assert_eq!(decoded.dimensions(), (1200, 800));
    }

    #[tokio::test]
    async fn compress_resizes_portrait_input() {
        let artifact = compress(&png_bytes(800, 2000)).await.expect("compress");
        let decoded = image::load_from_memory(&artifact).expect("decode artifact");
        assert_eq!(decoded.dimensions(), (640, 1600));
    }

    #[tokio::test]
    async fn compress_keeps_in_bounds_dimensions() {
        let artifact = compress(&png_bytes(320, 240)).await.expect("compress");
        let decoded = image::load_from_memory(&artifact).expect("decode artifact");
        assert_eq!(decoded.dimensions(), (320, 240));
    }

    #[tokio::test]
    async fn compress_rejects_undecodable_input() {
        let err = compress(b"not an image").await.expect_err("must fail");
        assert!(matches!(err, CaptureError::Decode(_)));
    }
}

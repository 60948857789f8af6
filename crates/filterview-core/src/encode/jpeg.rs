//! JPEG encoding for saving.
//!
//! The working buffer is RGBA; JPEG has no alpha channel, so alpha is
//! dropped before handing the pixels to the `image` crate's encoder.

use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::decode::DecodedImage;

/// Errors that can occur during JPEG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 4), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// JPEG encoding failed
    #[error("JPEG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode an RGBA image to JPEG bytes.
///
/// # Arguments
///
/// * `image` - RGBA image to encode
/// * `quality` - JPEG quality (1-100, where 100 is highest quality)
///
/// Quality values outside 1-100 are clamped.
pub fn encode_jpeg(image: &DecodedImage, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 4;
    if image.pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: image.pixels.len(),
        });
    }

    let rgb: Vec<u8> = image
        .pixels
        .chunks_exact(4)
        .flat_map(|px| [px[0], px[1], px[2]])
        .collect();

    let quality = quality.clamp(1, 100);
    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray(width: u32, height: u32) -> DecodedImage {
        DecodedImage::new(width, height, vec![128u8; (width * height * 4) as usize])
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let jpeg_bytes = encode_jpeg(&gray(100, 100), 90).unwrap();

        // SOI and EOI markers
        assert_eq!(&jpeg_bytes[0..2], &[0xFF, 0xD8]);
        let len = jpeg_bytes.len();
        assert_eq!(&jpeg_bytes[len - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_decodes_back_to_same_size() {
        let jpeg_bytes = encode_jpeg(&gray(40, 30), 90).unwrap();
        let decoded = image::load_from_memory(&jpeg_bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (40, 30));
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        assert!(encode_jpeg(&gray(10, 10), 0).is_ok());
        assert!(encode_jpeg(&gray(10, 10), 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_ignores_alpha() {
        let mut transparent = gray(8, 8);
        for px in transparent.pixels.chunks_exact_mut(4) {
            px[3] = 0;
        }
        let a = encode_jpeg(&transparent, 90).unwrap();
        let b = encode_jpeg(&gray(8, 8), 90).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_encode_jpeg_invalid_pixel_data() {
        let img = DecodedImage {
            width: 10,
            height: 10,
            pixels: vec![128u8; 10 * 9 * 4],
        };
        let result = encode_jpeg(&img, 90);
        assert!(matches!(result, Err(EncodeError::InvalidPixelData { .. })));
    }

    #[test]
    fn test_encode_jpeg_null_image() {
        let result = encode_jpeg(&DecodedImage::null(), 90);
        assert!(matches!(result, Err(EncodeError::InvalidDimensions { .. })));
    }
}

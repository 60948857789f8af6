//! EXIF orientation lookup.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::ImageFormat;

use super::Orientation;

/// Reads the orientation tag from encoded image bytes.
///
/// The view calls this with the same bytes it decodes, together with the
/// container format the decoder detected (if any).
pub trait OrientationReader {
    fn read_orientation(&self, bytes: &[u8], format: Option<ImageFormat>) -> Orientation;
}

/// Orientation reader backed by `kamadak-exif`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExifOrientationReader;

impl OrientationReader for ExifOrientationReader {
    fn read_orientation(&self, bytes: &[u8], format: Option<ImageFormat>) -> Orientation {
        if let Some(format) = format {
            if !can_carry_exif(format) {
                return Orientation::Normal;
            }
        }
        extract_orientation(bytes)
    }
}

/// Containers `kamadak-exif` knows how to pull an EXIF block out of.
fn can_carry_exif(format: ImageFormat) -> bool {
    matches!(
        format,
        ImageFormat::Jpeg | ImageFormat::Tiff | ImageFormat::Png | ImageFormat::WebP
    )
}

/// Extract EXIF orientation from container bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(e) => {
            tracing::trace!("no usable EXIF block: {}", e);
            Orientation::Normal
        }
    }
}

/// Extract EXIF orientation value from raw bytes (for external use).
pub fn get_orientation(bytes: &[u8]) -> Orientation {
    extract_orientation(bytes)
}

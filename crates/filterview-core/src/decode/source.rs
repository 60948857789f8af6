//! Loading a photo from a path or `file://` URI with orientation correction.

use std::io::Cursor;
use std::path::PathBuf;

use image::{ImageFormat, ImageReader};

use super::{DecodeError, DecodedImage, Orientation, OrientationReader};
use crate::transform::apply_orientation;

/// A decoded, upright image together with what was learned while loading it.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    /// Orientation-corrected pixels.
    pub image: DecodedImage,
    /// Container format detected from the bytes.
    pub format: ImageFormat,
    /// Orientation read from metadata (already applied to `image`).
    pub orientation: Orientation,
}

/// Turn a source string into a filesystem path.
///
/// Accepts plain paths and `file://` URIs.
pub fn resolve_source(source: &str) -> PathBuf {
    let path = source
        .strip_prefix("file://localhost")
        .or_else(|| source.strip_prefix("file://"))
        .unwrap_or(source);
    PathBuf::from(path)
}

/// Read and decode the image behind `source`.
pub fn load_source(
    source: &str,
    reader: &dyn OrientationReader,
) -> Result<LoadedImage, DecodeError> {
    let path = resolve_source(source);
    let bytes = std::fs::read(&path)?;
    decode_bytes(&bytes, reader)
}

/// Decode encoded image bytes and correct their orientation.
///
/// The orientation is read from the same bytes that are decoded, using the
/// container format the decoder detected.
pub fn decode_bytes(
    bytes: &[u8],
    reader: &dyn OrientationReader,
) -> Result<LoadedImage, DecodeError> {
    let guessed = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let format = guessed.format().ok_or(DecodeError::InvalidFormat)?;

    let img = guessed
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    let orientation = reader.read_orientation(bytes, Some(format));
    let image = apply_orientation(DecodedImage::from_dynamic(img), orientation);

    Ok(LoadedImage {
        image,
        format,
        orientation,
    })
}

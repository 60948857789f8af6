//! Image loading for the photo view.
//!
//! This module provides functionality for:
//! - Resolving a source string (path or `file://` URI) to bytes
//! - Detecting the container format and decoding to RGBA
//! - Reading EXIF orientation from the same bytes and correcting for it
//!
//! # Examples
//!
//! ```ignore
//! use filterview_core::decode::{load_source, ExifOrientationReader};
//!
//! let loaded = load_source("file:///home/user/photo.jpg", &ExifOrientationReader).unwrap();
//! println!("{}x{} {:?}", loaded.image.width, loaded.image.height, loaded.orientation);
//! ```

mod orientation;
mod source;
mod types;

pub use orientation::{get_orientation, ExifOrientationReader, OrientationReader};
pub use source::{decode_bytes, load_source, resolve_source, LoadedImage};
pub use types::{DecodeError, DecodedImage, Orientation};

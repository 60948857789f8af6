//! Image encoding for saving the working buffer.
//!
//! # Examples
//!
//! ```ignore
//! use filterview_core::{decode::DecodedImage, encode::encode_jpeg};
//!
//! let image = DecodedImage::new(100, 100, vec![128u8; 100 * 100 * 4]);
//! let jpeg_bytes = encode_jpeg(&image, 90).unwrap();
//! println!("Encoded {} bytes", jpeg_bytes.len());
//! ```

mod jpeg;

pub use jpeg::{encode_jpeg, EncodeError};

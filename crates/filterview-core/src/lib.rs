//! Filterview Core - orientation-aware photo view with pluggable filters
//!
//! This crate provides the toolkit-independent core of a photo item that
//! shows an image, runs a filter over it, and saves the result:
//!
//! - [`decode`]: load a path or `file://` URI and correct EXIF orientation
//! - [`transform`]: the eight orientation corrections
//! - [`filter`]: the filter capability trait and two built-in filters
//! - [`view`]: the load / apply / commit / save state machine
//! - [`render`]: texture node synchronization with a host renderer
//! - [`encode`]: JPEG encoding for saving

pub mod adjustments;
pub mod config;
pub mod decode;
pub mod encode;
pub mod filter;
pub mod luminance;
pub mod render;
pub mod transform;
pub mod view;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ConfigError, ViewConfig};
pub use decode::{DecodedImage, Orientation};
pub use filter::{FilterParameter, FilterSink, ImageFilter};
pub use render::{TextureHost, TextureNode};
pub use transform::apply_orientation;
pub use view::{FilterState, ImageView, SaveError, ViewEvent};

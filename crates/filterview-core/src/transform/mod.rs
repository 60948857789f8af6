//! Geometric image transforms.
//!
//! Only the eight EXIF orientation corrections are needed: horizontal and
//! vertical flips and quarter turns, composed where a case requires it.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner
//! - Quarter turns are clockwise as seen on screen

mod orient;

pub use orient::apply_orientation;

//! Tonal and color adjustments on RGBA pixel data.
//!
//! ## Adjustment Order
//! 1. Exposure
//! 2. Contrast
//! 3. Temperature
//! 4. Saturation
//!
//! Alpha is left untouched.

use serde::{Deserialize, Serialize};

use crate::luminance::calculate_luminance;

/// Valid range for exposure, in stops.
pub const EXPOSURE_RANGE: (f32, f32) = (-5.0, 5.0);

/// Valid range for the percentage-style adjustments.
pub const PERCENT_RANGE: (f32, f32) = (-100.0, 100.0);

/// Adjustment values consumed by [`apply_adjustments`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Adjustments {
    /// Exposure adjustment (-5 to 5 stops)
    pub exposure: f32,
    /// Contrast (-100 to 100)
    pub contrast: f32,
    /// White balance temperature (-100 warm to 100 cool)
    pub temperature: f32,
    /// Saturation (-100 to 100)
    pub saturation: f32,
}

impl Adjustments {
    /// Check if all values are at their defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Check that every value is finite and inside its range.
    pub fn is_valid(&self) -> bool {
        in_range(self.exposure, EXPOSURE_RANGE)
            && in_range(self.contrast, PERCENT_RANGE)
            && in_range(self.temperature, PERCENT_RANGE)
            && in_range(self.saturation, PERCENT_RANGE)
    }
}

fn in_range(value: f32, (min, max): (f32, f32)) -> bool {
    value.is_finite() && value >= min && value <= max
}

/// Apply all adjustments to RGBA pixel data in place.
pub fn apply_adjustments(pixels: &mut [u8], adjustments: &Adjustments) {
    if adjustments.is_default() {
        return;
    }

    for chunk in pixels.chunks_exact_mut(4) {
        let mut r = chunk[0] as f32 / 255.0;
        let mut g = chunk[1] as f32 / 255.0;
        let mut b = chunk[2] as f32 / 255.0;

        (r, g, b) = apply_exposure(r, g, b, adjustments.exposure);
        (r, g, b) = apply_contrast(r, g, b, adjustments.contrast);
        (r, g, b) = apply_temperature(r, g, b, adjustments.temperature);
        (r, g, b) = apply_saturation(r, g, b, adjustments.saturation);

        chunk[0] = (r.clamp(0.0, 1.0) * 255.0).round() as u8;
        chunk[1] = (g.clamp(0.0, 1.0) * 255.0).round() as u8;
        chunk[2] = (b.clamp(0.0, 1.0) * 255.0).round() as u8;
    }
}

/// Formula: `output = input * 2^exposure`
#[inline]
fn apply_exposure(r: f32, g: f32, b: f32, exposure: f32) -> (f32, f32, f32) {
    if exposure == 0.0 {
        return (r, g, b);
    }
    let multiplier = 2.0_f32.powf(exposure);
    (r * multiplier, g * multiplier, b * multiplier)
}

/// Formula: `output = (input - 0.5) * (1 + contrast/100) + 0.5`
#[inline]
fn apply_contrast(r: f32, g: f32, b: f32, contrast: f32) -> (f32, f32, f32) {
    if contrast == 0.0 {
        return (r, g, b);
    }
    let factor = 1.0 + (contrast / 100.0);
    (
        (r - 0.5) * factor + 0.5,
        (g - 0.5) * factor + 0.5,
        (b - 0.5) * factor + 0.5,
    )
}

/// Negative warms (red up, blue down), positive cools.
#[inline]
fn apply_temperature(r: f32, g: f32, b: f32, temperature: f32) -> (f32, f32, f32) {
    if temperature == 0.0 {
        return (r, g, b);
    }
    let shift = temperature / 100.0 * 0.3;
    (r * (1.0 - shift), g, b * (1.0 + shift))
}

/// Scales each channel's distance from the pixel's luminance.
#[inline]
fn apply_saturation(r: f32, g: f32, b: f32, saturation: f32) -> (f32, f32, f32) {
    if saturation == 0.0 {
        return (r, g, b);
    }
    let gray = calculate_luminance(r, g, b);
    let factor = 1.0 + (saturation / 100.0);
    (
        gray + (r - gray) * factor,
        gray + (g - gray) * factor,
        gray + (b - gray) * factor,
    )
}

//! Parameterless grayscale filter, applied synchronously.

use std::sync::Arc;

use super::{FilterParameter, FilterSink, ImageFilter};
use crate::decode::DecodedImage;
use crate::luminance::calculate_luminance_u8;

/// Replaces every pixel with its BT.709 luminance.
#[derive(Debug, Default)]
pub struct GrayscaleFilter;

impl GrayscaleFilter {
    pub fn new() -> Self {
        Self
    }
}

impl ImageFilter for GrayscaleFilter {
    fn name(&self) -> &str {
        "Grayscale"
    }

    fn parameters(&self) -> Vec<FilterParameter> {
        Vec::new()
    }

    fn apply(&self, image: Arc<DecodedImage>, sink: FilterSink) -> bool {
        if image.is_empty() {
            return false;
        }

        let mut out = (*image).clone();
        for px in out.pixels.chunks_exact_mut(4) {
            let lum = calculate_luminance_u8(px[0], px[1], px[2]);
            px[0] = lum;
            px[1] = lum;
            px[2] = lum;
        }
        sink.deliver(out);
        true
    }

    fn reset_parameters(&self) {}
}

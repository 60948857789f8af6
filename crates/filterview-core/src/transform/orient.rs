//! Orientation correction using flips and quarter turns.

use image::DynamicImage;

use crate::decode::{DecodedImage, Orientation};

/// Apply an EXIF orientation correction to an image.
///
/// `Orientation::Normal` hands the input back without copying. Null images
/// and buffers whose length does not match their dimensions are also
/// returned unchanged.
pub fn apply_orientation(image: DecodedImage, orientation: Orientation) -> DecodedImage {
    if orientation == Orientation::Normal || image.is_empty() {
        return image;
    }

    let expected = (image.width as usize) * (image.height as usize) * 4;
    if image.pixels.len() != expected {
        return image;
    }

    let Some(rgba) = image.into_rgba_image() else {
        return DecodedImage::null();
    };
    let img = DynamicImage::ImageRgba8(rgba);

    let corrected = match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.fliph().flipv(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    };

    DecodedImage::from_dynamic(corrected)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn image_strategy() -> impl Strategy<Value = DecodedImage> {
        (1u32..=9, 1u32..=9).prop_flat_map(|(w, h)| {
            let size = (w * h * 4) as usize;
            prop::collection::vec(any::<u8>(), size..=size)
                .prop_map(move |pixels| DecodedImage::new(w, h, pixels))
        })
    }

    fn orientation_strategy() -> impl Strategy<Value = Orientation> {
        (1u32..=8).prop_map(Orientation::from)
    }

    proptest! {
        /// Property: correcting and then applying the inverse restores the grid.
        #[test]
        fn prop_inverse_restores_original(
            img in image_strategy(),
            o in orientation_strategy(),
        ) {
            let corrected = apply_orientation(img.clone(), o);
            let restored = apply_orientation(corrected, o.inverse());
            prop_assert_eq!(restored, img);
        }

        /// Property: pixel count is preserved and dimensions swap only for quarter turns.
        #[test]
        fn prop_dimensions_follow_orientation(
            img in image_strategy(),
            o in orientation_strategy(),
        ) {
            let (w, h) = img.dimensions();
            let corrected = apply_orientation(img, o);
            let expected = if o.swaps_dimensions() { (h, w) } else { (w, h) };
            prop_assert_eq!(corrected.dimensions(), expected);
            prop_assert_eq!(corrected.pixels.len(), (w * h * 4) as usize);
        }

        /// Property: identity returns pixel-for-pixel identical content.
        #[test]
        fn prop_normal_is_identity(img in image_strategy()) {
            let result = apply_orientation(img.clone(), Orientation::Normal);
            prop_assert_eq!(result, img);
        }
    }
}

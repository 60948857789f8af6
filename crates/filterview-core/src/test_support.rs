//! Fixtures shared by unit tests.

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use image::{DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};

use crate::decode::{DecodedImage, Orientation, OrientationReader};
use crate::filter::{FilterParameter, FilterSink, ImageFilter};

/// PNG checkerboard, red at (0, 0), blue on the odd squares.
pub(crate) fn checker_png(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        if (x + y) % 2 == 0 {
            Rgba([255, 0, 0, 255])
        } else {
            Rgba([0, 0, 255, 255])
        }
    });
    encode(DynamicImage::ImageRgba8(img), ImageFormat::Png)
}

pub(crate) fn solid_jpeg(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb(rgb));
    encode(DynamicImage::ImageRgb8(img), ImageFormat::Jpeg)
}

/// JPEG carrying a minimal little-endian EXIF block with one orientation tag.
pub(crate) fn jpeg_with_orientation(width: u32, height: u32, code: u16) -> Vec<u8> {
    let jpeg = solid_jpeg(width, height, [30, 160, 90]);
    let [lo, hi] = code.to_le_bytes();

    #[rustfmt::skip]
    let tiff: [u8; 26] = [
        0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00, // header, IFD0 at 8
        0x01, 0x00,                                     // one entry
        0x12, 0x01, 0x03, 0x00, 0x01, 0x00, 0x00, 0x00, // Orientation, SHORT, count 1
        lo, hi, 0x00, 0x00,                             // value
        0x00, 0x00, 0x00, 0x00,                         // no next IFD
    ];

    let payload_len = 2 + 6 + tiff.len();
    let mut out = Vec::with_capacity(jpeg.len() + payload_len + 2);
    out.extend_from_slice(&jpeg[..2]);
    out.extend_from_slice(&[0xFF, 0xE1]);
    out.extend_from_slice(&(payload_len as u16).to_be_bytes());
    out.extend_from_slice(b"Exif\0\0");
    out.extend_from_slice(&tiff);
    out.extend_from_slice(&jpeg[2..]);
    out
}

fn encode(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, format).unwrap();
    buf.into_inner()
}

/// Write `bytes` to `dir/name` and return the path as a source string.
pub(crate) fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> String {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path.to_string_lossy().into_owned()
}

/// Orientation reader that ignores the bytes.
pub(crate) struct FixedOrientation(pub Orientation);

impl OrientationReader for FixedOrientation {
    fn read_orientation(&self, _bytes: &[u8], _format: Option<ImageFormat>) -> Orientation {
        self.0
    }
}

/// Filter that records every request and lets the test deliver later.
pub(crate) struct RecordingFilter {
    params: Vec<FilterParameter>,
    accept: AtomicBool,
    requests: Mutex<Vec<(Arc<DecodedImage>, FilterSink)>>,
    resets: AtomicUsize,
}

impl RecordingFilter {
    pub(crate) fn parameterless() -> Arc<Self> {
        Arc::new(Self::with_params(Vec::new()))
    }

    pub(crate) fn parameterized() -> Arc<Self> {
        Arc::new(Self::with_params(vec![FilterParameter::new(
            "strength", 0.5, 0.0, 1.0, 0.5,
        )]))
    }

    fn with_params(params: Vec<FilterParameter>) -> Self {
        Self {
            params,
            accept: AtomicBool::new(true),
            requests: Mutex::new(Vec::new()),
            resets: AtomicUsize::new(0),
        }
    }

    pub(crate) fn set_accept(&self, accept: bool) {
        self.accept.store(accept, Ordering::SeqCst);
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn reset_count(&self) -> usize {
        self.resets.load(Ordering::SeqCst)
    }

    /// Image handed to the most recent request.
    pub(crate) fn last_input(&self) -> Arc<DecodedImage> {
        let requests = self.requests.lock().unwrap();
        Arc::clone(&requests.last().unwrap().0)
    }

    /// Answer the oldest pending request with `image`.
    pub(crate) fn deliver_oldest(&self, image: DecodedImage) {
        let (_, sink) = self.requests.lock().unwrap().remove(0);
        sink.deliver(image);
    }
}

impl ImageFilter for RecordingFilter {
    fn name(&self) -> &str {
        "Recording"
    }

    fn parameters(&self) -> Vec<FilterParameter> {
        self.params.clone()
    }

    fn apply(&self, image: Arc<DecodedImage>, sink: FilterSink) -> bool {
        if !self.accept.load(Ordering::SeqCst) {
            return false;
        }
        self.requests.lock().unwrap().push((image, sink));
        true
    }

    fn reset_parameters(&self) {
        self.resets.fetch_add(1, Ordering::SeqCst);
    }
}

/// 2x2 image of one color.
pub(crate) fn solid(rgba: [u8; 4]) -> DecodedImage {
    DecodedImage::new(2, 2, rgba.repeat(4))
}

/// Image decoding into RGBA8.
pub mod decode;
/// Layer directory index and fuzzy lookup.
pub mod library;

use image::RgbaImage;

/// Decoded layer image, always 4-channel straight-alpha RGBA8.
#[derive(Clone, Debug)]
pub struct LayerImage {
    /// Straight-alpha RGBA8, row-major, tightly packed.
    pub rgba8: RgbaImage,
}

impl LayerImage {
    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.rgba8.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.rgba8.height()
    }
}

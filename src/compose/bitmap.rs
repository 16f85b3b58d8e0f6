use image::{Rgba, RgbaImage};

use crate::geometry::LogicalRect;

/// The single stitched image handed to encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureBitmap {
    image: RgbaImage,
    selection: LogicalRect,
}

impl CaptureBitmap {
    pub(crate) fn new(image: RgbaImage, selection: LogicalRect) -> Self {
        Self { image, selection }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// The container-space rectangle this bitmap was cut from.
    pub fn selection(&self) -> LogicalRect {
        self.selection
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        self.image.get_pixel_checked(x, y).map(|Rgba(rgba)| *rgba)
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

#[cfg(test)]
impl CaptureBitmap {
    pub(crate) fn blank(width: u32, height: u32) -> Self {
        Self::new(
            RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])),
            LogicalRect::default(),
        )
    }
}

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};

use crate::compose::CaptureBitmap;
use crate::config::CaptureFormat;
use crate::error::{AppError, AppResult};

/// An encoded capture ready to leave the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub format: CaptureFormat,
    pub width: u32,
    pub height: u32,
    pub bytes: Vec<u8>,
}

impl EncodedImage {
    pub fn mime_type(&self) -> &'static str {
        match self.format {
            CaptureFormat::Png => "image/png",
            CaptureFormat::Jpeg => "image/jpeg",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self.format {
            CaptureFormat::Png => "png",
            CaptureFormat::Jpeg => "jpg",
        }
    }
}

/// Consumes the bitmap; it is not needed once encoded.
pub fn encode_bitmap(
    bitmap: CaptureBitmap,
    format: CaptureFormat,
    jpeg_quality: u8,
) -> AppResult<EncodedImage> {
    if bitmap.is_empty() {
        return Err(AppError::encoding("capture bitmap has no pixels"));
    }

    let (width, height) = (bitmap.width(), bitmap.height());
    let image = bitmap.into_image();
    let mut bytes = Vec::new();
    match format {
        CaptureFormat::Png => image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|source| AppError::encoding(source.to_string()))?,
        CaptureFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image).to_rgb8();
            JpegEncoder::new_with_quality(&mut bytes, jpeg_quality.clamp(1, 100))
                .encode_image(&rgb)
                .map_err(|source| AppError::encoding(source.to_string()))?;
        }
    }

    Ok(EncodedImage {
        format,
        width,
        height,
        bytes,
    })
}

use fast_image_resize as fr;
use image::RgbaImage;
use log::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::geometry::LogicalRect;
use crate::render::PageSurface;

use super::bitmap::CaptureBitmap;

const BYTES_PER_PIXEL: usize = 4;
/// Largest capture, in output pixels (8192 x 8192).
pub const MAX_OUTPUT_PIXELS: u64 = 8192 * 8192;

/// A selection already checked against the minimum size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValidSelection(LogicalRect);

impl ValidSelection {
    pub fn rect(&self) -> LogicalRect {
        self.0
    }
}

/// Cuts the pixels under a container-space rectangle out of the page
/// surfaces and stitches them into one bitmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Compositor {
    min_selection_size: f64,
    background: [u8; 4],
    output_ratio: f64,
}

impl Compositor {
    pub fn new(min_selection_size: f64, background: [u8; 4], output_ratio: f64) -> Self {
        Self {
            min_selection_size: min_selection_size.max(0.0),
            background,
            output_ratio: if output_ratio.is_finite() && output_ratio > 0.0 {
                output_ratio
            } else {
                1.0
            },
        }
    }

    pub fn min_selection_size(&self) -> f64 {
        self.min_selection_size
    }

    pub fn output_ratio(&self) -> f64 {
        self.output_ratio
    }

    /// Ignores non-positive or non-finite ratios.
    pub fn set_output_ratio(&mut self, output_ratio: f64) {
        if output_ratio.is_finite() && output_ratio > 0.0 {
            self.output_ratio = output_ratio;
        }
    }

    pub fn validate(&self, rect: LogicalRect) -> Option<ValidSelection> {
        let finite = [rect.left(), rect.top(), rect.right(), rect.bottom()]
            .iter()
            .all(|value| value.is_finite());
        (finite && rect.meets_min_size(self.min_selection_size)).then_some(ValidSelection(rect))
    }

    pub fn can_capture(&self, rect: Option<LogicalRect>) -> bool {
        rect.and_then(|rect| self.validate(rect)).is_some()
    }

    /// Output size in pixels for a selection.
    pub fn output_size(&self, selection: &ValidSelection) -> (u32, u32) {
        let rect = selection.rect();
        (
            to_pixel_edge(rect.width() * self.output_ratio).max(1),
            to_pixel_edge(rect.height() * self.output_ratio).max(1),
        )
    }

    /// Composes `selection` from whatever surfaces are given.
    ///
    /// Areas no surface covers (page gaps, pages not rendered yet) keep the
    /// background color. The result is only returned once fully assembled.
    pub fn compose<'a>(
        &self,
        selection: &ValidSelection,
        surfaces: impl IntoIterator<Item = &'a PageSurface>,
    ) -> AppResult<CaptureBitmap> {
        let rect = selection.rect();
        let (out_width, out_height) = self.output_size(selection);
        if u64::from(out_width) * u64::from(out_height) > MAX_OUTPUT_PIXELS {
            return Err(AppError::invalid_argument(format!(
                "capture of {out_width}x{out_height} px exceeds {MAX_OUTPUT_PIXELS} pixels"
            )));
        }
        let out_stride = out_width as usize * BYTES_PER_PIXEL;
        let mut out = self
            .background
            .repeat(out_width as usize * out_height as usize);

        let mut pages_hit = 0;
        for surface in surfaces {
            let Some(hit) = surface.bounds.intersection(&rect) else {
                continue;
            };
            if !surface.frame.is_consistent() {
                warn!("page {} surface has inconsistent pixels, skipping", surface.page);
                continue;
            }

            let (ratio_x, ratio_y) = surface.pixel_ratio();
            let bounds = surface.bounds;
            let src_x = pixel_span(
                hit.left() - bounds.left(),
                hit.right() - bounds.left(),
                ratio_x,
                surface.frame.width,
            );
            let src_y = pixel_span(
                hit.top() - bounds.top(),
                hit.bottom() - bounds.top(),
                ratio_y,
                surface.frame.height,
            );
            let dst_x = pixel_span(
                hit.left() - rect.left(),
                hit.right() - rect.left(),
                self.output_ratio,
                out_width,
            );
            let dst_y = pixel_span(
                hit.top() - rect.top(),
                hit.bottom() - rect.top(),
                self.output_ratio,
                out_height,
            );
            if src_x.is_empty() || src_y.is_empty() || dst_x.is_empty() || dst_y.is_empty() {
                continue;
            }

            let crop = crop_frame_region(surface, src_x, src_y);
            let crop = if (src_x.len(), src_y.len()) == (dst_x.len(), dst_y.len()) {
                crop
            } else {
                resample_nearest(crop, (src_x.len(), src_y.len()), (dst_x.len(), dst_y.len()))?
            };

            let row_bytes = dst_x.len() as usize * BYTES_PER_PIXEL;
            for (row, chunk) in crop.chunks_exact(row_bytes).enumerate() {
                let offset = (dst_y.start as usize + row) * out_stride
                    + dst_x.start as usize * BYTES_PER_PIXEL;
                out[offset..offset + row_bytes].copy_from_slice(chunk);
            }
            pages_hit += 1;
        }

        debug!("composed {out_width}x{out_height} capture from {pages_hit} page(s)");
        let image = RgbaImage::from_raw(out_width, out_height, out).ok_or(
            AppError::invalid_argument("capture pixels length does not match dimensions"),
        )?;
        Ok(CaptureBitmap::new(image, rect))
    }

    /// Validates then composes; `None` when the rectangle is too small.
    pub fn compose_rect<'a>(
        &self,
        rect: LogicalRect,
        surfaces: impl IntoIterator<Item = &'a PageSurface>,
    ) -> AppResult<Option<CaptureBitmap>> {
        let Some(selection) = self.validate(rect) else {
            return Ok(None);
        };
        self.compose(&selection, surfaces).map(Some)
    }
}

/// Half-open pixel interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PixelSpan {
    start: u32,
    end: u32,
}

impl PixelSpan {
    fn len(self) -> u32 {
        self.end - self.start
    }

    fn is_empty(self) -> bool {
        self.end <= self.start
    }
}

/// Both edges are rounded on their own, so two regions sharing a logical edge
/// land on the same pixel boundary.
fn pixel_span(start: f64, end: f64, ratio: f64, limit: u32) -> PixelSpan {
    let start = to_pixel_edge(start * ratio).min(limit);
    let end = to_pixel_edge(end * ratio).min(limit).max(start);
    PixelSpan { start, end }
}

fn to_pixel_edge(value: f64) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        return 0;
    }
    value.round().min(f64::from(u32::MAX)) as u32
}

fn crop_frame_region(surface: &PageSurface, x: PixelSpan, y: PixelSpan) -> Vec<u8> {
    let stride = surface.frame.width as usize * BYTES_PER_PIXEL;
    let row_bytes = x.len() as usize * BYTES_PER_PIXEL;
    let mut crop = Vec::with_capacity(row_bytes * y.len() as usize);
    for row in y.start..y.end {
        let offset = row as usize * stride + x.start as usize * BYTES_PER_PIXEL;
        crop.extend_from_slice(&surface.frame.pixels[offset..offset + row_bytes]);
    }
    crop
}

fn resample_nearest(pixels: Vec<u8>, src: (u32, u32), dst: (u32, u32)) -> AppResult<Vec<u8>> {
    let src = fr::images::Image::from_vec_u8(src.0, src.1, pixels, fr::PixelType::U8x4)
        .map_err(|_| AppError::invalid_argument("crop pixels length does not match dimensions"))?;
    let mut out = fr::images::Image::new(dst.0, dst.1, fr::PixelType::U8x4);
    let mut resizer = fr::Resizer::new();
    let options = fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Nearest);

    resizer
        .resize(&src, &mut out, &options)
        .map_err(|_| AppError::unsupported("failed to resample page crop"))?;
    Ok(out.into_vec())
}

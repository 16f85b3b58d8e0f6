use crate::backend::RgbaFrame;
use crate::geometry::LogicalRect;

/// One rendered page: native pixels plus where they are displayed.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSurface {
    pub page: usize,
    pub frame: RgbaFrame,
    /// Display bounds in container (logical) coordinates.
    pub bounds: LogicalRect,
}

impl PageSurface {
    pub fn new(page: usize, frame: RgbaFrame, bounds: LogicalRect) -> Self {
        Self {
            page,
            frame,
            bounds,
        }
    }

    /// Native pixels per logical unit, per axis.
    ///
    /// Derived from the actual bitmap size so rounding in the rasterizer
    /// and hi-DPI rendering are both accounted for.
    pub fn pixel_ratio(&self) -> (f64, f64) {
        let ratio = |pixels: u32, logical: f64| {
            if logical > 0.0 {
                f64::from(pixels) / logical
            } else {
                0.0
            }
        };
        (
            ratio(self.frame.width, self.bounds.width()),
            ratio(self.frame.height, self.bounds.height()),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceSlot {
    Pending,
    Ready(PageSurface),
    Failed,
}

/// All page surfaces of one (document, scale) generation.
///
/// A new load or rescale replaces the whole set; surfaces are never resized in
/// place.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SurfaceSet {
    generation: u64,
    render_scale: f32,
    slots: Vec<SurfaceSlot>,
}

impl SurfaceSet {
    pub fn new(generation: u64, render_scale: f32, page_count: usize) -> Self {
        Self {
            generation,
            render_scale,
            slots: vec![SurfaceSlot::Pending; page_count],
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn render_scale(&self) -> f32 {
        self.render_scale
    }

    pub fn page_count(&self) -> usize {
        self.slots.len()
    }

    pub fn slot(&self, page: usize) -> Option<&SurfaceSlot> {
        self.slots.get(page)
    }

    pub fn surface(&self, page: usize) -> Option<&PageSurface> {
        match self.slots.get(page) {
            Some(SurfaceSlot::Ready(surface)) => Some(surface),
            _ => None,
        }
    }

    pub fn ready(&self) -> impl Iterator<Item = &PageSurface> {
        self.slots.iter().filter_map(|slot| match slot {
            SurfaceSlot::Ready(surface) => Some(surface),
            _ => None,
        })
    }

    /// Pages that have finished, successfully or not.
    pub fn settled_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| !matches!(slot, SurfaceSlot::Pending))
            .count()
    }

    pub fn ready_count(&self) -> usize {
        self.ready().count()
    }

    pub fn first_pending(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, SurfaceSlot::Pending))
    }

    pub fn is_complete(&self) -> bool {
        self.first_pending().is_none()
    }

    pub(crate) fn set(&mut self, page: usize, slot: SurfaceSlot) {
        if let Some(existing) = self.slots.get_mut(page) {
            *existing = slot;
        }
    }
}

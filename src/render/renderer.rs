use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::backend::{DocumentLoader, DocumentSource, PdfBackend, RgbaFrame};
use crate::error::{AppError, AppResult};
use crate::perf::PerfStats;

use super::layout::{DEFAULT_PAGE_SIZE_PT, PageLayout};
use super::scale::{quantize_scale, scale_eq};
use super::surface::{PageSurface, SurfaceSet, SurfaceSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageOutcome {
    Rendered,
    Failed,
}

/// Reported after each page settles during a sequential render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderProgress {
    pub generation: u64,
    pub page: usize,
    pub outcome: PageOutcome,
    pub rendered: usize,
    pub total: usize,
}

/// Loads one document and draws its pages, one surface per page.
///
/// Layout uses `zoom`; rasterization uses `zoom * pixel_ratio`, so on hi-DPI
/// displays each surface has more native pixels than logical units.
pub struct PageRenderer {
    loader: Arc<dyn DocumentLoader>,
    doc: Option<Box<dyn PdfBackend>>,
    page_sizes_pt: Vec<(f32, f32)>,
    layout: PageLayout,
    surfaces: SurfaceSet,
    zoom: f32,
    pixel_ratio: f32,
    page_gap: f64,
    next_generation: u64,
    stats: PerfStats,
}

impl PageRenderer {
    pub fn new(loader: Arc<dyn DocumentLoader>, zoom: f32, pixel_ratio: f32, page_gap: f64) -> Self {
        Self {
            loader,
            doc: None,
            page_sizes_pt: Vec::new(),
            layout: PageLayout::default(),
            surfaces: SurfaceSet::default(),
            zoom: quantize_scale(zoom),
            pixel_ratio: if pixel_ratio.is_finite() && pixel_ratio > 0.0 {
                pixel_ratio
            } else {
                1.0
            },
            page_gap: page_gap.max(0.0),
            next_generation: 1,
            stats: PerfStats::default(),
        }
    }

    /// Opens `source` and replaces the current document. Returns the page count.
    pub fn load(&mut self, source: &DocumentSource) -> AppResult<usize> {
        let doc = self.loader.open(source)?;
        Ok(self.install(doc))
    }

    /// Adopts an already opened document, dropping every prior surface.
    pub fn install(&mut self, doc: Box<dyn PdfBackend>) -> usize {
        let page_count = doc.page_count();
        self.page_sizes_pt = (0..page_count)
            .map(|page| match doc.page_dimensions(page) {
                Ok(size) if size.0 > 0.0 && size.1 > 0.0 => size,
                Ok(_) | Err(_) => {
                    warn!("page {page} has no usable size, assuming {DEFAULT_PAGE_SIZE_PT:?}");
                    DEFAULT_PAGE_SIZE_PT
                }
            })
            .collect();
        info!(
            "loaded {} ({page_count} pages)",
            doc.source_name()
        );
        self.doc = Some(doc);
        self.invalidate();
        page_count
    }

    pub fn unload(&mut self) {
        self.doc = None;
        self.page_sizes_pt.clear();
        self.invalidate();
    }

    pub fn is_loaded(&self) -> bool {
        self.doc.is_some()
    }

    pub fn page_count(&self) -> usize {
        self.page_sizes_pt.len()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    pub fn render_scale(&self) -> f32 {
        self.zoom * self.pixel_ratio
    }

    pub fn layout(&self) -> &PageLayout {
        &self.layout
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        &self.surfaces
    }

    pub fn stats(&self) -> &PerfStats {
        &self.stats
    }

    /// Pages settled (rendered or failed) in the current generation.
    pub fn rendered_pages(&self) -> usize {
        self.surfaces.settled_count()
    }

    /// Changes the zoom. Any real change discards every surface; existing
    /// bitmaps are never rescaled. Returns whether anything changed.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let zoom = quantize_scale(zoom);
        if scale_eq(zoom, self.zoom) {
            return false;
        }
        debug!("zoom {} -> {zoom}", self.zoom);
        self.zoom = zoom;
        self.invalidate();
        true
    }

    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) -> bool {
        if !pixel_ratio.is_finite() || pixel_ratio <= 0.0 || scale_eq(pixel_ratio, self.pixel_ratio)
        {
            return false;
        }
        self.pixel_ratio = pixel_ratio;
        self.invalidate();
        true
    }

    /// Rasterizes one page at an explicit scale without touching the surfaces.
    pub fn render_page(&self, page: usize, scale: f32) -> AppResult<RgbaFrame> {
        let doc = self
            .doc
            .as_ref()
            .ok_or(AppError::invalid_argument("no document is loaded"))?;
        if page >= self.page_count() {
            return Err(AppError::invalid_argument("page index is out of range"));
        }
        if !scale.is_finite() || scale <= 0.0 {
            return Err(AppError::invalid_argument(
                "scale must be a positive finite value",
            ));
        }

        doc.render_page(page, scale).map_err(|err| {
            if err.is_page_local() {
                err
            } else {
                AppError::pdf_render(page, err)
            }
        })
    }

    /// Renders the lowest pending page of the current generation.
    ///
    /// A page that fails to render is left blank and the pass continues.
    pub fn render_next(&mut self) -> Option<RenderProgress> {
        let page = self.surfaces.first_pending()?;
        let bounds = self.layout.page_bounds(page)?;

        let started = Instant::now();
        let (slot, outcome) = match self.render_page(page, self.render_scale()) {
            Ok(frame) => {
                self.stats.record_render(started.elapsed());
                debug!(
                    "rendered page {page} at {}x{} px",
                    frame.width, frame.height
                );
                (
                    SurfaceSlot::Ready(PageSurface::new(page, frame, bounds)),
                    PageOutcome::Rendered,
                )
            }
            Err(err) => {
                self.stats.add_failed_page();
                warn!("page {page} left blank: {err}");
                (SurfaceSlot::Failed, PageOutcome::Failed)
            }
        };
        self.surfaces.set(page, slot);

        Some(RenderProgress {
            generation: self.surfaces.generation(),
            page,
            outcome,
            rendered: self.surfaces.settled_count(),
            total: self.surfaces.page_count(),
        })
    }

    /// Renders every pending page in ascending order.
    pub fn render_all(&mut self, mut on_progress: impl FnMut(RenderProgress)) -> usize {
        let mut settled = 0;
        while let Some(progress) = self.render_next() {
            settled += 1;
            on_progress(progress);
        }
        settled
    }

    fn invalidate(&mut self) {
        self.stats
            .add_invalidated_surfaces(self.surfaces.ready_count());
        self.layout = PageLayout::stack(&self.page_sizes_pt, self.zoom, self.page_gap);
        self.surfaces = SurfaceSet::new(
            self.next_generation,
            self.render_scale(),
            self.page_sizes_pt.len(),
        );
        self.next_generation += 1;
    }
}

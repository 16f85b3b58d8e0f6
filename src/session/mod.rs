use std::sync::Arc;
use std::time::Instant;

use log::{debug, info, warn};

use crate::backend::{DocumentLoader, DocumentSource, PdfBackend, join_open, open_in_background};
use crate::capture::{AnalysisClient, CaptureAdapter, CategoryLabel, Submission};
use crate::compose::{CaptureBitmap, Compositor};
use crate::config::Config;
use crate::error::AppResult;
use crate::geometry::{LogicalRect, Point};
use crate::gesture::{GestureOutcome, GestureTracker, PointerEvent, TrackedRegion};
use crate::perf::PerfStats;
use crate::render::{PageLayout, PageRenderer, RenderProgress, SurfaceSet, ZoomPolicy};
use crate::token::{RequestToken, TokenCounter};

#[cfg(test)]
mod tests;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded { page_count: usize },
    /// A newer load was started before this one finished; its result was
    /// dropped.
    Superseded,
}

/// One viewer instance: document, zoom, selection mode and the capture
/// pipeline. Sessions share nothing, so several can coexist.
pub struct ViewerSession {
    renderer: PageRenderer,
    tracker: GestureTracker,
    compositor: Compositor,
    adapter: CaptureAdapter,
    zoom_policy: ZoomPolicy,
    loads: TokenCounter,
    loader: Arc<dyn DocumentLoader>,
    default_label: CategoryLabel,
}

impl ViewerSession {
    pub fn new(
        config: &Config,
        loader: Arc<dyn DocumentLoader>,
        client: Arc<dyn AnalysisClient>,
        region: TrackedRegion,
    ) -> AppResult<Self> {
        let render = &config.render;
        let capture = &config.capture;
        let zoom_policy = ZoomPolicy {
            min: render.min_zoom,
            max: render.max_zoom,
            step: render.zoom_step,
        };

        Ok(Self {
            renderer: PageRenderer::new(
                Arc::clone(&loader),
                zoom_policy.clamp(render.initial_zoom),
                render.device_pixel_ratio,
                render.page_gap,
            ),
            tracker: GestureTracker::new(region),
            compositor: Compositor::new(
                capture.min_selection_size,
                capture.background_rgba()?,
                f64::from(render.device_pixel_ratio),
            ),
            adapter: CaptureAdapter::from_config(client, capture),
            zoom_policy,
            loads: TokenCounter::default(),
            loader,
            default_label: CategoryLabel::new(&capture.default_label)?,
        })
    }

    /// Loads synchronously. Returns the page count.
    pub fn load(&mut self, source: &DocumentSource) -> AppResult<usize> {
        let token = self.begin_load();
        let opened = self.loader.open(source);
        match self.complete_load(token, opened)? {
            LoadStatus::Loaded { page_count } => Ok(page_count),
            LoadStatus::Superseded => Ok(self.renderer.page_count()),
        }
    }

    /// Parses the document on the blocking pool, then installs it unless a
    /// newer load started meanwhile.
    pub async fn load_in_background(&mut self, source: DocumentSource) -> AppResult<LoadStatus> {
        let token = self.begin_load();
        let name = source.display_name();
        let handle = open_in_background(Arc::clone(&self.loader), source);
        let opened = join_open(handle, &name).await;
        self.complete_load(token, opened)
    }

    /// Starts a load; any load started earlier becomes stale.
    pub fn begin_load(&self) -> RequestToken {
        self.loads.next()
    }

    pub fn complete_load(
        &mut self,
        token: RequestToken,
        opened: AppResult<Box<dyn PdfBackend>>,
    ) -> AppResult<LoadStatus> {
        if !self.loads.is_latest(token) {
            warn!("dropping stale load result {}", token.value());
            return Ok(LoadStatus::Superseded);
        }

        let doc = opened?;
        let page_count = self.renderer.install(doc);
        self.tracker.clear();
        Ok(LoadStatus::Loaded { page_count })
    }

    pub fn page_count(&self) -> usize {
        self.renderer.page_count()
    }

    pub fn rendered_pages(&self) -> usize {
        self.renderer.rendered_pages()
    }

    pub fn layout(&self) -> &PageLayout {
        self.renderer.layout()
    }

    pub fn surfaces(&self) -> &SurfaceSet {
        self.renderer.surfaces()
    }

    pub fn render_stats(&self) -> &PerfStats {
        self.renderer.stats()
    }

    pub fn render_next(&mut self) -> Option<RenderProgress> {
        self.renderer.render_next()
    }

    pub fn render_all(&mut self, on_progress: impl FnMut(RenderProgress)) -> usize {
        self.renderer.render_all(on_progress)
    }

    pub fn zoom(&self) -> f32 {
        self.renderer.zoom()
    }

    pub fn zoom_in(&mut self) -> bool {
        self.set_zoom(self.zoom_policy.zoom_in(self.zoom()))
    }

    pub fn zoom_out(&mut self) -> bool {
        self.set_zoom(self.zoom_policy.zoom_out(self.zoom()))
    }

    /// Rescales every page. A drawn rectangle no longer matches the new
    /// layout, so it is dropped along with the surfaces.
    pub fn set_zoom(&mut self, zoom: f32) -> bool {
        let changed = self.renderer.set_zoom(self.zoom_policy.clamp(zoom));
        if changed {
            self.tracker.clear();
        }
        changed
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.renderer.pixel_ratio()
    }

    /// Moves the session to a display with another device pixel ratio.
    /// Surfaces are re-rendered, later captures use the new ratio and any
    /// selection is dropped.
    pub fn set_pixel_ratio(&mut self, pixel_ratio: f32) -> bool {
        let changed = self.renderer.set_pixel_ratio(pixel_ratio);
        if changed {
            self.compositor
                .set_output_ratio(f64::from(self.renderer.pixel_ratio()));
            self.tracker.clear();
        }
        changed
    }

    pub fn selection_mode(&self) -> bool {
        self.tracker.selection_mode()
    }

    /// Returns `true` if a drag in progress was aborted.
    pub fn set_selection_mode(&mut self, enabled: bool) -> bool {
        self.tracker.set_selection_mode(enabled)
    }

    /// Returns the new mode.
    pub fn toggle_selection_mode(&mut self) -> bool {
        let enabled = !self.tracker.selection_mode();
        self.tracker.set_selection_mode(enabled);
        enabled
    }

    pub fn set_region(&mut self, region: TrackedRegion) {
        self.tracker.set_region(region);
    }

    pub fn set_scroll_offset(&mut self, scroll: Point) {
        self.tracker.set_scroll_offset(scroll);
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) -> GestureOutcome {
        self.tracker.handle(event)
    }

    pub fn is_dragging(&self) -> bool {
        self.tracker.is_dragging()
    }

    /// The rectangle being drawn, for overlay display.
    pub fn live_selection(&self) -> Option<LogicalRect> {
        self.tracker.selection()
    }

    /// The completed selection, if any.
    pub fn selection(&self) -> Option<LogicalRect> {
        self.tracker.finished_selection()
    }

    /// Whether the capture and submit controls should be enabled.
    pub fn can_capture(&self) -> bool {
        self.compositor.can_capture(self.selection())
    }

    pub fn default_label(&self) -> &CategoryLabel {
        &self.default_label
    }

    /// Composes the completed selection. `None` when capture is disabled.
    pub fn capture(&self) -> AppResult<Option<CaptureBitmap>> {
        let Some(rect) = self.selection() else {
            return Ok(None);
        };
        let started = Instant::now();
        let bitmap = self
            .compositor
            .compose_rect(rect, self.renderer.surfaces().ready())?;
        if let Some(bitmap) = &bitmap {
            debug!(
                "captured {}x{} in {:.2} ms",
                bitmap.width(),
                bitmap.height(),
                started.elapsed().as_secs_f64() * 1000.0
            );
        }
        Ok(bitmap)
    }

    /// Captures and submits. `Ok(None)` means capture is disabled and the
    /// collaborator was not called.
    pub async fn submit(&self, label: &CategoryLabel) -> AppResult<Option<Submission>> {
        let Some(bitmap) = self.capture()? else {
            debug!("submit ignored: no valid selection");
            return Ok(None);
        };
        Ok(Some(self.adapter.submit(bitmap, label).await))
    }

    /// Whether `submission` is the newest one from this session.
    pub fn is_current(&self, submission: &Submission) -> bool {
        self.adapter.is_latest(submission.token)
    }

    /// Ends the session, releasing the document and every surface.
    pub fn dispose(mut self) {
        self.tracker.set_selection_mode(false);
        self.renderer.unload();
        info!("viewer session disposed");
    }
}

use log::debug;

use crate::geometry::{LogicalRect, Point};

use super::events::{GestureOutcome, PointerEvent, PointerPhase, PointerSource};

/// The scrollable element that hosts the stacked pages, in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackedRegion {
    pub origin: Point,
    pub width: f64,
    pub height: f64,
    /// How far the container content is scrolled.
    pub scroll: Point,
}

impl TrackedRegion {
    pub fn new(origin: Point, width: f64, height: f64) -> Self {
        Self {
            origin,
            width,
            height,
            scroll: Point::default(),
        }
    }

    /// A region at the client origin, large enough for everything.
    pub fn unbounded() -> Self {
        Self::new(Point::default(), f64::INFINITY, f64::INFINITY)
    }

    pub fn contains_client(&self, point: Point) -> bool {
        point.x >= self.origin.x
            && point.y >= self.origin.y
            && point.x < self.origin.x + self.width
            && point.y < self.origin.y + self.height
    }

    pub fn to_container(&self, point: Point) -> Point {
        Point::new(
            point.x - self.origin.x + self.scroll.x,
            point.y - self.origin.y + self.scroll.y,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragState {
    Idle,
    Dragging { source: PointerSource },
}

/// Folds mouse and touch events into one `Idle -> Dragging -> Idle` machine.
///
/// Points are stored in container coordinates, so a selection may span
/// several pages.
#[derive(Debug, Clone)]
pub struct GestureTracker {
    region: TrackedRegion,
    selection_mode: bool,
    state: DragState,
    anchor: Option<Point>,
    current: Option<Point>,
}

impl GestureTracker {
    pub fn new(region: TrackedRegion) -> Self {
        Self {
            region,
            selection_mode: false,
            state: DragState::Idle,
            anchor: None,
            current: None,
        }
    }

    pub fn region(&self) -> TrackedRegion {
        self.region
    }

    pub fn set_region(&mut self, region: TrackedRegion) {
        self.region = region;
    }

    pub fn set_scroll_offset(&mut self, scroll: Point) {
        self.region.scroll = scroll;
    }

    pub fn selection_mode(&self) -> bool {
        self.selection_mode
    }

    /// Entering or leaving selection mode always drops the current rectangle.
    /// Returns `true` if a drag in progress was aborted.
    pub fn set_selection_mode(&mut self, enabled: bool) -> bool {
        let aborted = self.is_dragging();
        if aborted {
            debug!("selection mode changed mid-drag, aborting");
        }
        self.selection_mode = enabled;
        self.clear();
        aborted
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.state, DragState::Dragging { .. })
    }

    /// The rectangle as currently drawn, including while dragging.
    pub fn selection(&self) -> Option<LogicalRect> {
        Some(LogicalRect::from_points(self.anchor?, self.current?))
    }

    /// The rectangle of the last completed drag.
    pub fn finished_selection(&self) -> Option<LogicalRect> {
        if self.is_dragging() {
            return None;
        }
        self.selection()
    }

    pub fn clear(&mut self) {
        self.state = DragState::Idle;
        self.anchor = None;
        self.current = None;
    }

    pub fn handle(&mut self, event: PointerEvent) -> GestureOutcome {
        let point = self.region.to_container(event.position);
        match (self.state, event.phase) {
            (DragState::Idle, PointerPhase::Start) => {
                if !self.selection_mode || !self.region.contains_client(event.position) {
                    return GestureOutcome::Ignored;
                }
                self.state = DragState::Dragging {
                    source: event.source,
                };
                self.anchor = Some(point);
                self.current = Some(point);
                debug!("{:?} drag started at ({}, {})", event.source, point.x, point.y);
                GestureOutcome::Started
            }
            (DragState::Dragging { source }, PointerPhase::Move) if source == event.source => {
                self.current = Some(point);
                self.selection()
                    .map_or(GestureOutcome::Ignored, GestureOutcome::Updated)
            }
            (DragState::Dragging { source }, PointerPhase::End) if source == event.source => {
                self.current = Some(point);
                self.state = DragState::Idle;
                match self.selection() {
                    Some(rect) => {
                        debug!(
                            "drag finished: {}x{} at ({}, {})",
                            rect.width(),
                            rect.height(),
                            rect.left(),
                            rect.top()
                        );
                        GestureOutcome::Finished(rect)
                    }
                    None => GestureOutcome::Ignored,
                }
            }
            (DragState::Dragging { source }, PointerPhase::Cancel) if source == event.source => {
                self.clear();
                GestureOutcome::Aborted
            }
            _ => GestureOutcome::Ignored,
        }
    }
}

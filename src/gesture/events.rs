use crate::geometry::{LogicalRect, Point};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointerSource {
    Mouse,
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerPhase {
    Start,
    Move,
    End,
    /// The platform took the gesture away (e.g. a touch cancel).
    Cancel,
}

/// A raw pointer event in client (viewport) coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub source: PointerSource,
    pub phase: PointerPhase,
    pub position: Point,
}

impl PointerEvent {
    pub fn new(source: PointerSource, phase: PointerPhase, x: f64, y: f64) -> Self {
        Self {
            source,
            phase,
            position: Point::new(x, y),
        }
    }

    pub fn mouse(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self::new(PointerSource::Mouse, phase, x, y)
    }

    pub fn touch(phase: PointerPhase, x: f64, y: f64) -> Self {
        Self::new(PointerSource::Touch, phase, x, y)
    }
}

/// What a single event did to the tracker.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureOutcome {
    Ignored,
    Started,
    Updated(LogicalRect),
    Finished(LogicalRect),
    Aborted,
}

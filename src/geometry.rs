/// A point in logical (CSS-pixel-like) units.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

/// Axis-aligned rectangle in logical units.
///
/// Always normalized: `x0 <= x1` and `y0 <= y1`. Constructors enforce this, so
/// width and height are never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalRect {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
}

impl LogicalRect {
    pub fn from_points(a: Point, b: Point) -> Self {
        Self {
            x0: a.x.min(b.x),
            y0: a.y.min(b.y),
            x1: a.x.max(b.x),
            y1: a.y.max(b.y),
        }
    }

    pub fn from_origin_size(origin: Point, width: f64, height: f64) -> Self {
        Self::from_points(
            origin,
            Point::new(origin.x + width.max(0.0), origin.y + height.max(0.0)),
        )
    }

    pub fn left(&self) -> f64 {
        self.x0
    }

    pub fn top(&self) -> f64 {
        self.y0
    }

    pub fn right(&self) -> f64 {
        self.x1
    }

    pub fn bottom(&self) -> f64 {
        self.y1
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x0 && point.x < self.x1 && point.y >= self.y0 && point.y < self.y1
    }

    /// Both dimensions must reach `min_size`; a thin sliver in either axis
    /// does not count as a selection.
    pub fn meets_min_size(&self, min_size: f64) -> bool {
        self.width() >= min_size && self.height() >= min_size
    }

    pub fn intersection(&self, other: &LogicalRect) -> Option<LogicalRect> {
        let rect = LogicalRect {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (!rect.is_empty()).then_some(rect)
    }
}

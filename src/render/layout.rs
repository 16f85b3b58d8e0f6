use crate::geometry::{LogicalRect, Point};

/// Page size used when a page's dimensions cannot be read (US Letter).
pub(crate) const DEFAULT_PAGE_SIZE_PT: (f32, f32) = (612.0, 792.0);

/// Vertical stack of pages in one logical coordinate space.
///
/// Page `i` occupies `intrinsic size * zoom` logical units, horizontally
/// centered on the widest page. Consecutive pages are separated by `gap`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PageLayout {
    pages: Vec<LogicalRect>,
    width: f64,
    height: f64,
}

impl PageLayout {
    pub fn stack(page_sizes_pt: &[(f32, f32)], zoom: f32, gap: f64) -> Self {
        let zoom = f64::from(zoom);
        let gap = gap.max(0.0);
        let sizes: Vec<(f64, f64)> = page_sizes_pt
            .iter()
            .map(|&(width, height)| (f64::from(width) * zoom, f64::from(height) * zoom))
            .collect();
        let width = sizes.iter().map(|&(w, _)| w).fold(0.0, f64::max);

        let mut pages = Vec::with_capacity(sizes.len());
        let mut y = 0.0;
        for (index, &(page_width, page_height)) in sizes.iter().enumerate() {
            if index > 0 {
                y += gap;
            }
            let x = (width - page_width) / 2.0;
            pages.push(LogicalRect::from_origin_size(
                Point::new(x, y),
                page_width,
                page_height,
            ));
            y += page_height;
        }

        Self {
            pages,
            width,
            height: y,
        }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn page_bounds(&self, page: usize) -> Option<LogicalRect> {
        self.pages.get(page).copied()
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn page_at(&self, point: Point) -> Option<usize> {
        self.pages.iter().position(|bounds| bounds.contains(point))
    }

    /// Pages whose bounds overlap `rect`, in ascending order.
    pub fn pages_overlapping(&self, rect: &LogicalRect) -> Vec<usize> {
        self.pages
            .iter()
            .enumerate()
            .filter(|(_, bounds)| bounds.intersection(rect).is_some())
            .map(|(index, _)| index)
            .collect()
    }
}

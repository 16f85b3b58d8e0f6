pub(crate) const SCALE_QUANTUM: f32 = 0.05;

pub(crate) fn scale_eq(left: f32, right: f32) -> bool {
    (left - right).abs() <= 0.0005
}

pub(crate) fn quantize_scale(scale: f32) -> f32 {
    if !scale.is_finite() || scale <= 0.0 {
        return SCALE_QUANTUM;
    }

    ((scale / SCALE_QUANTUM).round() * SCALE_QUANTUM).max(SCALE_QUANTUM)
}

/// Zoom limits and step shared by the zoom in/out controls.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomPolicy {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl ZoomPolicy {
    /// Limits are snapped to the quantum too, so the result is always a
    /// scale the renderer keeps as-is.
    pub fn clamp(&self, zoom: f32) -> f32 {
        let min = quantize_scale(self.min);
        let max = quantize_scale(self.max).max(min);
        quantize_scale(zoom).clamp(min, max)
    }

    pub fn zoom_in(&self, zoom: f32) -> f32 {
        self.clamp(zoom * self.step)
    }

    pub fn zoom_out(&self, zoom: f32) -> f32 {
        self.clamp(zoom / self.step)
    }
}

impl Default for ZoomPolicy {
    fn default() -> Self {
        Self {
            min: 0.25,
            max: 4.0,
            step: 1.25,
        }
    }
}

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PerfStats {
    pub render_ms: f64,
    pub render_samples: u64,
    pub failed_pages: usize,
    pub invalidated_surfaces: usize,
}

impl PerfStats {
    pub fn record_render(&mut self, elapsed: Duration) {
        self.render_ms = elapsed.as_secs_f64() * 1000.0;
        self.render_samples += 1;
    }

    pub fn add_failed_page(&mut self) {
        self.failed_pages += 1;
    }

    pub fn add_invalidated_surfaces(&mut self, count: usize) {
        self.invalidated_surfaces += count;
    }
}

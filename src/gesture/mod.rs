mod events;
mod tracker;

pub use events::{GestureOutcome, PointerEvent, PointerPhase, PointerSource};
pub use tracker::{GestureTracker, TrackedRegion};

mod layout;
mod renderer;
mod scale;
mod surface;


pub use layout::PageLayout;
pub use renderer::{PageOutcome, PageRenderer, RenderProgress};
pub use scale::ZoomPolicy;
pub use surface::{PageSurface, SurfaceSet, SurfaceSlot};

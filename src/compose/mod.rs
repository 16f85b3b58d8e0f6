mod bitmap;
mod compositor;


pub use bitmap::CaptureBitmap;
pub use compositor::{Compositor, MAX_OUTPUT_PIXELS, ValidSelection};

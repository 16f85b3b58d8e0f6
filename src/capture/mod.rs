mod adapter;
mod client;
mod encode;
mod sink;

pub use adapter::{CaptureAdapter, Submission};
pub use client::{AnalysisClient, AnalysisResponse, CategoryLabel};
pub use encode::{EncodedImage, encode_bitmap};
pub use sink::FileSinkClient;

pub mod backend;
pub mod capture;
pub mod compose;
pub mod config;
pub mod error;
pub mod geometry;
pub mod gesture;
pub mod logging;
pub mod perf;
pub mod render;
pub mod session;
pub mod token;

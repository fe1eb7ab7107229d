pub mod rasterizer;
pub mod viewport;

pub use rasterizer::Rasterizer;
pub use viewport::{depth_to_sample, viewport_to_screenspace, ScreenPoint, Viewport};

//! A small software rasterizer: vertices in normalized viewport space go in,
//! depth-tested and color-interpolated pixels come out in an off-screen RGBA
//! buffer that a presenter puts on screen.
//!
//! The rasterizer is single threaded. Draw calls are applied in the order
//! they are issued and the depth test keeps the stored sample on ties, so the
//! same calls always produce the same buffer.

pub mod app;
pub mod config;
pub mod core;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod renderers;

pub use crate::core::{Color, Depth, Mesh, Model, Texture, Vertex};
pub use config::{create_clap_command, Config, DisplayTarget};
pub use error::{RasterError, Result};
pub use metrics::Metrics;
pub use pipeline::{Rasterizer, ScreenPoint, Viewport};

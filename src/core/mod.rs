pub mod color;
pub mod math;
pub mod mesh;
pub mod texture;
pub mod vertex;

pub use color::Color;
pub use mesh::{Mesh, Model};
pub use texture::{Depth, PixelFormat, Texture};
pub use vertex::Vertex;

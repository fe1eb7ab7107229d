use glam::{Vec2, Vec3};

use super::Color;

/// A vertex in normalized viewport space: `x`/`y` in `[-1, 1]`, `z` between
/// the rasterizer's clip planes.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub color: Color,
}

impl Vertex {
    pub fn new(position: Vec3, color: Color) -> Self {
        Self {
            position,
            color,
            ..Default::default()
        }
    }

    pub fn lerp(a: &Vertex, b: &Vertex, t: f32) -> Vertex {
        Vertex {
            position: a.position.lerp(b.position, t),
            normal: a.normal.lerp(b.normal, t),
            uv: a.uv.lerp(b.uv, t),
            color: a.color.lerp(b.color, t),
        }
    }
}

use std::ops::Range;

use glam::Vec3;
use log::{debug, warn};

use super::viewport::{depth_to_sample, viewport_to_screenspace, ScreenPoint, Viewport};
use crate::core::math::lerp_f32;
use crate::core::{Color, Depth, Mesh, Texture, Vertex};
use crate::error::{RasterError, Result};

/// Owns the color and depth buffers and draws into them.
///
/// Every call runs to completion and is applied in issue order. All drawing
/// takes `&mut self`, so the buffers are only ever touched by one thread at
/// a time; sharing a rasterizer between threads needs external locking and
/// is not supported.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    color_buffer: Texture<Color>,
    depth_buffer: Texture<Depth>,
    viewport: Viewport,
}

impl Rasterizer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(RasterError::ZeroSizedBuffer { width, height });
        }
        let mut rasterizer = Self {
            color_buffer: Texture::try_new(width, height)?,
            depth_buffer: Texture::try_new(width, height)?,
            viewport: Viewport::default(),
        };
        rasterizer.clear();
        debug!("created {}x{} rasterizer", width, height);
        Ok(rasterizer)
    }

    pub fn with_viewport(width: usize, height: usize, viewport: Viewport) -> Result<Self> {
        let mut rasterizer = Self::new(width, height)?;
        rasterizer.viewport = viewport;
        Ok(rasterizer)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.color_buffer.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.color_buffer.height()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn near_clip(&self) -> f32 {
        self.viewport.near_clip()
    }

    pub fn far_clip(&self) -> f32 {
        self.viewport.far_clip()
    }

    /// Replaces the depth mapping range. On error the current planes are kept.
    pub fn set_clip_planes(&mut self, near_clip: f32, far_clip: f32) -> Result<()> {
        match Viewport::new(near_clip, far_clip) {
            Ok(viewport) => {
                self.viewport = viewport;
                Ok(())
            }
            Err(e) => {
                warn!("rejected clip planes: {}", e);
                Err(e)
            }
        }
    }

    pub fn color_buffer(&self) -> &Texture<Color> {
        &self.color_buffer
    }

    pub fn depth_buffer(&self) -> &Texture<Depth> {
        &self.depth_buffer
    }

    #[inline]
    pub fn viewport_to_screenspace(&self, position: Vec3) -> ScreenPoint {
        viewport_to_screenspace(position, self.width(), self.height(), &self.viewport)
    }

    /// Opaque black color, far sentinel depth.
    pub fn clear(&mut self) {
        self.color_buffer.fill(Color::BLACK);
        self.depth_buffer.fill(Depth::MAX);
    }

    /// Writes the vertex color at its pixel. No depth test, the depth buffer
    /// is left untouched.
    pub fn draw_vertex(&mut self, v: Vertex) {
        let s = self.viewport_to_screenspace(v.position);
        self.color_buffer.set_pixel(s.x, s.y, v.color);
    }

    /// Draws a depth-tested line from `a` towards `b`.
    ///
    /// The longer screen axis drives `max(|dx|, |dy|)` steps over `[0, steps)`,
    /// so the pixel of `b` itself is not drawn unless the segment collapses to
    /// a single pixel, in which case exactly that pixel is drawn. Color is
    /// darkened by each endpoint's depth before being interpolated.
    ///
    /// Only the steps whose major-axis coordinate falls inside the buffer are
    /// visited, so the work never exceeds the buffer's width or height however
    /// far the endpoints lie off screen.
    pub fn draw_line(&mut self, a: Vertex, b: Vertex) {
        let a_s = self.viewport_to_screenspace(a.position);
        let b_s = self.viewport_to_screenspace(b.position);

        let a_color = a.color * (1.0 - a_s.depth);
        let b_color = b.color * (1.0 - b_s.depth);

        // saturated endpoints can sit at i64::MIN and i64::MAX
        let (ax, ay) = (a_s.x as i128, a_s.y as i128);
        let delta_x = b_s.x as i128 - ax;
        let delta_y = b_s.y as i128 - ay;

        if delta_x == 0 && delta_y == 0 {
            self.plot(a_s.x, a_s.y, a_s.depth, a_color);
            return;
        }

        let step_x = delta_x.signum();
        let step_y = delta_y.signum();
        let steps = delta_x.abs().max(delta_y.abs());

        let fragment = |i: i128| -> (f32, Color) {
            let t = i as f32 / steps as f32;
            (lerp_f32(a_s.depth, b_s.depth, t), a_color.lerp(b_color, t))
        };

        if delta_x.abs() >= delta_y.abs() {
            let slope = delta_y as f32 / delta_x as f32;
            for i in visible_steps(ax, step_x, steps, self.width()) {
                let (depth, color) = fragment(i);
                let offset = step_x * i;
                // axis aligned lines have a zero slope
                let y = ay + (slope * offset as f32).round() as i128;
                self.plot(narrow(ax + offset), narrow(y), depth, color);
            }
        } else {
            let slope = delta_x as f32 / delta_y as f32;
            for i in visible_steps(ay, step_y, steps, self.height()) {
                let (depth, color) = fragment(i);
                let offset = step_y * i;
                let x = ax + (slope * offset as f32).round() as i128;
                self.plot(narrow(x), narrow(ay + offset), depth, color);
            }
        }
    }

    /// Draws every triangle edge of `mesh` with [`Rasterizer::draw_line`].
    pub fn draw_mesh_wireframe(&mut self, mesh: &Mesh) {
        for (a, b) in mesh.edges() {
            self.draw_line(a, b);
        }
    }

    pub fn draw_mesh_vertices(&mut self, mesh: &Mesh) {
        for v in &mesh.vertices {
            self.draw_vertex(*v);
        }
    }

    /// Depth-tested write. The stored sample wins ties.
    #[inline]
    fn plot(&mut self, x: i64, y: i64, depth: f32, color: Color) {
        let sample = depth_to_sample(depth);
        match self.depth_buffer.get_pixel(x, y) {
            Some(current) if current <= sample => {}
            Some(_) => {
                self.depth_buffer.set_pixel(x, y, sample);
                self.color_buffer.set_pixel(x, y, color);
            }
            None => {}
        }
    }
}

/// The part of `[0, steps)` for which `start + step * i` lies in `[0, len)`.
/// `step` is `1` or `-1`.
fn visible_steps(start: i128, step: i128, steps: i128, len: usize) -> Range<i128> {
    let len = len as i128;
    let (first, end) = if step > 0 {
        (-start, len - start)
    } else {
        (start - len + 1, start + 1)
    };
    first.max(0)..end.min(steps)
}

/// Off-buffer coordinates only need to stay off-buffer.
#[inline]
fn narrow(v: i128) -> i64 {
    v.clamp(i64::MIN as i128, i64::MAX as i128) as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vert(x: f32, y: f32, z: f32, color: Color) -> Vertex {
        Vertex::new(Vec3::new(x, y, z), color)
    }

    fn written(r: &Rasterizer) -> Vec<(i64, i64)> {
        let mut out = Vec::new();
        for y in 0..r.height() as i64 {
            for x in 0..r.width() as i64 {
                if r.depth_buffer().get_pixel(x, y) != Some(Depth::MAX) {
                    out.push((x, y));
                }
            }
        }
        out
    }

    #[test]
    fn rejects_zero_size() {
        assert!(matches!(
            Rasterizer::new(0, 10),
            Err(RasterError::ZeroSizedBuffer { width: 0, height: 10 })
        ));
        assert!(Rasterizer::new(10, 0).is_err());
    }

    #[test]
    fn rejects_unaddressable_size() {
        assert!(matches!(
            Rasterizer::new(usize::MAX, usize::MAX),
            Err(RasterError::BufferTooLarge { .. })
        ));
    }

    #[test]
    fn clear_resets_both_buffers() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(-1.0, -1.0, 0.0, Color::RED), vert(1.0, 1.0, 0.0, Color::BLUE));
        r.clear();
        assert!(r.color_buffer().pixels().iter().all(|&c| c == Color::BLACK));
        assert!(r.depth_buffer().pixels().iter().all(|&d| d == Depth::MAX));
    }

    #[test]
    fn point_to_itself_draws_one_pixel() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        let v = vert(0.0, 0.0, 0.0, Color::GREEN);
        r.draw_line(v, v);
        assert_eq!(written(&r), vec![(4, 4)]);
        assert_eq!(r.color_buffer().get_pixel(4, 4), Some(Color::GREEN));
        assert_eq!(r.depth_buffer().get_pixel(4, 4), Some(0));
    }

    #[test]
    fn diagonal_interpolates_red_to_blue() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(-1.0, -1.0, 0.0, Color::RED), vert(1.0, 1.0, 0.0, Color::BLUE));

        let pixels = written(&r);
        assert_eq!(pixels, (0..9).map(|i| (i, i)).collect::<Vec<_>>());

        let mut last_blue = 0;
        for i in 0..9 {
            let c = r.color_buffer().get_pixel(i, i).unwrap();
            assert_eq!(c, Color::RED.lerp(Color::BLUE, i as f32 / 9.0));
            assert!(c.b >= last_blue);
            last_blue = c.b;
        }
        assert_eq!(r.color_buffer().get_pixel(0, 0), Some(Color::RED));
    }

    #[test]
    fn shallow_and_steep_lines_step_the_major_axis() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        // x: 0 -> 9, y: 0 -> 4
        r.draw_line(vert(-1.0, -1.0, 0.0, Color::WHITE), vert(1.0, 0.0, 0.0, Color::WHITE));
        let shallow = written(&r);
        assert_eq!(shallow.len(), 9);
        assert!(shallow.windows(2).all(|w| w[1].0 == w[0].0 + 1 && w[1].1 >= w[0].1));

        r.clear();
        // y: 9 -> 0, x: 0 -> 4
        r.draw_line(vert(-1.0, 1.0, 0.0, Color::WHITE), vert(0.0, -1.0, 0.0, Color::WHITE));
        let mut steep = written(&r);
        steep.sort_by_key(|p| p.1);
        assert_eq!(steep.len(), 9);
        assert!(steep.windows(2).all(|w| w[1].1 == w[0].1 + 1 && w[1].0 <= w[0].0));
    }

    #[test]
    fn axis_aligned_lines() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(1.0, -1.0, 0.0, Color::WHITE), vert(-1.0, -1.0, 0.0, Color::WHITE));
        assert_eq!(written(&r), (1..10).map(|x| (x, 0)).collect::<Vec<_>>());

        r.clear();
        r.draw_line(vert(-1.0, -1.0, 0.0, Color::WHITE), vert(-1.0, 1.0, 0.0, Color::WHITE));
        assert_eq!(written(&r), (0..9).map(|y| (0, y)).collect::<Vec<_>>());
    }

    #[test]
    fn nearer_line_overwrites() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(-1.0, 0.0, 0.5, Color::RED), vert(1.0, 0.0, 0.5, Color::RED));
        r.draw_line(vert(-1.0, 0.0, 0.25, Color::BLUE), vert(1.0, 0.0, 0.25, Color::BLUE));
        for x in 0..9 {
            assert_eq!(r.color_buffer().get_pixel(x, 4), Some(Color::BLUE * 0.75));
            assert_eq!(r.depth_buffer().get_pixel(x, 4), Some(depth_to_sample(0.25)));
        }
    }

    #[test]
    fn farther_line_is_rejected() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(-1.0, 0.0, 0.5, Color::RED), vert(1.0, 0.0, 0.5, Color::RED));
        let color_before = r.color_buffer().clone();
        let depth_before = r.depth_buffer().clone();
        r.draw_line(vert(-1.0, 0.0, 0.75, Color::BLUE), vert(1.0, 0.0, 0.75, Color::BLUE));
        assert_eq!(r.color_buffer(), &color_before);
        assert_eq!(r.depth_buffer(), &depth_before);
    }

    #[test]
    fn equal_depth_keeps_existing_pixel() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        let v = |c| vert(0.0, 0.0, 0.3, c);
        r.draw_line(v(Color::RED), v(Color::RED));
        r.draw_line(v(Color::BLUE), v(Color::BLUE));
        assert_eq!(r.color_buffer().get_pixel(4, 4), Some(Color::RED * 0.7));
    }

    #[test]
    fn far_plane_fragments_never_land() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(-1.0, 0.0, 1.0, Color::RED), vert(1.0, 0.0, 3.0, Color::RED));
        assert!(written(&r).is_empty());
    }

    #[test]
    fn offscreen_segments_are_clipped_by_the_buffer() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(-3.0, 0.0, 0.0, Color::WHITE), vert(3.0, 0.0, 0.0, Color::WHITE));
        assert_eq!(written(&r), (0..10).map(|x| (x, 4)).collect::<Vec<_>>());
    }

    #[test]
    fn infinite_endpoints_draw_the_visible_span() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(
            vert(f32::NEG_INFINITY, 0.0, 0.0, Color::WHITE),
            vert(f32::INFINITY, 0.0, 0.0, Color::WHITE),
        );
        assert_eq!(written(&r), (0..10).map(|x| (x, 4)).collect::<Vec<_>>());

        r.clear();
        r.draw_line(
            vert(0.0, f32::INFINITY, 0.0, Color::WHITE),
            vert(0.0, f32::NEG_INFINITY, 0.0, Color::WHITE),
        );
        assert_eq!(written(&r), (0..10).map(|y| (4, y)).collect::<Vec<_>>());

        r.clear();
        r.draw_line(
            vert(0.2, f32::NEG_INFINITY, 0.0, Color::WHITE),
            vert(0.6, f32::INFINITY, 0.0, Color::WHITE),
        );
        assert!(written(&r).len() <= 10);
    }

    #[test]
    fn far_away_endpoint_only_walks_the_buffer() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(0.0, 0.0, 0.0, Color::WHITE), vert(2e9, 0.0, 0.0, Color::WHITE));
        assert_eq!(written(&r), (4..10).map(|x| (x, 4)).collect::<Vec<_>>());

        r.clear();
        r.draw_line(vert(-2e9, 0.0, 0.0, Color::WHITE), vert(0.0, 0.0, 0.0, Color::WHITE));
        assert_eq!(written(&r), (0..4).map(|x| (x, 4)).collect::<Vec<_>>());
    }

    #[test]
    fn visible_steps_clamps_to_the_buffer() {
        assert_eq!(visible_steps(-9, 1, 27, 10), 9..19);
        assert_eq!(visible_steps(9, -1, 9, 10), 0..9);
        assert_eq!(visible_steps(i64::MIN as i128, 1, u64::MAX as i128, 10).count(), 10);
        assert!(visible_steps(20, 1, 5, 10).is_empty());
    }

    #[test]
    fn draw_vertex_ignores_depth() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.draw_line(vert(0.0, 0.0, 0.0, Color::RED), vert(0.0, 0.0, 0.0, Color::RED));
        r.draw_vertex(vert(0.0, 0.0, 0.9, Color::YELLOW));
        assert_eq!(r.color_buffer().get_pixel(4, 4), Some(Color::YELLOW));
        assert_eq!(r.depth_buffer().get_pixel(4, 4), Some(0));
        // off-screen markers are dropped
        r.draw_vertex(vert(5.0, 5.0, 0.0, Color::YELLOW));
    }

    #[test]
    fn clip_planes_are_validated_at_set_time() {
        let mut r = Rasterizer::new(10, 10).unwrap();
        r.set_clip_planes(1.0, 5.0).unwrap();
        assert!(r.set_clip_planes(2.0, 2.0).is_err());
        assert!(r.set_clip_planes(f32::NAN, 2.0).is_err());
        assert_eq!((r.near_clip(), r.far_clip()), (1.0, 5.0));

        // z = 3 is halfway between the planes
        r.draw_line(vert(0.0, 0.0, 3.0, Color::WHITE), vert(0.0, 0.0, 3.0, Color::WHITE));
        assert_eq!(r.depth_buffer().get_pixel(4, 4), Some(depth_to_sample(0.5)));
    }

    #[test]
    fn wireframe_cube_stays_in_bounds() {
        let mut r = Rasterizer::new(32, 32).unwrap();
        let mut cube = Mesh::cube(Color::WHITE);
        for v in &mut cube.vertices {
            v.position.z += 0.5;
        }
        r.draw_mesh_wireframe(&cube);
        assert!(!written(&r).is_empty());
        r.draw_mesh_vertices(&cube);
    }
}

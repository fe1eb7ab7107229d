use glam::Vec3;
use log::debug;

use crate::core::Depth;
use crate::error::{RasterError, Result};

/// Depth mapping range. Only constructible through [`Viewport::new`], so
/// `near_clip != far_clip` always holds and both are finite.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    near_clip: f32,
    far_clip: f32,
}

impl Viewport {
    pub fn new(near_clip: f32, far_clip: f32) -> Result<Self> {
        if !near_clip.is_finite() || !far_clip.is_finite() {
            return Err(RasterError::InvalidClipValue {
                near: near_clip,
                far: far_clip,
            });
        }
        if near_clip == far_clip {
            return Err(RasterError::DegenerateClipRange {
                near: near_clip,
                far: far_clip,
            });
        }
        debug!("viewport clip range [{}, {}]", near_clip, far_clip);
        Ok(Self {
            near_clip,
            far_clip,
        })
    }

    #[inline]
    pub fn near_clip(&self) -> f32 {
        self.near_clip
    }

    #[inline]
    pub fn far_clip(&self) -> f32 {
        self.far_clip
    }

    /// `0` at the near plane, `1` at the far plane. Not clamped.
    #[inline]
    pub fn normalize_depth(&self, z: f32) -> f32 {
        (z - self.near_clip) / (self.far_clip - self.near_clip)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            near_clip: 0.0,
            far_clip: 1.0,
        }
    }
}

/// A position after the viewport transform. Pixel coordinates may fall
/// outside the buffer, the buffer drops such writes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: i64,
    pub y: i64,
    pub depth: f32,
}

/*
    (-1, 1)          (1, 1)              (0, h-1)          (w-1, h-1)
       +----------------+                    +-------------------+
       |                |                    |                   |
       |     (0, 0)     |    ---------->     | ((w-1)/2,(h-1)/2) |
       |                |                    |                   |
       +----------------+                    +-------------------+
    (-1,-1)          (1,-1)               (0, 0)             (w-1, 0)

    Row 0 of the buffer is the bottom of the image; presenters flip.
*/
/// Maps a normalized viewport position to pixel coordinates in a
/// `width x height` buffer plus a normalized depth. Float to integer
/// conversion saturates, NaN lands on `0`.
pub fn viewport_to_screenspace(
    position: Vec3,
    width: usize,
    height: usize,
    viewport: &Viewport,
) -> ScreenPoint {
    let span_x = width.saturating_sub(1) as f32;
    let span_y = height.saturating_sub(1) as f32;
    ScreenPoint {
        x: (((position.x + 1.0) / 2.0) * span_x).floor() as i64,
        y: (((position.y + 1.0) / 2.0) * span_y).floor() as i64,
        depth: viewport.normalize_depth(position.z),
    }
}

/// Quantizes a normalized depth into the depth buffer's range. Values
/// outside `[0, 1]` saturate and NaN becomes the far sentinel.
#[inline]
pub fn depth_to_sample(depth: f32) -> Depth {
    if depth.is_nan() {
        return Depth::MAX;
    }
    (depth.clamp(0.0, 1.0) * Depth::MAX as f32).round() as Depth
}

use std::ops::Mul;

use super::math::lerp_u8;

/// 8-bit RGBA color, the sample type of the rasterizer's color buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    /// Opaque color from RGB components.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn with_alpha(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Unpack a raw `0xRRGGBBAA` value.
    pub const fn from_u32(packed: u32) -> Self {
        Self {
            r: (packed >> 24) as u8,
            g: (packed >> 16) as u8,
            b: (packed >> 8) as u8,
            a: packed as u8,
        }
    }

    /// Pack as `0xRRGGBBAA`, the layout of the raw 32-bit pixel format.
    pub const fn to_rgba_u32(self) -> u32 {
        ((self.r as u32) << 24) | ((self.g as u32) << 16) | ((self.b as u32) << 8) | self.a as u32
    }

    /// Pack as `0x00RRGGBB`, which is what minifb expects.
    pub const fn to_argb_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Channel-wise linear interpolation, `t` is clamped to `[0, 1]`.
    pub fn lerp(self, end: Color, t: f32) -> Color {
        Color {
            r: lerp_u8(self.r, end.r, t),
            g: lerp_u8(self.g, end.g, t),
            b: lerp_u8(self.b, end.b, t),
            a: lerp_u8(self.a, end.a, t),
        }
    }

    pub fn to_crossterm_color(self) -> crossterm::style::Color {
        crossterm::style::Color::Rgb {
            r: self.r,
            g: self.g,
            b: self.b,
        }
    }
}

/// Scales the color channels, saturating at `[0, 255]`. Alpha is left alone.
impl Mul<f32> for Color {
    type Output = Color;

    fn mul(self, rhs: f32) -> Color {
        let scale = |c: u8| -> u8 {
            let v = c as f32 * rhs;
            if v.is_nan() {
                0
            } else {
                v.clamp(0.0, 255.0) as u8
            }
        };
        Color {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
            a: self.a,
        }
    }
}

// Predefined colors
impl Color {
    pub const BLACK: Color = Color::new(0x00, 0x00, 0x00);
    pub const WHITE: Color = Color::new(0xFF, 0xFF, 0xFF);
    pub const RED: Color = Color::new(0xFF, 0x00, 0x00);
    pub const GREEN: Color = Color::new(0x00, 0xFF, 0x00);
    pub const BLUE: Color = Color::new(0x00, 0x00, 0xFF);
    pub const YELLOW: Color = Color::new(0xFF, 0xFF, 0x00);
    pub const CYAN: Color = Color::new(0x00, 0xFF, 0xFF);
    pub const MAGENTA: Color = Color::new(0xFF, 0x00, 0xFF);
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

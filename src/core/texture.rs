use std::mem;
use std::path::Path;

use image::RgbaImage;
use log::debug;
use rayon::prelude::*;

use crate::core::Color;
use crate::error::{RasterError, Result};

/// Depth sample. `0` is the near plane, `u16::MAX` the far plane.
pub type Depth = u16;

/// Fills below this many samples don't bother spinning up rayon.
const PAR_FILL_THRESHOLD: usize = 64 * 1024;
const FILL_CHUNK: usize = 1024;

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::core::Color {}
    impl Sealed for u16 {}
    impl Sealed for u32 {}
}

/// Sample types a [`Texture`] may hold: RGBA8 [`Color`], 16-bit [`Depth`]
/// and raw packed `u32` color. The set is closed.
pub trait PixelFormat: sealed::Sealed + Copy + Default + PartialEq + Send + Sync + 'static {}

impl PixelFormat for Color {}
impl PixelFormat for Depth {}
impl PixelFormat for u32 {}

/// A fixed-size 2D grid of samples, stored row-major with `(0, 0)` as the
/// first sample. Writes outside the grid are dropped and reads outside the
/// grid return `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture<T: PixelFormat> {
    width: usize,
    height: usize,
    pixels: Vec<T>,
}

impl<T: PixelFormat> Texture<T> {
    /// Allocates `width * height` default samples. A zero dimension gives an
    /// empty texture on which every access is a no-op.
    ///
    /// # Panics
    ///
    /// If the sample count overflows. Use [`Texture::try_new`] for sizes that
    /// come from outside the program.
    pub fn new(width: usize, height: usize) -> Self {
        match Self::try_new(width, height) {
            Ok(texture) => texture,
            Err(e) => panic!("{}", e),
        }
    }

    /// Like [`Texture::new`], but reports dimensions whose storage cannot be
    /// addressed instead of panicking.
    pub fn try_new(width: usize, height: usize) -> Result<Self> {
        let len = sample_count::<T>(width, height)?;
        Ok(Self {
            width,
            height,
            pixels: vec![T::default(); len],
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[T] {
        &self.pixels
    }

    #[inline]
    fn index(&self, x: i64, y: i64) -> Option<usize> {
        if x >= 0 && y >= 0 && (x as u64) < self.width as u64 && (y as u64) < self.height as u64 {
            Some(x as usize + y as usize * self.width)
        } else {
            None
        }
    }

    /// Writes `pixel` at `(x, y)`, silently ignoring coordinates outside the grid.
    #[inline]
    pub fn set_pixel(&mut self, x: i64, y: i64, pixel: T) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = pixel;
        }
    }

    #[inline]
    pub fn get_pixel(&self, x: i64, y: i64) -> Option<T> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn fill(&mut self, value: T) {
        if self.pixels.len() >= PAR_FILL_THRESHOLD {
            self.pixels
                .par_chunks_mut(FILL_CHUNK)
                .for_each(|chunk| chunk.fill(value));
        } else {
            self.pixels.fill(value);
        }
    }

    /// Replaces the storage. Old content is discarded, every sample is reset
    /// to the default value. Oversized dimensions leave the texture as it was.
    pub fn resize(&mut self, width: usize, height: usize) -> Result<()> {
        let len = sample_count::<T>(width, height)?;
        debug!(
            "resizing texture {}x{} -> {}x{}",
            self.width, self.height, width, height
        );
        self.width = width;
        self.height = height;
        self.pixels = vec![T::default(); len];
        Ok(())
    }
}

/// `width * height`, provided the samples fit in one allocation.
fn sample_count<T>(width: usize, height: usize) -> Result<usize> {
    width
        .checked_mul(height)
        .filter(|&len| {
            len.checked_mul(mem::size_of::<T>())
                .is_some_and(|bytes| bytes <= isize::MAX as usize)
        })
        .ok_or(RasterError::BufferTooLarge { width, height })
}

impl Texture<Color> {
    /// Packs the buffer as `0x00RRGGBB` words for a minifb blit.
    pub fn to_argb_buffer(&self) -> Vec<u32> {
        self.pixels.iter().map(|c| c.to_argb_u32()).collect()
    }

    pub fn to_image(&self) -> RgbaImage {
        let raw: Vec<u8> = self
            .pixels
            .iter()
            .flat_map(|c| [c.r, c.g, c.b, c.a])
            .collect();
        RgbaImage::from_raw(self.width as u32, self.height as u32, raw)
            .unwrap_or_else(|| RgbaImage::new(self.width as u32, self.height as u32))
    }

    pub fn save_png<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.to_image()
            .save_with_format(path.as_ref(), image::ImageFormat::Png)?;
        Ok(())
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let img = image::open(path.as_ref())?.to_rgba8();
        let (width, height) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| Color::with_alpha(p[0], p[1], p[2], p[3]))
            .collect();
        Ok(Self {
            width: width as usize,
            height: height as usize,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_in_bounds() {
        let mut tex = Texture::<Color>::new(4, 3);
        for y in 0..3 {
            for x in 0..4 {
                let c = Color::new(x as u8, y as u8, 7);
                tex.set_pixel(x, y, c);
                assert_eq!(tex.get_pixel(x, y), Some(c));
            }
        }
    }

    #[test]
    fn out_of_bounds_writes_are_ignored() {
        let mut tex = Texture::<Depth>::new(3, 3);
        tex.fill(5);
        for (x, y) in [(-1, 0), (0, -1), (3, 0), (0, 3), (i64::MAX, 1), (i64::MIN, i64::MIN)] {
            tex.set_pixel(x, y, 9);
            assert_eq!(tex.get_pixel(x, y), None);
        }
        assert!(tex.pixels().iter().all(|&d| d == 5));
    }

    #[test]
    fn row_major_layout() {
        let mut tex = Texture::<u32>::new(3, 2);
        tex.set_pixel(1, 1, 0xDEADBEEF);
        assert_eq!(tex.pixels()[1 + 3], 0xDEADBEEF);
    }

    #[test]
    fn fill_covers_every_sample() {
        // large enough to take the parallel path
        let mut tex = Texture::<Color>::new(512, 256);
        tex.fill(Color::CYAN);
        assert_eq!(tex.get_pixel(0, 0), Some(Color::CYAN));
        assert_eq!(tex.get_pixel(511, 255), Some(Color::CYAN));
        assert!(tex.pixels().iter().all(|&c| c == Color::CYAN));
    }

    #[test]
    fn resize_reinitializes() {
        let mut tex = Texture::<Depth>::new(2, 2);
        tex.fill(42);
        tex.resize(3, 5).unwrap();
        assert_eq!(tex.width(), 3);
        assert_eq!(tex.height(), 5);
        assert_eq!(tex.pixels().len(), 15);
        assert!(tex.pixels().iter().all(|&d| d == 0));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        assert!(matches!(
            Texture::<Color>::try_new(usize::MAX, 2),
            Err(RasterError::BufferTooLarge { width: usize::MAX, height: 2 })
        ));
        // fits usize as a count but not as bytes
        assert!(Texture::<u32>::try_new(usize::MAX / 2, 1).is_err());

        let mut tex = Texture::<Depth>::new(2, 2);
        tex.fill(42);
        assert!(tex.resize(usize::MAX, usize::MAX).is_err());
        assert_eq!((tex.width(), tex.height()), (2, 2));
        assert!(tex.pixels().iter().all(|&d| d == 42));
    }

    #[test]
    fn zero_sized_texture_is_inert() {
        let mut tex = Texture::<Color>::new(0, 4);
        tex.set_pixel(0, 0, Color::RED);
        tex.fill(Color::RED);
        assert_eq!(tex.get_pixel(0, 0), None);
        assert!(tex.pixels().is_empty());
    }

    #[test]
    fn argb_and_image_conversion() {
        let mut tex = Texture::<Color>::new(2, 1);
        tex.set_pixel(1, 0, Color::with_alpha(1, 2, 3, 4));
        assert_eq!(tex.to_argb_buffer(), vec![0, 0x00010203]);
        let img = tex.to_image();
        assert_eq!(img.get_pixel(1, 0).0, [1, 2, 3, 4]);
    }
}

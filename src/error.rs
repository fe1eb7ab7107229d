use std::{fmt, io, path::PathBuf};

#[derive(Debug)]
pub enum RasterError {
    ZeroSizedBuffer { width: usize, height: usize },
    /// `width * height` samples do not fit in memory.
    BufferTooLarge { width: usize, height: usize },
    /// `near == far`, the depth mapping would divide by zero.
    DegenerateClipRange { near: f32, far: f32 },
    /// A clip plane is NaN or infinite.
    InvalidClipValue { near: f32, far: f32 },
    /// Window scale other than 1, 2, 4 or 8.
    UnsupportedScale(u32),
    ObjLoad { path: PathBuf, source: tobj::LoadError },
    Image(image::ImageError),
    Io(io::Error),
    Present(String),
}

pub type Result<T> = std::result::Result<T, RasterError>;

impl fmt::Display for RasterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RasterError::ZeroSizedBuffer { width, height } => {
                write!(f, "buffer dimensions must be non-zero, got {}x{}", width, height)
            }
            RasterError::BufferTooLarge { width, height } => {
                write!(f, "buffer of {}x{} samples is too large", width, height)
            }
            RasterError::DegenerateClipRange { near, far } => {
                write!(f, "near clip ({}) and far clip ({}) must differ", near, far)
            }
            RasterError::InvalidClipValue { near, far } => {
                write!(f, "clip planes must be finite, got near={} far={}", near, far)
            }
            RasterError::UnsupportedScale(scale) => {
                write!(f, "window scale must be 1, 2, 4 or 8, got {}", scale)
            }
            RasterError::ObjLoad { path, source } => {
                write!(f, "failed to load '{}': {}", path.display(), source)
            }
            RasterError::Image(e) => write!(f, "image error: {}", e),
            RasterError::Io(e) => write!(f, "io error: {}", e),
            RasterError::Present(msg) => write!(f, "presentation failed: {}", msg),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::ObjLoad { source, .. } => Some(source),
            RasterError::Image(e) => Some(e),
            RasterError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RasterError {
    fn from(e: io::Error) -> Self {
        RasterError::Io(e)
    }
}

impl From<image::ImageError> for RasterError {
    fn from(e: image::ImageError) -> Self {
        RasterError::Image(e)
    }
}

impl From<minifb::Error> for RasterError {
    fn from(e: minifb::Error) -> Self {
        RasterError::Present(e.to_string())
    }
}

//! Presentation layer. Presenters take a finished color buffer and put it
//! somewhere visible; the rasterizer never depends on them.

pub mod snapshot;
pub mod terminal;
pub mod window;

pub use snapshot::SnapshotPresenter;
pub use terminal::TerminalPresenter;
pub use window::WindowPresenter;

use crate::core::{Color, Texture};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    Quit,
    /// Switch between wireframe lines and vertex markers.
    ToggleDrawMode,
    FarClipOut,
    FarClipIn,
    Resized { width: usize, height: usize },
}

pub trait Presenter {
    /// Shows `frame`. Row 0 of the frame is the bottom of the image.
    fn present(&mut self, frame: &Texture<Color>) -> Result<()>;

    fn is_open(&self) -> bool {
        true
    }

    /// Input gathered since the last call.
    fn poll_input(&mut self) -> Result<Vec<InputEvent>> {
        Ok(Vec::new())
    }

    /// Short status line (fps and friends), where the presenter has room for one.
    fn set_status(&mut self, _status: &str) {}
}

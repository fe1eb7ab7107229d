use std::path::{Path, PathBuf};

use image::imageops;
use log::info;

use super::Presenter;
use crate::core::{Color, Texture};
use crate::error::Result;

/// Writes every presented frame to a PNG; the file holds the last one.
pub struct SnapshotPresenter {
    path: PathBuf,
    frames_written: usize,
}

impl SnapshotPresenter {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            frames_written: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames_written(&self) -> usize {
        self.frames_written
    }
}

impl Presenter for SnapshotPresenter {
    fn present(&mut self, frame: &Texture<Color>) -> Result<()> {
        let mut image = frame.to_image();
        imageops::flip_vertical_in_place(&mut image);
        image.save_with_format(&self.path, image::ImageFormat::Png)?;
        self.frames_written += 1;
        Ok(())
    }

    fn set_status(&mut self, status: &str) {
        info!("snapshot {}: {}", self.path.display(), status);
    }
}

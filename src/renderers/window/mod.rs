use log::info;
use minifb::{Key, KeyRepeat, Scale, Window, WindowOptions};

use super::{InputEvent, Presenter};
use crate::core::{Color, Texture};
use crate::error::Result;

/// Blits frames into a minifb window, upscaled by an integer factor.
pub struct WindowPresenter {
    window: Window,
    blit: Vec<u32>,
    quit: bool,
}

/// Factors outside 1, 2, 4 and 8 are refused by `Config::validate`; they
/// fall back to no upscaling here.
pub fn scale_from_factor(factor: u32) -> Scale {
    match factor {
        2 => Scale::X2,
        4 => Scale::X4,
        8 => Scale::X8,
        _ => Scale::X1,
    }
}

impl WindowPresenter {
    pub fn new(title: &str, width: usize, height: usize, scale: u32) -> Result<Self> {
        let mut window = Window::new(
            title,
            width,
            height,
            WindowOptions {
                resize: false,
                scale: scale_from_factor(scale),
                ..WindowOptions::default()
            },
        )?;
        window.set_target_fps(60);
        info!("opened {}x{} window (scale x{})", width, height, scale);
        Ok(Self {
            window,
            blit: Vec::with_capacity(width * height),
            quit: false,
        })
    }
}

/// Packs `frame` top row first, the order minifb scans out.
pub fn flip_into_argb(frame: &Texture<Color>, out: &mut Vec<u32>) {
    out.clear();
    let width = frame.width();
    if width == 0 {
        return;
    }
    for row in frame.pixels().chunks_exact(width).rev() {
        out.extend(row.iter().map(|c| c.to_argb_u32()));
    }
}

impl Presenter for WindowPresenter {
    fn present(&mut self, frame: &Texture<Color>) -> Result<()> {
        flip_into_argb(frame, &mut self.blit);
        self.window
            .update_with_buffer(&self.blit, frame.width(), frame.height())?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.quit && self.window.is_open()
    }

    fn poll_input(&mut self) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        for key in self.window.get_keys_pressed(KeyRepeat::Yes) {
            let event = match key {
                Key::Escape | Key::Q => {
                    self.quit = true;
                    InputEvent::Quit
                }
                Key::V => InputEvent::ToggleDrawMode,
                Key::Equal | Key::NumPadPlus => InputEvent::FarClipOut,
                Key::Minus | Key::NumPadMinus => InputEvent::FarClipIn,
                _ => continue,
            };
            events.push(event);
        }
        Ok(events)
    }

    fn set_status(&mut self, status: &str) {
        self.window
            .set_title(&format!("Epsilon - Software Rasterizer | {}", status));
    }
}

use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{self, Event, KeyCode, KeyEventKind},
    execute, queue,
    style::{Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::{error, info};
use std::io::{self, stdout, Write};
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use super::{InputEvent, Presenter};
use crate::core::{Color, Texture};
use crate::error::Result;

/// Upper half block: foreground paints the top pixel, background the bottom.
const HALF_BLOCK: char = '▀';

static PANIC_HOOK_INSTALLED: AtomicBool = AtomicBool::new(false);

/// Draws frames as colored half-block cells, two pixel rows per terminal row.
pub struct TerminalPresenter {
    cols: u16,
    rows: u16,
    quit: bool,
}

impl TerminalPresenter {
    /// Switches the terminal to raw mode on the alternate screen. If any step
    /// fails the terminal is restored and no panic hook is left behind.
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let setup = || -> io::Result<(u16, u16)> {
            execute!(stdout(), EnterAlternateScreen, Hide)?;
            terminal::size()
        };
        let (cols, rows) = match setup() {
            Ok(size) => size,
            Err(e) => {
                let _ = Self::cleanup_terminal();
                return Err(e.into());
            }
        };

        Self::install_panic_hook();
        info!("terminal presenter started at {}x{} cells", cols, rows);
        Ok(Self {
            cols,
            rows,
            quit: false,
        })
    }

    /// Restores the terminal before the panic message is printed. Installed
    /// once per process.
    fn install_panic_hook() {
        if PANIC_HOOK_INSTALLED.swap(true, Ordering::SeqCst) {
            return;
        }
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = Self::cleanup_terminal();
            original_hook(panic_info);
            error!("Panic occurred: {:?}", panic_info);
        }));
    }

    fn cleanup_terminal() -> io::Result<()> {
        disable_raw_mode()?;
        execute!(stdout(), ResetColor, Show, LeaveAlternateScreen)?;
        Ok(())
    }
}

/// Nearest-neighbour resample of `frame` onto a `cols x rows` cell grid.
/// Each cell is `(top, bottom)`, rows listed top of the screen first.
pub fn downsample_cells(frame: &Texture<Color>, cols: usize, rows: usize) -> Vec<(Color, Color)> {
    let (w, h) = (frame.width(), frame.height());
    if w == 0 || h == 0 || cols == 0 || rows == 0 {
        return Vec::new();
    }
    let image_rows = rows * 2;
    let sample = |x: usize, image_row: usize| -> Color {
        let px = (x * w / cols) as i64;
        let py = (h - 1 - image_row * h / image_rows) as i64;
        frame.get_pixel(px, py).unwrap_or_default()
    };

    let mut cells = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            cells.push((sample(col, row * 2), sample(col, row * 2 + 1)));
        }
    }
    cells
}

impl Presenter for TerminalPresenter {
    fn present(&mut self, frame: &Texture<Color>) -> Result<()> {
        let (cols, rows) = (self.cols as usize, self.rows as usize);
        let cells = downsample_cells(frame, cols, rows);

        let mut out = stdout().lock();
        let mut last: Option<(Color, Color)> = None;
        for (row, line) in cells.chunks(cols.max(1)).enumerate() {
            queue!(out, MoveTo(0, row as u16))?;
            for &(top, bottom) in line {
                if last != Some((top, bottom)) {
                    queue!(
                        out,
                        SetForegroundColor(top.to_crossterm_color()),
                        SetBackgroundColor(bottom.to_crossterm_color())
                    )?;
                    last = Some((top, bottom));
                }
                queue!(out, Print(HALF_BLOCK))?;
            }
        }
        queue!(out, ResetColor)?;
        out.flush()?;
        Ok(())
    }

    fn is_open(&self) -> bool {
        !self.quit
    }

    fn poll_input(&mut self) -> Result<Vec<InputEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            match event::read()? {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    let event = match key.code {
                        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('Q') => {
                            self.quit = true;
                            InputEvent::Quit
                        }
                        KeyCode::Char('v') => InputEvent::ToggleDrawMode,
                        KeyCode::Char('+') | KeyCode::Char('=') => InputEvent::FarClipOut,
                        KeyCode::Char('-') => InputEvent::FarClipIn,
                        _ => continue,
                    };
                    events.push(event);
                }
                Event::Resize(cols, rows) => {
                    self.cols = cols;
                    self.rows = rows;
                    execute!(stdout(), terminal::Clear(terminal::ClearType::All))?;
                    events.push(InputEvent::Resized {
                        width: cols as usize,
                        height: rows as usize * 2,
                    });
                }
                _ => {}
            }
        }
        Ok(events)
    }
}

impl Drop for TerminalPresenter {
    fn drop(&mut self) {
        let _ = Self::cleanup_terminal();
        info!("terminal presenter stopped");
    }
}

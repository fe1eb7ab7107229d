use std::collections::VecDeque;
use std::fmt::{self, Display};
use std::time::{Duration, Instant};

const FRAME_WINDOW: usize = 120;

/// Rolling frame timing.
#[derive(Debug, Clone)]
pub struct Metrics {
    pub frames: u64,
    pub current_fps: f32,
    fps_counter: u32,
    fps_update_timer: Instant,
    frame_times: VecDeque<f32>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            frames: 0,
            current_fps: 0.0,
            fps_counter: 0,
            fps_update_timer: Instant::now(),
            frame_times: VecDeque::with_capacity(FRAME_WINDOW),
        }
    }

    /// Records one frame. Returns `true` once per second when the fps
    /// figure has been refreshed.
    pub fn update(&mut self, frame_delta: Duration) -> bool {
        self.frames += 1;
        self.fps_counter += 1;
        if self.frame_times.len() == FRAME_WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(frame_delta.as_secs_f32() * 1000.0);

        let elapsed = self.fps_update_timer.elapsed();
        if elapsed >= Duration::from_secs(1) {
            self.current_fps = self.fps_counter as f32 / elapsed.as_secs_f32();
            self.fps_counter = 0;
            self.fps_update_timer = Instant::now();
            return true;
        }
        false
    }

    pub fn average_ms(&self) -> f32 {
        if self.frame_times.is_empty() {
            return 0.0;
        }
        self.frame_times.iter().sum::<f32>() / self.frame_times.len() as f32
    }
}

impl Display for Metrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.1}fps | Avg: {:.2}ms | Min: {:.2}ms | Max: {:.2}ms",
            self.current_fps,
            self.average_ms(),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::min)
                .unwrap_or(0.0),
            self.frame_times
                .iter()
                .copied()
                .reduce(f32::max)
                .unwrap_or(0.0)
        )
    }
}

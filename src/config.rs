use std::path::PathBuf;

use clap::{value_parser, Arg, ArgMatches, Command};
use log::LevelFilter;

use crate::error::{RasterError, Result};
use crate::pipeline::Viewport;

/// Window upscale factors minifb can show.
pub const SCALE_FACTORS: [&str; 4] = ["1", "2", "4", "8"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayTarget {
    Window,
    Terminal,
    /// Render a fixed number of frames into a PNG, no display needed.
    Snapshot,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub target: DisplayTarget,
    pub width: usize,
    pub height: usize,
    pub scale: u32,
    pub model: Option<PathBuf>,
    pub seed: u64,
    pub near_clip: f32,
    pub far_clip: f32,
    pub frames: usize,
    pub output: PathBuf,
    pub log_level: LevelFilter,
    pub log_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            target: DisplayTarget::Window,
            width: 256,
            height: 224,
            scale: 4,
            model: None,
            seed: 0,
            near_clip: 0.0,
            far_clip: 1.0,
            frames: 1,
            output: PathBuf::from("frame.png"),
            log_level: LevelFilter::Info,
            log_file: PathBuf::from("epsilon.log"),
        }
    }
}

impl Config {
    /// Catches bad sizes and clip ranges before anything is allocated.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(RasterError::ZeroSizedBuffer {
                width: self.width,
                height: self.height,
            });
        }
        if !matches!(self.scale, 1 | 2 | 4 | 8) {
            return Err(RasterError::UnsupportedScale(self.scale));
        }
        self.viewport().map(|_| ())
    }

    pub fn viewport(&self) -> Result<Viewport> {
        Viewport::new(self.near_clip, self.far_clip)
    }

    pub fn from_matches(matches: &ArgMatches) -> Self {
        let mut config = Config::default();
        let Some(("render", sub)) = matches.subcommand() else {
            return config;
        };

        if let Some(mode) = sub.get_one::<String>("mode") {
            config.target = match mode.as_str() {
                "terminal" | "t" => DisplayTarget::Terminal,
                "snapshot" | "s" => DisplayTarget::Snapshot,
                _ => DisplayTarget::Window,
            };
        }
        if let Some(&w) = sub.get_one::<usize>("width") {
            config.width = w;
        }
        if let Some(&h) = sub.get_one::<usize>("height") {
            config.height = h;
        }
        if let Some(scale) = sub
            .get_one::<String>("scale")
            .and_then(|s| s.parse().ok())
        {
            config.scale = scale;
        }
        config.model = sub.get_one::<PathBuf>("model").cloned();
        if let Some(&seed) = sub.get_one::<u64>("seed") {
            config.seed = seed;
        }
        if let Some(&near) = sub.get_one::<f32>("near") {
            config.near_clip = near;
        }
        if let Some(&far) = sub.get_one::<f32>("far") {
            config.far_clip = far;
        }
        if let Some(&frames) = sub.get_one::<usize>("frames") {
            config.frames = frames;
        }
        if let Some(output) = sub.get_one::<PathBuf>("output") {
            config.output = output.clone();
        }
        if let Some(level) = sub.get_one::<String>("log-level") {
            config.log_level = level.parse().unwrap_or(LevelFilter::Info);
        }
        if let Some(file) = sub.get_one::<PathBuf>("log-file") {
            config.log_file = file.clone();
        }
        config
    }
}

pub fn create_clap_command() -> Command {
    Command::new("epsilon")
        .about("Software rasterizer")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand(
            Command::new("render")
                .about("Render a model (or a line demo) to a window, the terminal, or a PNG")
                .arg(
                    Arg::new("mode")
                        .short('m')
                        .long("mode")
                        .value_name("MODE")
                        .help("Where frames go ('window', 'terminal', 'snapshot', or 'w', 't', 's')")
                        .value_parser(["window", "terminal", "snapshot", "w", "t", "s"]),
                )
                .arg(
                    Arg::new("width")
                        .long("width")
                        .value_name("PIXELS")
                        .help("Width of the off-screen buffer")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("height")
                        .long("height")
                        .value_name("PIXELS")
                        .help("Height of the off-screen buffer")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("scale")
                        .long("scale")
                        .value_name("FACTOR")
                        .help("Window upscale factor")
                        .value_parser(SCALE_FACTORS),
                )
                .arg(
                    Arg::new("model")
                        .short('f')
                        .long("model")
                        .value_name("FILE")
                        .help("Path to an .obj model. Without one a seeded line demo is drawn.")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("seed")
                        .long("seed")
                        .value_name("SEED")
                        .help("Seed for demo lines and model colors")
                        .value_parser(value_parser!(u64)),
                )
                .arg(
                    Arg::new("near")
                        .long("near")
                        .value_name("Z")
                        .help("Near clip plane")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f32)),
                )
                .arg(
                    Arg::new("far")
                        .long("far")
                        .value_name("Z")
                        .help("Far clip plane")
                        .allow_negative_numbers(true)
                        .value_parser(value_parser!(f32)),
                )
                .arg(
                    Arg::new("frames")
                        .long("frames")
                        .value_name("COUNT")
                        .help("Frames to render in snapshot mode")
                        .value_parser(value_parser!(usize)),
                )
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("FILE")
                        .help("PNG written in snapshot mode")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(
                    Arg::new("log-level")
                        .long("log-level")
                        .value_name("LEVEL")
                        .value_parser(["off", "error", "warn", "info", "debug", "trace"]),
                )
                .arg(
                    Arg::new("log-file")
                        .long("log-file")
                        .value_name("FILE")
                        .help("Log destination in terminal mode")
                        .value_parser(value_parser!(PathBuf)),
                ),
        )
}

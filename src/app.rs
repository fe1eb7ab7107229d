use std::time::Instant;

use glam::{Mat3, Vec3};
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{Config, DisplayTarget};
use crate::core::{Color, Mesh, Model, Vertex};
use crate::error::Result;
use crate::metrics::Metrics;
use crate::pipeline::{Rasterizer, Viewport};
use crate::renderers::{InputEvent, Presenter, SnapshotPresenter, TerminalPresenter, WindowPresenter};

/// Fixed timestep used when frames are not shown live, so output is reproducible.
const FIXED_DELTA: f32 = 1.0 / 60.0;
/// Half diagonal of the unit cube is `sqrt(3)`.
const INV_SQRT_3: f32 = 0.577_350_26;

/// Per-frame hooks driven by [`run_frames`]. The rasterizer never calls
/// back into a scene.
pub trait Scene {
    fn on_render(&mut self, rasterizer: &mut Rasterizer, delta_time: f32);

    fn on_input(&mut self, _event: InputEvent, _rasterizer: &mut Rasterizer) {}

    fn on_resize(&mut self, _width: usize, _height: usize) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawMode {
    Lines,
    Vertices,
}

/// Nudges the far plane by a tenth of the current range.
fn adjust_far_clip(rasterizer: &mut Rasterizer, direction: f32) {
    let (near, far) = (rasterizer.near_clip(), rasterizer.far_clip());
    let step = (far - near) * 0.1 * direction;
    if rasterizer.set_clip_planes(near, far + step).is_ok() {
        debug!("far clip now {}", rasterizer.far_clip());
    }
}

/// Spinning wireframe of a model normalized to the unit cube.
pub struct ModelScene {
    model: Model,
    scratch: Mesh,
    angle: f32,
    spin_speed: f32,
    pub draw_mode: DrawMode,
}

impl ModelScene {
    pub fn new(model: Model) -> Self {
        Self {
            model,
            scratch: Mesh::new(),
            angle: 0.0,
            spin_speed: 0.8,
            draw_mode: DrawMode::Lines,
        }
    }

    /// Rotated model position to viewport space: x/y shrunk so the rotated
    /// unit cube stays on screen, z remapped from `[-sqrt(3), sqrt(3)]` onto
    /// the clip range.
    fn to_viewport(position: Vec3, rotation: &Mat3, viewport: &Viewport) -> Vec3 {
        let p = *rotation * position;
        let z01 = (p.z * INV_SQRT_3 + 1.0) * 0.5;
        Vec3::new(
            p.x * 0.55,
            p.y * 0.55,
            viewport.near_clip() + z01 * (viewport.far_clip() - viewport.near_clip()),
        )
    }
}

impl Scene for ModelScene {
    fn on_render(&mut self, rasterizer: &mut Rasterizer, delta_time: f32) {
        self.angle = (self.angle + self.spin_speed * delta_time) % std::f32::consts::TAU;
        let rotation = Mat3::from_rotation_y(self.angle) * Mat3::from_rotation_x(0.35);
        let viewport = *rasterizer.viewport();

        for mesh in &self.model.meshes {
            self.scratch.vertices.clear();
            self.scratch.vertices.extend(mesh.vertices.iter().map(|v| Vertex {
                position: Self::to_viewport(v.position, &rotation, &viewport),
                ..*v
            }));
            self.scratch.indices.clone_from(&mesh.indices);

            match self.draw_mode {
                DrawMode::Lines => rasterizer.draw_mesh_wireframe(&self.scratch),
                DrawMode::Vertices => rasterizer.draw_mesh_vertices(&self.scratch),
            }
        }
    }

    fn on_input(&mut self, event: InputEvent, rasterizer: &mut Rasterizer) {
        match event {
            InputEvent::ToggleDrawMode => {
                self.draw_mode = match self.draw_mode {
                    DrawMode::Lines => DrawMode::Vertices,
                    DrawMode::Vertices => DrawMode::Lines,
                };
                info!("draw mode: {:?}", self.draw_mode);
            }
            InputEvent::FarClipOut => adjust_far_clip(rasterizer, 1.0),
            InputEvent::FarClipIn => adjust_far_clip(rasterizer, -1.0),
            _ => {}
        }
    }
}

/// Random colored lines spinning around the center, generated once from a
/// caller supplied seed.
pub struct LinesScene {
    lines: Vec<(Vertex, Vertex)>,
    angle: f32,
}

impl LinesScene {
    pub fn new<R: Rng + ?Sized>(count: usize, rng: &mut R, viewport: &Viewport) -> Self {
        let (near, far) = (viewport.near_clip(), viewport.far_clip());
        let random_vertex = |rng: &mut R| {
            Vertex::new(
                Vec3::new(
                    rng.gen_range(-0.7..=0.7),
                    rng.gen_range(-0.7..=0.7),
                    near + rng.gen::<f32>() * (far - near),
                ),
                Color::new(rng.gen(), rng.gen(), rng.gen()),
            )
        };
        let lines = (0..count)
            .map(|_| (random_vertex(rng), random_vertex(rng)))
            .collect();
        Self { lines, angle: 0.0 }
    }

    pub fn lines(&self) -> &[(Vertex, Vertex)] {
        &self.lines
    }
}

impl Scene for LinesScene {
    fn on_render(&mut self, rasterizer: &mut Rasterizer, delta_time: f32) {
        self.angle = (self.angle + 0.5 * delta_time) % std::f32::consts::TAU;
        let rotation = Mat3::from_rotation_z(self.angle);
        let spin = |v: &Vertex| {
            let p = rotation * Vec3::new(v.position.x, v.position.y, 0.0);
            Vertex {
                position: Vec3::new(p.x, p.y, v.position.z),
                ..*v
            }
        };
        for (a, b) in &self.lines {
            rasterizer.draw_line(spin(a), spin(b));
        }
    }

    fn on_input(&mut self, event: InputEvent, rasterizer: &mut Rasterizer) {
        match event {
            InputEvent::FarClipOut => adjust_far_clip(rasterizer, 1.0),
            InputEvent::FarClipIn => adjust_far_clip(rasterizer, -1.0),
            _ => {}
        }
    }
}

/// Clear, draw, present until the presenter closes or `frame_limit` frames
/// have been shown. With `fixed_delta` every frame advances by that much
/// time instead of the measured wall clock.
pub fn run_frames(
    rasterizer: &mut Rasterizer,
    scene: &mut dyn Scene,
    presenter: &mut dyn Presenter,
    frame_limit: Option<usize>,
    fixed_delta: Option<f32>,
) -> Result<Metrics> {
    let mut metrics = Metrics::new();
    let mut last_frame = Instant::now();

    loop {
        if !presenter.is_open() {
            break;
        }
        if frame_limit.is_some_and(|limit| metrics.frames as usize >= limit) {
            break;
        }

        for event in presenter.poll_input()? {
            match event {
                InputEvent::Quit => info!("quit requested"),
                InputEvent::Resized { width, height } => scene.on_resize(width, height),
                other => scene.on_input(other, rasterizer),
            }
        }

        let now = Instant::now();
        let frame_delta = now - last_frame;
        last_frame = now;
        let delta_time = fixed_delta.unwrap_or(frame_delta.as_secs_f32());

        rasterizer.clear();
        scene.on_render(rasterizer, delta_time);
        presenter.present(rasterizer.color_buffer())?;

        if metrics.update(frame_delta) {
            presenter.set_status(&metrics.to_string());
            debug!("{}", metrics);
        }
    }

    info!("rendered {} frames", metrics.frames);
    Ok(metrics)
}

/// Builds the rasterizer, scene and presenter described by `config` and
/// runs the frame loop.
pub fn run(config: &Config) -> Result<()> {
    config.validate()?;
    let mut rasterizer =
        Rasterizer::with_viewport(config.width, config.height, config.viewport()?)?;
    let mut rng = StdRng::seed_from_u64(config.seed);

    let mut scene: Box<dyn Scene> = match &config.model {
        Some(path) => {
            let mut model = Model::load_obj(path, &mut rng)?;
            model.normalize_to_unit_cube();
            model.debug();
            info!(
                "'{}': {} meshes, {} vertices",
                model.name,
                model.meshes.len(),
                model.vertex_count()
            );
            Box::new(ModelScene::new(model))
        }
        None => Box::new(LinesScene::new(64, &mut rng, rasterizer.viewport())),
    };

    match config.target {
        DisplayTarget::Window => {
            let mut presenter = WindowPresenter::new(
                "Epsilon - Software Rasterizer",
                config.width,
                config.height,
                config.scale,
            )?;
            run_frames(&mut rasterizer, scene.as_mut(), &mut presenter, None, None)?;
        }
        DisplayTarget::Terminal => {
            let mut presenter = TerminalPresenter::new()?;
            run_frames(&mut rasterizer, scene.as_mut(), &mut presenter, None, None)?;
        }
        DisplayTarget::Snapshot => {
            let mut presenter = SnapshotPresenter::new(&config.output);
            run_frames(
                &mut rasterizer,
                scene.as_mut(),
                &mut presenter,
                Some(config.frames),
                Some(FIXED_DELTA),
            )?;
            info!(
                "wrote {} frame(s) to {}",
                presenter.frames_written(),
                presenter.path().display()
            );
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Depth, Texture};

    /// Keeps a copy of every presented frame.
    #[derive(Default)]
    struct Recorder {
        frames: Vec<Texture<Color>>,
        pending: Vec<InputEvent>,
    }

    impl Presenter for Recorder {
        fn present(&mut self, frame: &Texture<Color>) -> Result<()> {
            self.frames.push(frame.clone());
            Ok(())
        }

        fn poll_input(&mut self) -> Result<Vec<InputEvent>> {
            Ok(std::mem::take(&mut self.pending))
        }
    }

    #[test]
    fn lines_scene_is_deterministic_per_seed() {
        let vp = Viewport::default();
        let a = LinesScene::new(16, &mut StdRng::seed_from_u64(3), &vp);
        let b = LinesScene::new(16, &mut StdRng::seed_from_u64(3), &vp);
        let c = LinesScene::new(16, &mut StdRng::seed_from_u64(4), &vp);
        assert_eq!(a.lines(), b.lines());
        assert_ne!(a.lines(), c.lines());
        assert!(a
            .lines()
            .iter()
            .all(|(p, q)| (0.0..=1.0).contains(&p.position.z) && (0.0..=1.0).contains(&q.position.z)));
    }

    #[test]
    fn frame_loop_honours_limit_and_is_reproducible() {
        let render = || {
            let mut r = Rasterizer::new(32, 32).unwrap();
            let mut scene = LinesScene::new(8, &mut StdRng::seed_from_u64(11), r.viewport());
            let mut rec = Recorder::default();
            let metrics = run_frames(&mut r, &mut scene, &mut rec, Some(3), Some(FIXED_DELTA)).unwrap();
            assert_eq!(metrics.frames, 3);
            rec.frames
        };
        let first = render();
        let second = render();
        assert_eq!(first.len(), 3);
        assert_eq!(first, second);
        assert!(first[0].pixels().iter().any(|&c| c != Color::BLACK));
    }

    #[test]
    fn model_scene_draw_modes_and_clip_input() {
        let mut r = Rasterizer::new(48, 48).unwrap();
        let mut model = Model::from_mesh("cube", Mesh::cube(Color::WHITE));
        model.normalize_to_unit_cube();
        let mut scene = ModelScene::new(model);

        scene.on_render(&mut r, 0.0);
        let lit_lines = r.depth_buffer().pixels().iter().filter(|&&d| d != Depth::MAX).count();
        assert!(lit_lines > 8);

        scene.on_input(InputEvent::ToggleDrawMode, &mut r);
        assert_eq!(scene.draw_mode, DrawMode::Vertices);
        r.clear();
        scene.on_render(&mut r, 0.0);
        // vertex markers skip the depth buffer
        assert!(r.depth_buffer().pixels().iter().all(|&d| d == Depth::MAX));
        assert!(r.color_buffer().pixels().iter().any(|&c| c != Color::BLACK));

        scene.on_input(InputEvent::FarClipOut, &mut r);
        assert!((r.far_clip() - 1.1).abs() < 1e-6);
        scene.on_input(InputEvent::FarClipIn, &mut r);
        assert!(r.far_clip() < 1.1);
    }

    #[test]
    fn quit_event_does_not_reach_scene() {
        let mut r = Rasterizer::new(8, 8).unwrap();
        let mut scene = LinesScene::new(1, &mut StdRng::seed_from_u64(0), r.viewport());
        let mut rec = Recorder {
            pending: vec![InputEvent::Quit, InputEvent::FarClipOut],
            ..Default::default()
        };
        run_frames(&mut r, &mut scene, &mut rec, Some(1), Some(FIXED_DELTA)).unwrap();
        assert!(r.far_clip() > 1.0);
    }
}

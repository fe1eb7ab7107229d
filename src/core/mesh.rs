use std::path::Path;
use std::time::Instant;

use glam::{Vec2, Vec3};
use log::{debug, info, trace, warn};
use rand::Rng;

use super::{Color, Vertex};
use crate::error::{RasterError, Result};

/// Triangle list: every three consecutive `indices` form one triangle.
#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
    pub smooth: bool,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// The three edges of every triangle as vertex pairs. Triangles that
    /// reference a missing vertex are skipped.
    pub fn edges(&self) -> impl Iterator<Item = (Vertex, Vertex)> + '_ {
        self.indices.chunks_exact(3).flat_map(move |tri| {
            let fetch = |i: u32| self.vertices.get(i as usize).copied();
            match (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) {
                (Some(a), Some(b), Some(c)) => vec![(a, b), (b, c), (c, a)],
                _ => Vec::new(),
            }
        })
    }

    /// Unit cube centered on the origin, side length 1.
    pub fn cube(color: Color) -> Self {
        let corners = [
            Vec3::new(-0.5, -0.5, -0.5),
            Vec3::new(0.5, -0.5, -0.5),
            Vec3::new(0.5, 0.5, -0.5),
            Vec3::new(-0.5, 0.5, -0.5),
            Vec3::new(-0.5, -0.5, 0.5),
            Vec3::new(0.5, -0.5, 0.5),
            Vec3::new(0.5, 0.5, 0.5),
            Vec3::new(-0.5, 0.5, 0.5),
        ];
        let vertices = corners
            .iter()
            .map(|&p| Vertex {
                position: p,
                normal: p.normalize(),
                uv: Vec2::ZERO,
                color,
            })
            .collect();
        #[rustfmt::skip]
        let indices = vec![
            0, 1, 2, 0, 2, 3, // back
            4, 6, 5, 4, 7, 6, // front
            0, 4, 5, 0, 5, 1, // bottom
            3, 2, 6, 3, 6, 7, // top
            0, 3, 7, 0, 7, 4, // left
            1, 5, 6, 1, 6, 2, // right
        ];
        Self {
            vertices,
            indices,
            smooth: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Model {
    pub name: String,
    pub meshes: Vec<Mesh>,
    pub mesh_names: Vec<String>,
}

impl Model {
    pub fn from_mesh(name: &str, mesh: Mesh) -> Self {
        Self {
            name: name.to_string(),
            meshes: vec![mesh],
            mesh_names: vec![name.to_string()],
        }
    }

    /// Loads a Wavefront OBJ file. Each object gets one flat color drawn from
    /// `rng`, so the same seed always yields the same colors.
    pub fn load_obj<P: AsRef<Path>, R: Rng + ?Sized>(path: P, rng: &mut R) -> Result<Self> {
        let path = path.as_ref();
        let started = Instant::now();

        let (models, materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                triangulate: true,
                single_index: true,
                ..Default::default()
            },
        )
        .map_err(|source| RasterError::ObjLoad {
            path: path.to_path_buf(),
            source,
        })?;

        if let Err(e) = materials {
            // materials are never used for drawing
            trace!("ignoring material library for '{}': {}", path.display(), e);
        }

        let mut model = Model {
            name: path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            ..Default::default()
        };

        for obj in models {
            let data = obj.mesh;
            let color = Color::new(rng.gen(), rng.gen(), rng.gen());

            let vertex_count = data.positions.len() / 3;
            let mut vertices = Vec::with_capacity(vertex_count);
            for i in 0..vertex_count {
                let position = Vec3::from_slice(&data.positions[i * 3..i * 3 + 3]);
                let normal = data
                    .normals
                    .get(i * 3..i * 3 + 3)
                    .map(Vec3::from_slice)
                    .unwrap_or(Vec3::ZERO);
                let uv = data
                    .texcoords
                    .get(i * 2..i * 2 + 2)
                    .map(Vec2::from_slice)
                    .unwrap_or(Vec2::ZERO);
                vertices.push(Vertex {
                    position,
                    normal,
                    uv,
                    color,
                });
            }

            if data.indices.len() % 3 != 0 {
                warn!(
                    "mesh '{}' has {} indices, trailing ones are ignored",
                    obj.name,
                    data.indices.len()
                );
            }

            let mesh = Mesh {
                vertices,
                indices: data.indices,
                smooth: !data.normals.is_empty(),
            };
            debug!(
                "mesh '{}': {} vertices, {} triangles",
                obj.name,
                mesh.vertices.len(),
                mesh.triangle_count()
            );
            model.mesh_names.push(obj.name);
            model.meshes.push(mesh);
        }

        info!(
            "model '{}' took {:.3}s to load from '{}'",
            model.name,
            started.elapsed().as_secs_f32(),
            path.display()
        );
        Ok(model)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    /// Centers the model on the origin and scales it uniformly so every
    /// coordinate lands in `[-1, 1]`.
    pub fn normalize_to_unit_cube(&mut self) {
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for v in self.meshes.iter().flat_map(|m| m.vertices.iter()) {
            min = min.min(v.position);
            max = max.max(v.position);
        }
        if !min.is_finite() || !max.is_finite() {
            return;
        }

        let center = (min + max) * 0.5;
        let half_extent = ((max - min) * 0.5).max_element();
        let scale = if half_extent > f32::EPSILON {
            1.0 / half_extent
        } else {
            1.0
        };
        for v in self.meshes.iter_mut().flat_map(|m| m.vertices.iter_mut()) {
            v.position = (v.position - center) * scale;
        }
    }

    pub fn debug(&self) {
        debug!("Debugging \"{}\"", self.name);
        for (mesh, name) in self.meshes.iter().zip(&self.mesh_names) {
            debug!("\tMesh: \"{}\"", name);
            debug!("\t\tVertices:");
            for (j, v) in mesh.vertices.iter().enumerate() {
                debug!(
                    "\t\t\t{} pos: ({:.2}, {:.2}, {:.2}), uv: ({:.2}, {:.2}), nrml: ({:.2}, {:.2}, {:.2}), color: ({}, {}, {}, {})",
                    j,
                    v.position.x,
                    v.position.y,
                    v.position.z,
                    v.uv.x,
                    v.uv.y,
                    v.normal.x,
                    v.normal.y,
                    v.normal.z,
                    v.color.r,
                    v.color.g,
                    v.color.b,
                    v.color.a
                );
            }
            debug!("\t\tIndices:");
            for (j, tri) in mesh.indices.chunks_exact(3).enumerate() {
                debug!("\t\t\t{} {} {} {}", j, tri[0], tri[1], tri[2]);
            }
            debug!("Smooth shading {}", mesh.smooth);
        }
    }
}

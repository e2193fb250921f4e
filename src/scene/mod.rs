pub mod overlay;

use glam::Vec3;
use serde::Deserialize;

use crate::error::GeometryError;
use crate::geometry::{Lattice, TangentFrame, TriangleMesh, uv_sphere};
use crate::renderer::buffers::{ColorVertex, MeshVertex};

pub use overlay::{OverlayStyle, TangentOverlay};

pub const LATTICE_COLOR: [f32; 4] = [0.0, 1.0, 1.0, 0.9];
pub const LAYER_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];
pub const SURFACE_COLOR: [f32; 4] = [0.33, 0.4, 0.8, 1.0];
pub const PLANE_COLOR: [f32; 4] = [0.2, 0.9, 0.4, 0.45];
pub const MARKER_COLOR: [f32; 4] = [1.0, 0.2, 0.2, 1.0];
pub const ARROW_COLOR: [f32; 4] = [1.0, 0.85, 0.0, 1.0];

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Demo {
    Lattice,
    Sphere,
    Model,
}

impl Demo {
    pub const ALL: [Demo; 3] = [Demo::Lattice, Demo::Sphere, Demo::Model];

    pub fn label(&self) -> &'static str {
        match self {
            Demo::Lattice => "Lattice",
            Demo::Sphere => "Sphere",
            Demo::Model => "Model",
        }
    }
}

/// Everything one demo draws, in upload-ready vertex formats.
#[derive(Default)]
pub struct SceneGeometry {
    pub points: Vec<ColorVertex>,
    pub lines: Vec<ColorVertex>,
    pub mesh_vertices: Vec<MeshVertex>,
    pub mesh_indices: Vec<u32>,
    /// Translucent triangles, drawn after the opaque mesh.
    pub overlay_vertices: Vec<MeshVertex>,
    pub overlay_indices: Vec<u32>,
}

impl SceneGeometry {
    pub fn push_mesh(&mut self, mesh: &TriangleMesh, color: [f32; 4]) {
        push_indexed(&mut self.mesh_vertices, &mut self.mesh_indices, mesh, color);
    }

    pub fn push_overlay_mesh(&mut self, mesh: &TriangleMesh, color: [f32; 4]) {
        push_indexed(
            &mut self.overlay_vertices,
            &mut self.overlay_indices,
            mesh,
            color,
        );
    }

    pub fn push_line(&mut self, a: Vec3, b: Vec3, color: [f32; 4]) {
        self.lines.push(ColorVertex {
            position: a.to_array(),
            color,
        });
        self.lines.push(ColorVertex {
            position: b.to_array(),
            color,
        });
    }

    pub fn push_tangent_overlay(&mut self, overlay: &TangentOverlay) {
        self.push_overlay_mesh(&overlay.plane, PLANE_COLOR);
        self.push_mesh(&overlay.marker, MARKER_COLOR);
        for [a, b] in &overlay.arrow {
            self.push_line(*a, *b, ARROW_COLOR);
        }
    }
}

fn push_indexed(
    vertices: &mut Vec<MeshVertex>,
    indices: &mut Vec<u32>,
    mesh: &TriangleMesh,
    color: [f32; 4],
) {
    let base = vertices.len() as u32;
    vertices.extend(mesh.positions.iter().enumerate().map(|(i, p)| MeshVertex {
        position: p.to_array(),
        normal: mesh
            .normals
            .get(i)
            .copied()
            .unwrap_or_else(|| p.normalize_or_zero())
            .to_array(),
        color,
    }));
    indices.extend(mesh.indices.iter().map(|i| i + base));
}

pub fn colored_points(points: &[Vec3], color: [f32; 4]) -> Vec<ColorVertex> {
    points
        .iter()
        .map(|p| ColorVertex {
            position: p.to_array(),
            color,
        })
        .collect()
}

pub fn lattice_scene(lattice: &Lattice) -> SceneGeometry {
    SceneGeometry {
        points: colored_points(lattice.points(), LATTICE_COLOR),
        ..Default::default()
    }
}

/// Geometry for the current layer view; rebuilt from scratch on every call.
pub fn layer_scene(lattice: &Lattice, k: usize) -> Vec<ColorVertex> {
    colored_points(&lattice.layer(k), LAYER_COLOR)
}

pub fn sphere_scene(
    radius: f32,
    point: Vec3,
    style: &OverlayStyle,
) -> Result<(SceneGeometry, TangentFrame), GeometryError> {
    let mut scene = SceneGeometry::default();
    scene.push_mesh(&uv_sphere(Vec3::ZERO, radius, 48, 24), SURFACE_COLOR);

    let frame = TangentFrame::build(point, style.tangent_length)?;
    scene.push_tangent_overlay(&TangentOverlay::build(frame, style));
    Ok((scene, frame))
}

/// The loaded mesh with the overlay at `point`.
pub fn model_scene(
    mesh: &TriangleMesh,
    point: Vec3,
    style: &OverlayStyle,
) -> Result<(SceneGeometry, TangentFrame), GeometryError> {
    let mut scene = SceneGeometry::default();
    scene.push_mesh(mesh, SURFACE_COLOR);

    let frame = TangentFrame::build(point, style.tangent_length)?;
    scene.push_tangent_overlay(&TangentOverlay::build(frame, style));
    Ok((scene, frame))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::LatticeSpec;

    #[test]
    fn test_lattice_scene_uploads_every_point() {
        let lattice = Lattice::generate(LatticeSpec::default()).unwrap();
        let scene = lattice_scene(&lattice);
        assert_eq!(scene.points.len(), 3375);
        assert!(scene.mesh_indices.is_empty());
        assert!(scene.points.iter().all(|v| v.color == LATTICE_COLOR));
    }

    #[test]
    fn test_layer_scene_rebuilds_per_index() {
        let lattice = Lattice::generate(LatticeSpec::default()).unwrap();
        assert_eq!(layer_scene(&lattice, 7).len(), 225);
        assert!(layer_scene(&lattice, 7)
            .iter()
            .all(|v| v.position[2].abs() < 1e-5));
        assert!(layer_scene(&lattice, 40).is_empty());
    }

    #[test]
    fn test_sphere_scene_builds_overlay() {
        let style = OverlayStyle::default();
        let (scene, frame) = sphere_scene(1.0, Vec3::new(0.0, 2.0, 0.0), &style).unwrap();

        assert!((frame.normal - Vec3::Y).length() < 1e-5);
        assert!((frame.tangent - Vec3::new(0.3, 0.0, 0.0)).length() < 1e-5);
        assert_eq!(scene.lines.len(), 6);
        assert_eq!(scene.overlay_indices.len(), 6);
        assert!(!scene.mesh_indices.is_empty());

        let vertex_count = scene.mesh_vertices.len() as u32;
        assert!(scene.mesh_indices.iter().all(|&i| i < vertex_count));
    }

    #[test]
    fn test_sphere_scene_rejects_origin() {
        let style = OverlayStyle::default();
        assert!(sphere_scene(1.0, Vec3::ZERO, &style).is_err());
    }
}

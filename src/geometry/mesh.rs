use glam::{Quat, Vec3};
use std::f32::consts::PI;

#[derive(Clone, Debug, Default)]
pub struct TriangleMesh {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub indices: Vec<u32>,
}

impl TriangleMesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Largest distance of any vertex from the origin.
    pub fn bounding_radius(&self) -> f32 {
        self.positions
            .iter()
            .map(|p| p.length())
            .fold(0.0, f32::max)
    }

    /// Averages adjacent face normals into per-vertex normals,
    /// replacing whatever normals the mesh had.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];

        for tri in self.indices.chunks_exact(3) {
            let (a, b, c) = (tri[0] as usize, tri[1] as usize, tri[2] as usize);
            if a >= normals.len() || b >= normals.len() || c >= normals.len() {
                continue;
            }
            let face = (self.positions[b] - self.positions[a])
                .cross(self.positions[c] - self.positions[a]);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }

        self.normals = normals
            .into_iter()
            .zip(&self.positions)
            .map(|(n, p)| n.try_normalize().unwrap_or_else(|| p.normalize_or_zero()))
            .collect();
    }

    /// Appends `other`, rebasing its indices.
    pub fn append(&mut self, other: &TriangleMesh) {
        let base = self.positions.len() as u32;
        self.positions.extend_from_slice(&other.positions);
        self.normals.extend_from_slice(&other.normals);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }
}

pub fn uv_sphere(center: Vec3, radius: f32, segments: u32, rings: u32) -> TriangleMesh {
    let segments = segments.max(3);
    let rings = rings.max(2);

    let mut positions = Vec::with_capacity(((segments + 1) * (rings + 1)) as usize);
    let mut normals = Vec::with_capacity(positions.capacity());

    for r in 0..=rings {
        let theta = r as f32 / rings as f32 * PI;
        let (sin_t, cos_t) = theta.sin_cos();
        for s in 0..=segments {
            let phi = s as f32 / segments as f32 * 2.0 * PI;
            let (sin_p, cos_p) = phi.sin_cos();

            let n = Vec3::new(sin_t * cos_p, cos_t, sin_t * sin_p);
            positions.push(center + n * radius);
            normals.push(n);
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((segments * rings * 6) as usize);
    for r in 0..rings {
        for s in 0..segments {
            let tl = r * stride + s;
            let tr = tl + 1;
            let bl = tl + stride;
            let br = bl + 1;

            indices.extend_from_slice(&[tl, tr, bl]);
            indices.extend_from_slice(&[tr, br, bl]);
        }
    }

    TriangleMesh {
        positions,
        normals,
        indices,
    }
}

/// A `size` x `size` square in the local XY plane, rotated then moved to `center`.
pub fn plane_patch(center: Vec3, rotation: Quat, size: f32) -> TriangleMesh {
    let h = size / 2.0;
    let corners = [
        Vec3::new(-h, -h, 0.0),
        Vec3::new(h, -h, 0.0),
        Vec3::new(h, h, 0.0),
        Vec3::new(-h, h, 0.0),
    ];
    let normal = rotation * Vec3::Z;

    TriangleMesh {
        positions: corners.iter().map(|c| center + rotation * *c).collect(),
        normals: vec![normal; 4],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uv_sphere_on_radius() {
        let mesh = uv_sphere(Vec3::ZERO, 1.5, 16, 8);
        assert_eq!(mesh.positions.len(), 17 * 9);
        assert_eq!(mesh.triangle_count(), 16 * 8 * 2);
        assert!(mesh
            .positions
            .iter()
            .all(|p| (p.length() - 1.5).abs() < 1e-5));
        assert!((mesh.bounding_radius() - 1.5).abs() < 1e-5);
        assert!(mesh.indices.iter().all(|&i| (i as usize) < mesh.positions.len()));
    }

    #[test]
    fn test_plane_patch_follows_rotation() {
        let rotation = Quat::from_rotation_arc(Vec3::Z, Vec3::Y);
        let center = Vec3::new(0.0, 2.0, 0.0);
        let mesh = plane_patch(center, rotation, 1.0);

        for p in &mesh.positions {
            assert!((p.y - 2.0).abs() < 1e-5);
        }
        assert!((mesh.normals[0] - Vec3::Y).length() < 1e-5);
    }

    #[test]
    fn test_vertex_normals_point_outward_on_tetrahedron() {
        let mut mesh = TriangleMesh {
            positions: vec![
                Vec3::new(1.0, 1.0, 1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(-1.0, 1.0, -1.0),
                Vec3::new(-1.0, -1.0, 1.0),
            ],
            normals: Vec::new(),
            indices: vec![0, 1, 2, 0, 3, 1, 0, 2, 3, 1, 3, 2],
        };
        mesh.compute_vertex_normals();

        assert_eq!(mesh.normals.len(), 4);
        for (n, p) in mesh.normals.iter().zip(&mesh.positions) {
            assert!(n.dot(*p) > 0.0);
            assert!((n.length() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_append_rebases_indices() {
        let mut a = plane_patch(Vec3::ZERO, Quat::IDENTITY, 1.0);
        let b = plane_patch(Vec3::X, Quat::IDENTITY, 1.0);
        a.append(&b);

        assert_eq!(a.positions.len(), 8);
        assert_eq!(&a.indices[6..], &[4, 5, 6, 4, 6, 7]);
    }
}

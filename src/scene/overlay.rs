use glam::Vec3;

use crate::geometry::{TangentFrame, TriangleMesh, plane_patch, uv_sphere};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayStyle {
    pub tangent_length: f32,
    pub arrow_scale: f32,
    pub plane_size: f32,
    pub marker_radius: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            tangent_length: 0.3,
            arrow_scale: 1.0,
            plane_size: 1.0,
            marker_radius: 0.05,
        }
    }
}

/// Plane patch, point marker and tangent arrow anchored at a surface point.
pub struct TangentOverlay {
    pub plane: TriangleMesh,
    pub marker: TriangleMesh,
    /// Line-list segments: shaft then the two head strokes.
    pub arrow: Vec<[Vec3; 2]>,
}

impl TangentOverlay {
    pub fn build(frame: TangentFrame, style: &OverlayStyle) -> Self {
        let plane = plane_patch(frame.point, frame.rotation, style.plane_size);
        let marker = uv_sphere(frame.point, style.marker_radius, 12, 8);

        let tip = frame.arrow_tip(style.arrow_scale);
        let length = frame.arrow_length(style.arrow_scale);
        let dir = frame.tangent.normalize_or_zero();
        // head strokes lean back along the shaft, inside the tangent plane
        let side = frame.normal.cross(dir);
        let head = length * 0.2;
        let back = tip - dir * head;

        let arrow = vec![
            [frame.point, tip],
            [tip, back + side * head * 0.5],
            [tip, back - side * head * 0.5],
        ];

        Self { plane, marker, arrow }
    }
}

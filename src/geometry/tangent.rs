use glam::{Quat, Vec3};

use crate::error::GeometryError;

/// World direction the tangent is projected from.
pub const REFERENCE_AXIS: Vec3 = Vec3::X;
/// Used instead of `REFERENCE_AXIS` when that is parallel to the normal.
pub const FALLBACK_AXIS: Vec3 = Vec3::Y;
/// Normal of an unrotated plane patch.
pub const PLANE_NORMAL: Vec3 = Vec3::Z;

const PARALLEL_EPSILON: f32 = 1e-6;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TangentFrame {
    pub point: Vec3,
    pub normal: Vec3,
    pub tangent: Vec3,
    /// Rotates `PLANE_NORMAL` onto `normal`.
    pub rotation: Quat,
    /// The reference direction actually projected.
    pub reference: Vec3,
}

impl TangentFrame {
    /// Builds the frame at `point`, which is taken to lie on a surface
    /// centred at the origin so that its outward normal is `normalize(point)`.
    pub fn build(point: Vec3, tangent_length: f32) -> Result<Self, GeometryError> {
        let normal = point
            .try_normalize()
            .ok_or(GeometryError::DegenerateSurfacePoint(point.to_array()))?;

        let reference = if REFERENCE_AXIS.dot(normal).abs() > 1.0 - PARALLEL_EPSILON {
            FALLBACK_AXIS
        } else {
            REFERENCE_AXIS
        };

        let projected = reference - reference.dot(normal) * normal;
        let tangent = projected.normalize() * tangent_length;

        Ok(Self {
            point,
            normal,
            tangent,
            rotation: Quat::from_rotation_arc(PLANE_NORMAL, normal),
            reference,
        })
    }

    /// Length of the arrow drawn from `point` along `tangent`.
    pub fn arrow_length(&self, arrow_scale: f32) -> f32 {
        self.tangent.length() * arrow_scale
    }

    pub fn arrow_tip(&self, arrow_scale: f32) -> Vec3 {
        self.point + self.tangent.normalize_or_zero() * self.arrow_length(arrow_scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    fn assert_vec_eq(a: Vec3, b: Vec3) {
        assert!((a - b).abs().max_element() < EPS, "{a:?} != {b:?}");
    }

    #[test]
    fn test_fixed_point_on_y_axis() {
        let frame = TangentFrame::build(Vec3::new(0.0, 2.0, 0.0), 0.3).unwrap();
        assert_vec_eq(frame.normal, Vec3::Y);
        assert_vec_eq(frame.tangent, Vec3::new(0.3, 0.0, 0.0));
        assert_eq!(frame.reference, REFERENCE_AXIS);
    }

    #[test]
    fn test_tangent_orthogonal_with_requested_length() {
        let points = [
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.3, -0.7, 0.2),
            Vec3::new(-5.0, 2.0, 9.0),
            Vec3::new(0.0, 0.0, -1.0),
            Vec3::new(0.99, 0.01, 0.0),
        ];

        for p in points {
            for len in [0.1, 0.3, 2.5] {
                let frame = TangentFrame::build(p, len).unwrap();
                assert!(frame.tangent.dot(frame.normal).abs() < EPS);
                assert!((frame.tangent.length() - len).abs() < EPS);
            }
        }
    }

    #[test]
    fn test_point_on_x_axis_uses_fallback() {
        for p in [Vec3::new(3.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0)] {
            let frame = TangentFrame::build(p, 0.3).unwrap();
            assert_eq!(frame.reference, FALLBACK_AXIS);
            assert!(frame.tangent.is_finite());
            assert!((frame.tangent.length() - 0.3).abs() < EPS);
            assert!(frame.tangent.dot(frame.normal).abs() < EPS);
        }
    }

    #[test]
    fn test_rotation_maps_plane_normal() {
        for p in [Vec3::Y, Vec3::new(1.0, 2.0, 3.0), Vec3::Z, Vec3::NEG_Z] {
            let frame = TangentFrame::build(p, 1.0).unwrap();
            assert_vec_eq(frame.rotation * PLANE_NORMAL, frame.normal);
        }
    }

    #[test]
    fn test_zero_point_rejected() {
        assert!(matches!(
            TangentFrame::build(Vec3::ZERO, 0.3),
            Err(GeometryError::DegenerateSurfacePoint(_))
        ));
        assert!(TangentFrame::build(Vec3::splat(f32::NAN), 0.3).is_err());
    }

    #[test]
    fn test_arrow_scaled_from_tangent_length() {
        let frame = TangentFrame::build(Vec3::new(0.0, 2.0, 0.0), 0.3).unwrap();
        assert!((frame.arrow_length(2.0) - 0.6).abs() < EPS);
        assert_vec_eq(frame.arrow_tip(2.0), Vec3::new(0.6, 2.0, 0.0));
    }
}

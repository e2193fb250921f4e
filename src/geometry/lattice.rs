use glam::Vec3;

use crate::error::GeometryError;

/// Upper bound on `nx * ny * nz` accepted by [`Lattice::generate`].
pub const MAX_LATTICE_POINTS: usize = 16_000_000;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LatticeSpec {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub size: f32,
}

impl Default for LatticeSpec {
    fn default() -> Self {
        Self {
            nx: 15,
            ny: 15,
            nz: 15,
            size: 4.0,
        }
    }
}

/// Sample positions along one lattice axis.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Axis {
    pub start: f32,
    pub step: f32,
    pub count: usize,
}

impl Axis {
    /// A single-sample axis sits at the extent midpoint. Its step is the
    /// whole extent so that the half-step slab around it stays non-empty.
    fn new(count: usize, size: f32) -> Self {
        if count == 1 {
            return Self {
                start: 0.0,
                step: size,
                count,
            };
        }

        Self {
            start: -size / 2.0,
            step: size / (count - 1) as f32,
            count,
        }
    }

    #[inline(always)]
    pub fn at(&self, index: usize) -> f32 {
        self.start + index as f32 * self.step
    }
}

pub struct Lattice {
    spec: LatticeSpec,
    x: Axis,
    y: Axis,
    z: Axis,
    points: Vec<Vec3>,
}

impl Lattice {
    pub fn generate(spec: LatticeSpec) -> Result<Self, GeometryError> {
        if spec.nx == 0 || spec.ny == 0 || spec.nz == 0 {
            return Err(GeometryError::InvalidResolution {
                nx: spec.nx,
                ny: spec.ny,
                nz: spec.nz,
            });
        }
        if !spec.size.is_finite() || spec.size <= 0.0 {
            return Err(GeometryError::InvalidExtent(spec.size));
        }

        let count = spec
            .nx
            .checked_mul(spec.ny)
            .and_then(|n| n.checked_mul(spec.nz))
            .filter(|&n| n <= MAX_LATTICE_POINTS)
            .ok_or(GeometryError::TooManyPoints {
                nx: spec.nx,
                ny: spec.ny,
                nz: spec.nz,
                max: MAX_LATTICE_POINTS,
            })?;

        let x = Axis::new(spec.nx, spec.size);
        let y = Axis::new(spec.ny, spec.size);
        let z = Axis::new(spec.nz, spec.size);

        let mut points = Vec::with_capacity(count);
        for i in 0..spec.nx {
            for j in 0..spec.ny {
                for k in 0..spec.nz {
                    points.push(Vec3::new(x.at(i), y.at(j), z.at(k)));
                }
            }
        }

        Ok(Self {
            spec,
            x,
            y,
            z,
            points,
        })
    }

    pub fn spec(&self) -> LatticeSpec {
        self.spec
    }

    pub fn points(&self) -> &[Vec3] {
        &self.points
    }

    pub fn axis_x(&self) -> Axis {
        self.x
    }

    pub fn axis_y(&self) -> Axis {
        self.y
    }

    pub fn axis_z(&self) -> Axis {
        self.z
    }

    pub fn layer_count(&self) -> usize {
        self.z.count
    }

    /// Points lying within half a z-step of the plane `z = start + k * dz`.
    ///
    /// An index outside `[0, nz)` selects a plane no lattice point is near,
    /// so the slice is empty rather than an error.
    pub fn layer(&self, k: usize) -> Vec<Vec3> {
        if k >= self.z.count {
            return Vec::new();
        }

        let z_target = self.z.at(k);
        let tolerance = self.z.step * 0.5;

        self.points
            .iter()
            .filter(|p| (p.z - z_target).abs() < tolerance)
            .copied()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-5;

    #[test]
    fn test_point_count_and_bounds() {
        for &(nx, ny, nz, size) in &[(2, 2, 2, 1.0), (15, 15, 15, 4.0), (3, 7, 5, 10.0)] {
            let lattice = Lattice::generate(LatticeSpec { nx, ny, nz, size }).unwrap();
            assert_eq!(lattice.points().len(), nx * ny * nz);

            let half = size / 2.0;
            for p in lattice.points() {
                for c in p.to_array() {
                    assert!(c >= -half - EPS && c <= half + EPS, "{c} outside ±{half}");
                }
            }

            let first = lattice.points()[0];
            let last = *lattice.points().last().unwrap();
            assert_eq!(first, Vec3::splat(-half));
            assert!((last - Vec3::splat(half)).abs().max_element() < EPS);
        }
    }

    #[test]
    fn test_generation_order_is_x_outer_z_inner() {
        let lattice = Lattice::generate(LatticeSpec {
            nx: 2,
            ny: 3,
            nz: 4,
            size: 2.0,
        })
        .unwrap();
        let pts = lattice.points();

        // z changes fastest
        assert_eq!(pts[0].x, pts[1].x);
        assert_eq!(pts[0].y, pts[1].y);
        assert!(pts[1].z > pts[0].z);
        // x changes only after a full y*z block
        assert_eq!(pts[11].x, -1.0);
        assert_eq!(pts[12].x, 1.0);
    }

    #[test]
    fn test_zero_resolution_rejected() {
        let err = Lattice::generate(LatticeSpec {
            nx: 0,
            ..Default::default()
        });
        assert!(matches!(err, Err(GeometryError::InvalidResolution { .. })));

        let err = Lattice::generate(LatticeSpec {
            size: f32::NAN,
            ..Default::default()
        });
        assert!(matches!(err, Err(GeometryError::InvalidExtent(_))));
    }

    #[test]
    fn test_oversized_lattice_rejected() {
        let err = Lattice::generate(LatticeSpec {
            nx: 1 << 22,
            ny: 1 << 22,
            nz: 1 << 22,
            size: 4.0,
        });
        assert!(matches!(err, Err(GeometryError::TooManyPoints { .. })));

        let err = Lattice::generate(LatticeSpec {
            nx: 1000,
            ny: 1000,
            nz: 1000,
            size: 4.0,
        });
        assert!(matches!(err, Err(GeometryError::TooManyPoints { max: MAX_LATTICE_POINTS, .. })));

        let err = Lattice::generate(LatticeSpec {
            nx: usize::MAX,
            ny: 2,
            nz: 1,
            size: 4.0,
        });
        assert!(matches!(err, Err(GeometryError::TooManyPoints { .. })));
    }

    #[test]
    fn test_single_resolution_places_midpoint() {
        let lattice = Lattice::generate(LatticeSpec {
            nx: 1,
            ny: 3,
            nz: 1,
            size: 4.0,
        })
        .unwrap();

        assert_eq!(lattice.points().len(), 3);
        assert!(lattice.points().iter().all(|p| p.is_finite()));
        assert!(lattice.points().iter().all(|p| p.x == 0.0 && p.z == 0.0));
        assert_eq!(lattice.layer(0).len(), 3);
        assert!(lattice.layer(1).is_empty());
    }

    #[test]
    fn test_every_layer_matches_filter() {
        let lattice = Lattice::generate(LatticeSpec::default()).unwrap();
        assert_eq!(lattice.points().len(), 3375);

        let dz = 4.0 / 14.0;
        for k in 0..15 {
            let target = -2.0 + k as f32 * dz;
            let expected: Vec<Vec3> = lattice
                .points()
                .iter()
                .filter(|p| (p.z - target).abs() < dz / 2.0)
                .copied()
                .collect();

            let slice = lattice.layer(k);
            assert!(!slice.is_empty(), "layer {k} empty");
            assert_eq!(slice, expected);
            assert_eq!(slice.len(), 15 * 15);
        }
    }

    #[test]
    fn test_out_of_range_layer_is_empty() {
        let lattice = Lattice::generate(LatticeSpec::default()).unwrap();
        assert!(lattice.layer(15).is_empty());
        assert!(lattice.layer(1000).is_empty());
        assert!(lattice.layer(usize::MAX).is_empty());
    }

    #[test]
    fn test_middle_layer_sits_at_origin() {
        let lattice = Lattice::generate(LatticeSpec::default()).unwrap();
        let slice = lattice.layer(7);

        assert!(!slice.is_empty());
        assert!(slice.iter().all(|p| p.z.abs() < EPS));
    }
}

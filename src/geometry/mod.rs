pub mod lattice;
pub mod mesh;
pub mod tangent;

pub use lattice::{Lattice, LatticeSpec};
pub use mesh::{TriangleMesh, plane_patch, uv_sphere};
pub use tangent::TangentFrame;

pub mod engine;
pub mod obj;

pub use engine::{LoadOutcome, MeshLoader};

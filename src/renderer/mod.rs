pub mod buffers;
pub mod camera;
pub mod gpu;

pub use gpu::GpuState;

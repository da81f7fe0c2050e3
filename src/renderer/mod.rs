pub mod camera;
pub mod gpu;

pub use camera::{Camera, Shading, TorusUniform};
pub use gpu::{GpuState, UploadError};

pub mod engine;
pub mod mesh;
pub mod normals;
pub mod presets;
pub mod torus;

pub use engine::{MeshEngine, MeshResult};
pub use mesh::{Tessellation, TriangleMesh};
pub use normals::estimate_normals;
pub use presets::TORUS_PRESETS;
pub use torus::{MeshError, TorusParams, generate};

//! CPU meshing: face culling with ramp-aware draw table, ramp corners,
//! lighting-aware triangulation and liquid surfaces.
#![forbid(unsafe_code)]

mod build;
mod face;
mod jitter;
mod liquid;
mod mesh_build;
mod ramps;
mod tables;

pub use build::{ChunkMesh, MeshConfig, MeshContext, build_chunk_mesh, face_visible};
pub use face::Face;
pub use jitter::Jitter;
pub use liquid::{LiquidMesh, build_liquid_mesh};
pub use mesh_build::{MeshBuffer, MeshStats, Vertex};
pub use ramps::{detect_ramp, update_ramps};
pub use tables::{FaceDrawTable, QUAD_INDICES_FLIPPED, QUAD_INDICES_NORMAL};

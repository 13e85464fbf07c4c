//! Dense voxel chunk storage: coordinates, ramp flags, cell and corner grids,
//! chunk flags, neighbor shells and persistence.
#![forbid(unsafe_code)]

mod cell;
mod chunk;
mod coord;
mod dims;
mod error;
mod flags;
mod persist;
mod ramp;
mod shell;
mod slot;

pub use cell::{CellGrid, CornerGrid, VertexColor, WaterCell};
pub use chunk::{CellRef, VoxelChunk};
pub use coord::ChunkCoord;
pub use dims::ChunkDims;
pub use error::ChunkError;
pub use flags::{ChunkFlags, ChunkFlagsLookup, ChunkState};
pub use persist::ChunkSnapshot;
pub use ramp::RampFlags;
pub use shell::{ChunkShell, ChunkView, NoNeighbors, ShellSample, VoxelLookup};
pub use slot::PendingSlot;

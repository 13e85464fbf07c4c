use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use voxlith_chunk::{ChunkCoord, ChunkDims, ChunkFlags, ChunkState, PendingSlot, VoxelChunk};
use voxlith_mesh_cpu::{ChunkMesh, LiquidMesh};

/// A solid mesh tagged with the generation it was published as.
#[derive(Debug)]
pub struct PublishedMesh {
    pub generation: u64,
    pub mesh: ChunkMesh,
}

/// One slot of the store: the chunk behind its lock, the flags shared with
/// workers, and the double-buffered meshes.
#[derive(Debug)]
pub struct ChunkEntry {
    coord: ChunkCoord,
    chunk: RwLock<VoxelChunk>,
    flags: Arc<ChunkFlags>,
    mesh: PendingSlot<PublishedMesh>,
    liquid_mesh: PendingSlot<LiquidMesh>,
}

impl ChunkEntry {
    /// Empty slot reserved while the chunk is generated.
    pub(crate) fn placeholder(coord: ChunkCoord, dims: ChunkDims) -> Self {
        let entry = Self::from_chunk(VoxelChunk::new(coord, dims));
        entry.flags.set_state(ChunkState::Generating);
        entry
    }

    pub(crate) fn from_chunk(chunk: VoxelChunk) -> Self {
        Self {
            coord: chunk.coord(),
            flags: Arc::clone(chunk.flags()),
            chunk: RwLock::new(chunk),
            mesh: PendingSlot::default(),
            liquid_mesh: PendingSlot::default(),
        }
    }

    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    pub fn flags(&self) -> &Arc<ChunkFlags> {
        &self.flags
    }

    pub fn state(&self) -> ChunkState {
        self.flags.state()
    }

    /// Generated or loaded, so its cells are meaningful to neighbors.
    pub fn is_populated(&self) -> bool {
        matches!(self.state(), ChunkState::MeshPending | ChunkState::Ready)
    }

    /// Holders must not acquire another chunk's lock.
    pub fn read(&self) -> RwLockReadGuard<'_, VoxelChunk> {
        self.chunk.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Holders must not acquire another chunk's lock.
    pub fn write(&self) -> RwLockWriteGuard<'_, VoxelChunk> {
        self.chunk.write().unwrap_or_else(|e| e.into_inner())
    }

    pub fn mesh(&self) -> &PendingSlot<PublishedMesh> {
        &self.mesh
    }

    pub fn liquid_mesh(&self) -> &PendingSlot<LiquidMesh> {
        &self.liquid_mesh
    }

    /// Generation of the mesh currently active on the owning thread.
    pub fn active_generation(&self) -> Option<u64> {
        self.mesh.with_active(|m| m.map(|m| m.generation))
    }
}

use serde::{Deserialize, Serialize};
use voxlith_geom::Vec3;
use voxlith_voxel::{VoxelCatalog, VoxelTypeId};

use crate::cell::{CellGrid, WaterCell};
use crate::chunk::VoxelChunk;
use crate::coord::ChunkCoord;
use crate::dims::ChunkDims;
use crate::error::ChunkError;

/// Persisted form of a chunk: dense cell arrays only. Ramps, lighting and
/// meshes are recomputed after loading.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub coord: ChunkCoord,
    pub origin: Vec3,
    pub dims: ChunkDims,
    pub types: Vec<VoxelTypeId>,
    pub health: Vec<u8>,
    pub water: Vec<WaterCell>,
}

impl ChunkSnapshot {
    pub fn encode(&self) -> Result<Vec<u8>, ChunkError> {
        Ok(bincode::serialize(self)?)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, ChunkError> {
        Ok(bincode::deserialize(bytes)?)
    }

    fn check_len(array: &'static str, expected: usize, found: usize) -> Result<(), ChunkError> {
        if expected == found {
            Ok(())
        } else {
            Err(ChunkError::LengthMismatch {
                array,
                expected,
                found,
            })
        }
    }
}

impl VoxelChunk {
    pub fn to_snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot {
            coord: self.coord(),
            origin: self.origin(),
            dims: self.dims(),
            types: self.cells.types.clone(),
            health: self.cells.health.clone(),
            water: self.cells.water.clone(),
        }
    }

    /// Rebuilds a chunk from a snapshot taken with the same dimensions.
    /// Orphan type ids are reported through the catalog.
    pub fn from_snapshot(
        snap: ChunkSnapshot,
        expected: ChunkDims,
        catalog: &VoxelCatalog,
    ) -> Result<Self, ChunkError> {
        if snap.dims != expected {
            return Err(ChunkError::DimensionMismatch {
                expected,
                found: snap.dims,
            });
        }
        let n = expected.volume();
        ChunkSnapshot::check_len("types", n, snap.types.len())?;
        ChunkSnapshot::check_len("health", n, snap.health.len())?;
        ChunkSnapshot::check_len("water", n, snap.water.len())?;
        if let Err(e) = catalog.validate_ids(snap.types.iter().copied()) {
            log::warn!(target: "runtime", "snapshot {:?}: {}", snap.coord, e);
        }
        let mut cells = CellGrid::new(expected);
        cells.types = snap.types;
        cells.health = snap.health;
        cells.water = snap.water;
        for w in cells.water.iter_mut() {
            w.normalize();
        }
        Ok(VoxelChunk::from_parts(snap.coord, expected, cells))
    }
}

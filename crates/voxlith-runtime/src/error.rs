use thiserror::Error;
use voxlith_chunk::{ChunkCoord, ChunkError};
use voxlith_liquid::LiquidError;
use voxlith_voxel::VoxelTypeId;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("chunk {0:?} is not loaded")]
    NotLoaded(ChunkCoord),
    #[error("voxel id {0} is not in the catalog")]
    UnknownVoxel(VoxelTypeId),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error(transparent)]
    Liquid(#[from] LiquidError),
    #[error("failed to build generation pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
    #[error("failed to spawn worker thread {name}: {source}")]
    Spawn {
        name: &'static str,
        #[source]
        source: std::io::Error,
    },
}

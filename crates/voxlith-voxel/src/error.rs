use std::path::PathBuf;

use thiserror::Error;

use crate::types::VoxelTypeId;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read voxel config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid voxel config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("voxel name `{0}` defined twice")]
    DuplicateName(String),
    #[error("voxel id {id} used by both `{first}` and `{second}`")]
    DuplicateId {
        id: VoxelTypeId,
        first: String,
        second: String,
    },
    #[error("voxel id 0 is reserved for air, found `{0}`")]
    ReservedAirId(String),
    #[error("more than 256 voxel types defined")]
    TooManyTypes,
    #[error("voxel id {0} does not resolve in the catalog")]
    OrphanId(VoxelTypeId),
}

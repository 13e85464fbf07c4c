//! Voxel type catalog: solidity, ramps, emission, tint and atlas regions.
#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod error;
pub mod types;

pub use catalog::VoxelCatalog;
pub use error::CatalogError;
pub use types::{AIR_ID, FaceRole, LiquidKind, UvRect, VoxelType, VoxelTypeId};

//! Terrain generation behind the `TerrainGenerator` producer interface.
#![forbid(unsafe_code)]

mod error;
mod generator;
pub mod worldgen;

pub use error::WorldConfigError;
pub use generator::{FlatGenerator, NoiseGenerator, TerrainGenerator, build_generator};
pub use worldgen::{Mode, WorldGenConfig};

use serde::{Deserialize, Serialize};
use voxlith_chunk::ChunkDims;
use voxlith_lighting::LightingConfig;
use voxlith_liquid::LiquidConfig;
use voxlith_mesh_cpu::MeshConfig;

/// `[runtime]` section of the engine config.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Threads in the generation pool.
    #[serde(default = "default_generation_workers")]
    pub generation_workers: usize,
    /// Milliseconds between liquid ticks in the driver loop.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_generation_workers() -> usize {
    2
}
fn default_tick_interval_ms() -> u64 {
    50
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            generation_workers: default_generation_workers(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// Everything a `ChunkStore` is built from besides the catalog and generator.
#[derive(Clone, Debug, Default)]
pub struct StoreConfig {
    pub dims: ChunkDims,
    pub lighting: LightingConfig,
    pub mesh: MeshConfig,
    pub liquid: LiquidConfig,
    pub runtime: RuntimeConfig,
}

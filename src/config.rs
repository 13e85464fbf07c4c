use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use voxlith_chunk::ChunkDims;
use voxlith_lighting::LightingConfig;
use voxlith_liquid::LiquidConfig;
use voxlith_mesh_cpu::MeshConfig;
use voxlith_runtime::{RuntimeConfig, StoreConfig};
use voxlith_world::WorldGenConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid engine config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("chunk size must be non-zero on every axis, got {0:?}")]
    ChunkSize(ChunkDims),
}

/// Contents of `engine.toml`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub world: WorldSection,
    #[serde(default)]
    pub lighting: LightingConfig,
    #[serde(default)]
    pub mesh: MeshConfig,
    #[serde(default)]
    pub liquid: LiquidConfig,
    #[serde(default)]
    pub runtime: RuntimeConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldSection {
    #[serde(default = "default_chunk_size")]
    pub chunk_size: ChunkDims,
    /// Chunks within this many chunk widths of the origin are loaded.
    #[serde(default = "default_chunk_radius")]
    pub chunk_radius: i32,
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default)]
    pub generation: WorldGenConfig,
}

fn default_chunk_size() -> ChunkDims {
    ChunkDims::new(16, 48, 16)
}
fn default_chunk_radius() -> i32 {
    2
}
fn default_seed() -> i32 {
    1337
}

impl Default for WorldSection {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_radius: default_chunk_radius(),
            seed: default_seed(),
            generation: WorldGenConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, ConfigError> {
        let cfg: EngineConfig = toml::from_str(src)?;
        let d = cfg.world.chunk_size;
        if d.sx == 0 || d.sy == 0 || d.sz == 0 {
            return Err(ConfigError::ChunkSize(d));
        }
        Ok(cfg)
    }

    /// Missing files fall back to defaults; unreadable or malformed ones are errors.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("engine config {} not found; using defaults", path.display());
            return Ok(Self::default());
        }
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            dims: self.world.chunk_size,
            lighting: self.lighting.clone(),
            mesh: self.mesh.clone(),
            liquid: self.liquid.clone(),
            runtime: self.runtime.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = EngineConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.world.chunk_size, ChunkDims::new(16, 48, 16));
        assert_eq!(cfg.world.chunk_radius, 2);
        assert!(cfg.lighting.sunlight);
        assert_eq!(cfg.liquid.phase_change_voxel, "stone");
    }

    #[test]
    fn sections_override_fields() {
        let src = r#"
            [world]
            chunk_size = { sx = 8, sy = 32, sz = 8 }
            chunk_radius = 1
            [world.generation]
            mode = "flat"
            [liquid]
            evaporation_threshold = 0
            [runtime]
            tick_interval_ms = 10
        "#;
        let cfg = EngineConfig::from_toml_str(src).unwrap();
        assert_eq!(cfg.world.chunk_size, ChunkDims::new(8, 32, 8));
        assert_eq!(cfg.world.generation.mode, voxlith_world::Mode::Flat);
        assert_eq!(cfg.liquid.evaporation_threshold, 0);
        assert_eq!(cfg.liquid.water_spread_rate, 0.25);
        assert_eq!(cfg.runtime.tick_interval_ms, 10);
        assert_eq!(cfg.runtime.generation_workers, 2);
    }

    #[test]
    fn shipped_assets_parse() {
        let cfg = EngineConfig::from_toml_str(include_str!("../assets/engine.toml")).unwrap();
        assert_eq!(cfg.runtime.tick_interval_ms, 20);
        let cat = voxlith_voxel::VoxelCatalog::from_toml_str(include_str!("../assets/voxels.toml"))
            .unwrap();
        assert_eq!(cat.len(), 7);
        assert!(cat.can_ramp(cat.id_by_name("grass").unwrap()));
        voxlith_liquid::LiquidSim::new(cfg.liquid, &cat).unwrap();
    }

    #[test]
    fn spread_rate_above_one_fails_simulation_setup() {
        let cfg = EngineConfig::from_toml_str("[liquid]\nwater_spread_rate = 2.0\n").unwrap();
        let cat = voxlith_voxel::VoxelCatalog::builtin();
        assert!(matches!(
            voxlith_liquid::LiquidSim::new(cfg.liquid, &cat),
            Err(voxlith_liquid::LiquidError::SpreadRate { name: "water_spread_rate", .. })
        ));
    }

    #[test]
    fn zero_chunk_axis_is_rejected() {
        let src = "[world]\nchunk_size = { sx = 0, sy = 32, sz = 8 }\n";
        assert!(matches!(
            EngineConfig::from_toml_str(src),
            Err(ConfigError::ChunkSize(_))
        ));
    }
}

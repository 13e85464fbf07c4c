use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LiquidConfig {
    /// Cells below this level may evaporate; 0 disables evaporation.
    #[serde(default = "default_evaporation_threshold")]
    pub evaporation_threshold: u8,
    #[serde(default = "default_evaporation_chance")]
    pub evaporation_chance: f32,
    #[serde(default = "default_water_spread_rate")]
    pub water_spread_rate: f32,
    /// Lava spreads at a random rate drawn from this range each transfer.
    #[serde(default = "default_lava_spread_min")]
    pub lava_spread_min: f32,
    #[serde(default = "default_lava_spread_max")]
    pub lava_spread_max: f32,
    /// Voxel a Water/Lava contact turns into.
    #[serde(default = "default_phase_change_voxel")]
    pub phase_change_voxel: String,
    #[serde(default = "default_rng_seed")]
    pub rng_seed: u64,
}

fn default_evaporation_threshold() -> u8 {
    6
}
fn default_evaporation_chance() -> f32 {
    0.02
}
fn default_water_spread_rate() -> f32 {
    0.25
}
fn default_lava_spread_min() -> f32 {
    0.04
}
fn default_lava_spread_max() -> f32 {
    0.12
}
fn default_phase_change_voxel() -> String {
    "stone".to_string()
}
fn default_rng_seed() -> u64 {
    0x5EED_F10D
}

impl Default for LiquidConfig {
    fn default() -> Self {
        Self {
            evaporation_threshold: default_evaporation_threshold(),
            evaporation_chance: default_evaporation_chance(),
            water_spread_rate: default_water_spread_rate(),
            lava_spread_min: default_lava_spread_min(),
            lava_spread_max: default_lava_spread_max(),
            phase_change_voxel: default_phase_change_voxel(),
            rng_seed: default_rng_seed(),
        }
    }
}

impl LiquidConfig {
    pub fn without_evaporation(mut self) -> Self {
        self.evaporation_threshold = 0;
        self
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LiquidError {
    #[error("phase change voxel `{0}` is not in the catalog")]
    UnknownPhaseVoxel(String),
    #[error("phase change voxel `{0}` is not solid")]
    PhaseVoxelNotSolid(String),
    #[error("{name} must be a fraction in [0, 1], got {value}")]
    SpreadRate { name: &'static str, value: f32 },
    #[error("lava spread range is inverted: min {min} > max {max}")]
    LavaSpreadRange { min: f32, max: f32 },
}

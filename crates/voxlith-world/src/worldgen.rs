use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::WorldConfigError;

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default)]
    pub height: Height,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub water: Water,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            mode: Mode::Normal,
            flat: Flat::default(),
            height: Height::default(),
            surface: Surface::default(),
            water: Water::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Flat,
}

fn default_mode() -> Mode {
    Mode::Normal
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    /// Solid layers at world `y < thickness`.
    #[serde(default = "default_flat_thickness")]
    pub thickness: i32,
    #[serde(default = "default_flat_voxel")]
    pub voxel: String,
}
fn default_flat_thickness() -> i32 {
    1
}
fn default_flat_voxel() -> String {
    "stone".into()
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            thickness: default_flat_thickness(),
            voxel: default_flat_voxel(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Height {
    #[serde(default = "default_height_freq")]
    pub frequency: f32,
    #[serde(default = "default_base_height")]
    pub base: i32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
}
fn default_height_freq() -> f32 {
    0.02
}
fn default_base_height() -> i32 {
    20
}
fn default_amplitude() -> f32 {
    10.0
}
impl Default for Height {
    fn default() -> Self {
        Self {
            frequency: default_height_freq(),
            base: default_base_height(),
            amplitude: default_amplitude(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_topsoil")]
    pub topsoil_thickness: i32,
    #[serde(default = "default_top")]
    pub top: String,
    /// Top voxel used for columns at or below the water level.
    #[serde(default = "default_shore")]
    pub shore: String,
    #[serde(default = "default_subsoil")]
    pub subsoil: String,
    #[serde(default = "default_deep")]
    pub deep: String,
}
fn default_topsoil() -> i32 {
    3
}
fn default_top() -> String {
    "grass".into()
}
fn default_shore() -> String {
    "sand".into()
}
fn default_subsoil() -> String {
    "dirt".into()
}
fn default_deep() -> String {
    "stone".into()
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            topsoil_thickness: default_topsoil(),
            top: default_top(),
            shore: default_shore(),
            subsoil: default_subsoil(),
            deep: default_deep(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Water {
    #[serde(default = "default_water_enable")]
    pub enable: bool,
    /// Empty cells at world `y < level` are filled with full water.
    #[serde(default = "default_water_level")]
    pub level: i32,
}
fn default_water_enable() -> bool {
    true
}
fn default_water_level() -> i32 {
    16
}
impl Default for Water {
    fn default() -> Self {
        Self {
            enable: default_water_enable(),
            level: default_water_level(),
        }
    }
}

pub fn load_from_path(path: &Path) -> Result<WorldGenConfig, WorldConfigError> {
    let s = fs::read_to_string(path).map_err(|source| WorldConfigError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(toml::from_str(&s)?)
}

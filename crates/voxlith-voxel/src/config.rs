use serde::Deserialize;

// Top-level voxel catalog file
#[derive(Deserialize, Debug, Clone, Default)]
pub struct VoxelsConfig {
    #[serde(default)]
    pub atlas: AtlasDef,
    #[serde(default)]
    pub voxels: Vec<VoxelDef>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct AtlasDef {
    #[serde(default = "default_tiles")]
    pub tiles_x: u32,
    #[serde(default = "default_tiles")]
    pub tiles_y: u32,
}

fn default_tiles() -> u32 {
    16
}

impl Default for AtlasDef {
    fn default() -> Self {
        Self {
            tiles_x: default_tiles(),
            tiles_y: default_tiles(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct VoxelDef {
    pub name: String,
    #[serde(default)]
    pub id: Option<u8>,
    #[serde(default)]
    pub solid: Option<bool>,
    #[serde(default)]
    pub can_ramp: Option<bool>,
    #[serde(default)]
    pub emits_light: Option<bool>,
    #[serde(default)]
    pub tint: Option<[u8; 4]>,
    #[serde(default)]
    pub health: Option<u8>,
    #[serde(default)]
    pub texture: Option<TextureDef>,
}

impl VoxelDef {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            id: None,
            solid: None,
            can_ramp: None,
            emits_light: None,
            tint: None,
            health: None,
            texture: None,
        }
    }
}

// Texture config supports either one tile for every face or a per-role table
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum TextureDef {
    Tile([u32; 2]),
    Faces(FaceTiles),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FaceTiles {
    #[serde(default)]
    pub all: Option<[u32; 2]>,
    #[serde(default)]
    pub top: Option<[u32; 2]>,
    #[serde(default)]
    pub bottom: Option<[u32; 2]>,
    #[serde(default)]
    pub side: Option<[u32; 2]>,
}

impl TextureDef {
    /// Resolves `(top, bottom, side)` tiles, falling back to `all` then tile 0.
    pub fn resolve(&self) -> ([u32; 2], [u32; 2], [u32; 2]) {
        match self {
            TextureDef::Tile(t) => (*t, *t, *t),
            TextureDef::Faces(f) => {
                let all = f.all.unwrap_or([0, 0]);
                (
                    f.top.unwrap_or(all),
                    f.bottom.unwrap_or(all),
                    f.side.unwrap_or(all),
                )
            }
        }
    }
}

use serde::{Deserialize, Serialize};

pub type VoxelTypeId = u8;

/// Id 0 is always empty space.
pub const AIR_ID: VoxelTypeId = 0;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiquidKind {
    #[default]
    None,
    Water,
    Lava,
}

impl LiquidKind {
    /// Liquids that produce their own mesh buffer.
    pub const FLOWING: [LiquidKind; 2] = [LiquidKind::Water, LiquidKind::Lava];

    #[inline]
    pub fn is_none(self) -> bool {
        matches!(self, LiquidKind::None)
    }

    /// Dense index for per-kind storage; `None` has no slot.
    #[inline]
    pub fn slot(self) -> Option<usize> {
        match self {
            LiquidKind::None => None,
            LiquidKind::Water => Some(0),
            LiquidKind::Lava => Some(1),
        }
    }
}

// Used by the mesher to pick a texture region per face
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceRole {
    Top,
    Bottom,
    Side,
}

impl FaceRole {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            FaceRole::Top => 0,
            FaceRole::Bottom => 1,
            FaceRole::Side => 2,
        }
    }
}

/// Normalized atlas rectangle; `v` grows downward.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    pub u0: f32,
    pub v0: f32,
    pub u1: f32,
    pub v1: f32,
}

impl UvRect {
    pub fn from_tile(tile: [u32; 2], tiles_x: u32, tiles_y: u32) -> Self {
        let tw = 1.0 / tiles_x.max(1) as f32;
        let th = 1.0 / tiles_y.max(1) as f32;
        Self {
            u0: tile[0] as f32 * tw,
            v0: tile[1] as f32 * th,
            u1: (tile[0] + 1) as f32 * tw,
            v1: (tile[1] + 1) as f32 * th,
        }
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.u1 - self.u0
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.v1 - self.v0
    }

    /// Maps a `[0,1]` local coordinate into the rectangle.
    #[inline]
    pub fn lerp(&self, u: f32, v: f32) -> [f32; 2] {
        [self.u0 + u * self.width(), self.v0 + v * self.height()]
    }

    #[inline]
    pub fn bounds(&self) -> [f32; 4] {
        [self.u0, self.v0, self.u1, self.v1]
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct VoxelType {
    pub id: VoxelTypeId,
    pub name: String,
    pub solid: bool,
    pub can_ramp: bool,
    pub emits_light: bool,
    pub tint: [u8; 4],
    pub starting_health: u8,
    /// Baked UVs indexed by `FaceRole::index`.
    pub uvs: [UvRect; 3],
}

impl VoxelType {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.id == AIR_ID || !self.solid
    }

    #[inline]
    pub fn uv_for(&self, role: FaceRole) -> UvRect {
        self.uvs[role.index()]
    }
}

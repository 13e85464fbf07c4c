use serde::{Deserialize, Serialize};
use voxlith_voxel::{AIR_ID, LiquidKind, VoxelTypeId};

use crate::dims::ChunkDims;
use crate::ramp::RampFlags;

/// Liquid stored in a single cell. `level == 0` always pairs with `LiquidKind::None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaterCell {
    pub level: u8,
    pub kind: LiquidKind,
    #[serde(skip)]
    pub changed_this_tick: bool,
    #[serde(skip)]
    pub is_falling: bool,
}

impl WaterCell {
    pub const EMPTY: WaterCell = WaterCell {
        level: 0,
        kind: LiquidKind::None,
        changed_this_tick: false,
        is_falling: false,
    };

    pub fn new(kind: LiquidKind, level: u8) -> Self {
        let mut w = WaterCell {
            level,
            kind,
            ..WaterCell::EMPTY
        };
        w.normalize();
        w
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.level == 0
    }

    /// Restores the `level == 0 <=> kind == None` pairing.
    #[inline]
    pub fn normalize(&mut self) {
        if self.level == 0 || self.kind.is_none() {
            self.level = 0;
            self.kind = LiquidKind::None;
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        *self = WaterCell::EMPTY;
    }
}

/// Light at a single vertex-corner.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct VertexColor {
    pub sun: u8,
    pub ambient: u8,
    pub dynamic: u8,
}

impl VertexColor {
    pub const DARK: VertexColor = VertexColor {
        sun: 0,
        ambient: 0,
        dynamic: 0,
    };

    /// Scalar brightness used to pick the quad diagonal.
    #[inline]
    pub fn intensity(self) -> u16 {
        u16::from(self.sun.max(self.dynamic)) + u16::from(self.ambient)
    }

    #[inline]
    pub fn rgba(self) -> [u8; 4] {
        [self.sun, self.ambient, self.dynamic, 255]
    }
}

/// Per-cell parallel arrays indexed by `ChunkDims::idx`.
#[derive(Clone, Debug)]
pub struct CellGrid {
    pub dims: ChunkDims,
    pub types: Vec<VoxelTypeId>,
    pub health: Vec<u8>,
    pub ramps: Vec<RampFlags>,
    pub visible: Vec<bool>,
    pub needs_lighting_recalc: Vec<bool>,
    pub sun: Vec<u8>,
    pub water: Vec<WaterCell>,
}

impl CellGrid {
    pub fn new(dims: ChunkDims) -> Self {
        let n = dims.volume();
        Self {
            dims,
            types: vec![AIR_ID; n],
            health: vec![0; n],
            ramps: vec![RampFlags::NONE; n],
            visible: vec![false; n],
            needs_lighting_recalc: vec![true; n],
            sun: vec![0; n],
            water: vec![WaterCell::EMPTY; n],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        self.dims.idx(x, y, z)
    }

    #[inline]
    pub fn type_at(&self, x: usize, y: usize, z: usize) -> VoxelTypeId {
        self.types[self.idx(x, y, z)]
    }

    pub fn any_needs_lighting(&self) -> bool {
        self.needs_lighting_recalc.iter().any(|&b| b)
    }

    pub fn mark_all_for_lighting(&mut self) {
        self.needs_lighting_recalc.fill(true);
    }
}

/// Per-corner colors, `(sx+1)*(sy+1)*(sz+1)` entries indexed by `ChunkDims::corner_idx`.
#[derive(Clone, Debug)]
pub struct CornerGrid {
    pub dims: ChunkDims,
    pub colors: Vec<VertexColor>,
}

impl CornerGrid {
    pub fn new(dims: ChunkDims) -> Self {
        Self {
            dims,
            colors: vec![VertexColor::DARK; dims.corner_volume()],
        }
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> VertexColor {
        self.colors[self.dims.corner_idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, c: VertexColor) {
        let i = self.dims.corner_idx(x, y, z);
        self.colors[i] = c;
    }
}

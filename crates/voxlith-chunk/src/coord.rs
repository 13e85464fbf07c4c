use serde::{Deserialize, Serialize};
use voxlith_geom::Vec3;

use crate::dims::ChunkDims;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    /// Chunk containing world voxel `(wx,wy,wz)` and the voxel's local position in it.
    #[inline]
    pub fn from_world(wx: i32, wy: i32, wz: i32, dims: ChunkDims) -> (ChunkCoord, [usize; 3]) {
        let (sx, sy, sz) = (dims.sx as i32, dims.sy as i32, dims.sz as i32);
        let coord = ChunkCoord::new(wx.div_euclid(sx), wy.div_euclid(sy), wz.div_euclid(sz));
        let local = [
            wx.rem_euclid(sx) as usize,
            wy.rem_euclid(sy) as usize,
            wz.rem_euclid(sz) as usize,
        ];
        (coord, local)
    }

    /// World voxel position of local `(0,0,0)`.
    #[inline]
    pub fn base(self, dims: ChunkDims) -> [i32; 3] {
        [
            self.cx * dims.sx as i32,
            self.cy * dims.sy as i32,
            self.cz * dims.sz as i32,
        ]
    }

    #[inline]
    pub fn origin(self, dims: ChunkDims) -> Vec3 {
        let [x, y, z] = self.base(dims);
        Vec3::new(x as f32, y as f32, z as f32)
    }

    /// Face-adjacent neighbors in `+X,-X,+Y,-Y,+Z,-Z` order.
    #[inline]
    pub fn face_neighbors(self) -> [ChunkCoord; 6] {
        [
            self.offset(1, 0, 0),
            self.offset(-1, 0, 0),
            self.offset(0, 1, 0),
            self.offset(0, -1, 0),
            self.offset(0, 0, 1),
            self.offset(0, 0, -1),
        ]
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

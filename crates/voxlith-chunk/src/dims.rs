use serde::{Deserialize, Serialize};

/// Fixed voxel dimensions of every chunk in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChunkDims {
    pub sx: usize,
    pub sy: usize,
    pub sz: usize,
}

impl Default for ChunkDims {
    fn default() -> Self {
        Self::new(16, 48, 16)
    }
}

impl ChunkDims {
    #[inline]
    pub const fn new(sx: usize, sy: usize, sz: usize) -> Self {
        Self { sx, sy, sz }
    }

    #[inline]
    pub fn volume(&self) -> usize {
        self.sx * self.sy * self.sz
    }

    /// Size of the per-corner grid, one larger than the cell grid on each axis.
    #[inline]
    pub fn corner_volume(&self) -> usize {
        (self.sx + 1) * (self.sy + 1) * (self.sz + 1)
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.sz + z) * self.sx + x
    }

    #[inline]
    pub fn corner_idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * (self.sz + 1) + z) * (self.sx + 1) + x
    }

    /// Inverse of `idx`.
    #[inline]
    pub fn pos(&self, i: usize) -> [usize; 3] {
        let x = i % self.sx;
        let z = (i / self.sx) % self.sz;
        let y = i / (self.sx * self.sz);
        [x, y, z]
    }

    #[inline]
    pub fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        x >= 0
            && y >= 0
            && z >= 0
            && (x as usize) < self.sx
            && (y as usize) < self.sy
            && (z as usize) < self.sz
    }

    /// Offsets of every neighbor chunk (faces, edges and corners) whose one-voxel
    /// shell includes local voxel `(x,y,z)`.
    pub fn touching_neighbors(&self, x: usize, y: usize, z: usize) -> Vec<(i32, i32, i32)> {
        let axis = |v: usize, n: usize| -> Vec<i32> {
            let mut a = vec![0];
            if v == 0 {
                a.push(-1);
            }
            if v + 1 == n {
                a.push(1);
            }
            a
        };
        let (ax, ay, az) = (axis(x, self.sx), axis(y, self.sy), axis(z, self.sz));
        let mut out = Vec::new();
        for &dy in &ay {
            for &dz in &az {
                for &dx in &ax {
                    if (dx, dy, dz) != (0, 0, 0) {
                        out.push((dx, dy, dz));
                    }
                }
            }
        }
        out
    }
}

use voxlith_voxel::{AIR_ID, VoxelCatalog, VoxelTypeId};

use crate::cell::{CellGrid, WaterCell};
use crate::coord::ChunkCoord;
use crate::dims::ChunkDims;
use crate::ramp::RampFlags;

/// What a lookup found at one voxel position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ShellSample {
    /// The owning chunk is not loaded (or not generated yet).
    Missing,
    Voxel {
        type_id: VoxelTypeId,
        ramp: RampFlags,
        sun: u8,
        water: WaterCell,
    },
}

impl ShellSample {
    pub const AIR: ShellSample = ShellSample::Voxel {
        type_id: AIR_ID,
        ramp: RampFlags::NONE,
        sun: 0,
        water: WaterCell::EMPTY,
    };

    #[inline]
    pub fn is_missing(&self) -> bool {
        matches!(self, ShellSample::Missing)
    }

    #[inline]
    pub fn type_id(&self) -> Option<VoxelTypeId> {
        match self {
            ShellSample::Missing => None,
            ShellSample::Voxel { type_id, .. } => Some(*type_id),
        }
    }

    /// Present and non-solid.
    #[inline]
    pub fn is_empty(&self, catalog: &VoxelCatalog) -> bool {
        matches!(self, ShellSample::Voxel { type_id, .. } if !catalog.is_solid(*type_id))
    }

    /// Present and solid.
    #[inline]
    pub fn is_solid(&self, catalog: &VoxelCatalog) -> bool {
        matches!(self, ShellSample::Voxel { type_id, .. } if catalog.is_solid(*type_id))
    }

    #[inline]
    pub fn ramp(&self) -> RampFlags {
        match self {
            ShellSample::Missing => RampFlags::NONE,
            ShellSample::Voxel { ramp, .. } => *ramp,
        }
    }

    #[inline]
    pub fn water(&self) -> Option<WaterCell> {
        match self {
            ShellSample::Missing => None,
            ShellSample::Voxel { water, .. } => Some(*water),
        }
    }

    #[inline]
    pub fn sun(&self) -> u8 {
        match self {
            ShellSample::Missing => 0,
            ShellSample::Voxel { sun, .. } => *sun,
        }
    }
}

/// Cross-chunk voxel access by world position.
pub trait VoxelLookup {
    fn sample_world(&self, wx: i32, wy: i32, wz: i32) -> ShellSample;
}

/// Lookup that sees nothing; every neighbor is `Missing`.
pub struct NoNeighbors;

impl VoxelLookup for NoNeighbors {
    fn sample_world(&self, _wx: i32, _wy: i32, _wz: i32) -> ShellSample {
        ShellSample::Missing
    }
}

/// Snapshot of the one-voxel layer surrounding a chunk.
///
/// Stored as a padded `(sx+2)*(sy+2)*(sz+2)` grid; only the outer layer is
/// meaningful. Gathered before the owning chunk is locked so no chunk lock is
/// ever held while another is acquired.
#[derive(Clone, Debug)]
pub struct ChunkShell {
    dims: ChunkDims,
    samples: Vec<ShellSample>,
}

impl ChunkShell {
    pub fn missing(dims: ChunkDims) -> Self {
        let n = (dims.sx + 2) * (dims.sy + 2) * (dims.sz + 2);
        Self {
            dims,
            samples: vec![ShellSample::Missing; n],
        }
    }

    pub fn gather(coord: ChunkCoord, dims: ChunkDims, lookup: &impl VoxelLookup) -> Self {
        let mut shell = Self::missing(dims);
        let [bx, by, bz] = coord.base(dims);
        let (sx, sy, sz) = (dims.sx as i32, dims.sy as i32, dims.sz as i32);
        for y in -1..=sy {
            for z in -1..=sz {
                for x in -1..=sx {
                    if dims.contains(x, y, z) {
                        continue;
                    }
                    let i = shell.padded_idx(x, y, z);
                    shell.samples[i] = lookup.sample_world(bx + x, by + y, bz + z);
                }
            }
        }
        shell
    }

    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    #[inline]
    fn padded_idx(&self, x: i32, y: i32, z: i32) -> usize {
        let px = (x + 1) as usize;
        let py = (y + 1) as usize;
        let pz = (z + 1) as usize;
        (py * (self.dims.sz + 2) + pz) * (self.dims.sx + 2) + px
    }

    /// Sample at local `(x,y,z)`; positions further than one voxel out are `Missing`.
    #[inline]
    pub fn get(&self, x: i32, y: i32, z: i32) -> ShellSample {
        let (sx, sy, sz) = (self.dims.sx as i32, self.dims.sy as i32, self.dims.sz as i32);
        if x < -1 || y < -1 || z < -1 || x > sx || y > sy || z > sz {
            return ShellSample::Missing;
        }
        self.samples[self.padded_idx(x, y, z)]
    }

    /// Overwrites one shell position. Interior positions are ignored.
    pub fn set(&mut self, x: i32, y: i32, z: i32, sample: ShellSample) {
        if self.dims.contains(x, y, z) {
            return;
        }
        let (sx, sy, sz) = (self.dims.sx as i32, self.dims.sy as i32, self.dims.sz as i32);
        if x < -1 || y < -1 || z < -1 || x > sx || y > sy || z > sz {
            return;
        }
        let i = self.padded_idx(x, y, z);
        self.samples[i] = sample;
    }

    /// Fills every shell position with `sample`.
    pub fn fill(&mut self, sample: ShellSample) {
        self.samples.fill(sample);
    }
}

/// Read-only view over a chunk's cells plus its surrounding shell.
#[derive(Clone, Copy)]
pub struct ChunkView<'a> {
    pub cells: &'a CellGrid,
    pub shell: &'a ChunkShell,
}

impl<'a> ChunkView<'a> {
    pub fn new(cells: &'a CellGrid, shell: &'a ChunkShell) -> Self {
        Self { cells, shell }
    }

    #[inline]
    pub fn sample(&self, x: i32, y: i32, z: i32) -> ShellSample {
        let d = self.cells.dims;
        if d.contains(x, y, z) {
            let i = d.idx(x as usize, y as usize, z as usize);
            ShellSample::Voxel {
                type_id: self.cells.types[i],
                ramp: self.cells.ramps[i],
                sun: self.cells.sun[i],
                water: self.cells.water[i],
            }
        } else {
            self.shell.get(x, y, z)
        }
    }

    #[inline]
    pub fn type_id(&self, x: i32, y: i32, z: i32) -> Option<VoxelTypeId> {
        let d = self.cells.dims;
        if d.contains(x, y, z) {
            Some(self.cells.types[d.idx(x as usize, y as usize, z as usize)])
        } else {
            self.shell.get(x, y, z).type_id()
        }
    }
}

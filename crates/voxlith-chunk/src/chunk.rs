use std::sync::Arc;

use voxlith_geom::Vec3;
use voxlith_voxel::{AIR_ID, LiquidKind, VoxelCatalog, VoxelTypeId};

use crate::cell::{CellGrid, CornerGrid, WaterCell};
use crate::coord::ChunkCoord;
use crate::dims::ChunkDims;
use crate::error::ChunkError;
use crate::flags::{ChunkFlags, ChunkFlagsLookup};
use crate::ramp::RampFlags;
use crate::shell::{ShellSample, VoxelLookup};

/// Copy of one cell's attributes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRef {
    pub type_id: VoxelTypeId,
    pub health: u8,
    pub ramp: RampFlags,
    pub visible: bool,
    pub sun: u8,
    pub water: WaterCell,
}

/// A fixed-size block of voxels with its derived lighting data and dirty flags.
///
/// Neighbors are never referenced directly; `neighbor_keys` names them and the
/// owning store resolves them.
#[derive(Debug)]
pub struct VoxelChunk {
    coord: ChunkCoord,
    dims: ChunkDims,
    origin: Vec3,
    pub cells: CellGrid,
    pub corners: CornerGrid,
    flags: Arc<ChunkFlags>,
}

impl VoxelChunk {
    pub fn new(coord: ChunkCoord, dims: ChunkDims) -> Self {
        let flags = Arc::new(ChunkFlags::default());
        flags.mark_relight_all();
        Self {
            coord,
            dims,
            origin: coord.origin(dims),
            cells: CellGrid::new(dims),
            corners: CornerGrid::new(dims),
            flags,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }
    #[inline]
    pub fn dims(&self) -> ChunkDims {
        self.dims
    }
    #[inline]
    pub fn origin(&self) -> Vec3 {
        self.origin
    }
    #[inline]
    pub fn flags(&self) -> &Arc<ChunkFlags> {
        &self.flags
    }

    /// Replaces this chunk's flags with a shared block, e.g. when a store
    /// swaps a generated chunk into an existing slot. Marks a full relight.
    pub fn attach_flags(&mut self, flags: Arc<ChunkFlags>) {
        self.flags = flags;
        self.flags.mark_relight_all();
    }

    /// Keys of the six face-adjacent chunks, `+X,-X,+Y,-Y,+Z,-Z`.
    #[inline]
    pub fn neighbor_keys(&self) -> [ChunkCoord; 6] {
        self.coord.face_neighbors()
    }

    #[inline]
    pub fn in_bounds(&self, x: i32, y: i32, z: i32) -> bool {
        self.dims.contains(x, y, z)
    }

    fn checked_idx(&self, x: i32, y: i32, z: i32) -> Result<usize, ChunkError> {
        if self.in_bounds(x, y, z) {
            Ok(self.dims.idx(x as usize, y as usize, z as usize))
        } else {
            Err(ChunkError::OutOfBounds { x, y, z })
        }
    }

    pub fn world_to_local(&self, wx: i32, wy: i32, wz: i32) -> Option<[usize; 3]> {
        let [bx, by, bz] = self.coord.base(self.dims);
        let (x, y, z) = (wx - bx, wy - by, wz - bz);
        self.in_bounds(x, y, z)
            .then_some([x as usize, y as usize, z as usize])
    }

    #[inline]
    pub fn local_to_world(&self, x: i32, y: i32, z: i32) -> [i32; 3] {
        let [bx, by, bz] = self.coord.base(self.dims);
        [bx + x, by + y, bz + z]
    }

    pub fn get(&self, x: i32, y: i32, z: i32) -> Option<CellRef> {
        let i = self.checked_idx(x, y, z).ok()?;
        let c = &self.cells;
        Some(CellRef {
            type_id: c.types[i],
            health: c.health[i],
            ramp: c.ramps[i],
            visible: c.visible[i],
            sun: c.sun[i],
            water: c.water[i],
        })
    }

    #[inline]
    pub fn type_at(&self, x: i32, y: i32, z: i32) -> Option<VoxelTypeId> {
        self.checked_idx(x, y, z).ok().map(|i| self.cells.types[i])
    }

    /// Reads a local position that may lie outside the chunk, falling back to
    /// the world lookup for neighbors.
    pub fn sample(&self, x: i32, y: i32, z: i32, world: &impl VoxelLookup) -> ShellSample {
        match self.get(x, y, z) {
            Some(c) => ShellSample::Voxel {
                type_id: c.type_id,
                ramp: c.ramp,
                sun: c.sun,
                water: c.water,
            },
            None => {
                let [wx, wy, wz] = self.local_to_world(x, y, z);
                world.sample_world(wx, wy, wz)
            }
        }
    }

    /// Writes a voxel type. Returns whether the cell changed.
    ///
    /// Placing a solid clears any liquid in the cell; health resets to the
    /// type's starting health.
    pub fn set_type(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        type_id: VoxelTypeId,
        catalog: &VoxelCatalog,
    ) -> Result<bool, ChunkError> {
        let i = self.checked_idx(x, y, z)?;
        if self.cells.types[i] == type_id {
            return Ok(false);
        }
        self.cells.types[i] = type_id;
        self.cells.health[i] = catalog
            .get_type(type_id)
            .map(|t| t.starting_health)
            .unwrap_or(0);
        self.cells.ramps[i] = RampFlags::NONE;
        if catalog.is_solid(type_id) && !self.cells.water[i].is_empty() {
            self.cells.water[i].clear();
            self.flags.mark_liquid_dirty();
        }
        self.mark_cell_for_lighting(x as usize, y as usize, z as usize);
        self.flags.mark_lighting_dirty();
        Ok(true)
    }

    /// Flags the cell and its face neighbors inside this chunk, which covers
    /// every corner the cell touches plus the neighbors whose exposure changed.
    fn mark_cell_for_lighting(&mut self, x: usize, y: usize, z: usize) {
        let d = self.dims;
        let i = d.idx(x, y, z);
        self.cells.needs_lighting_recalc[i] = true;
        for (dx, dy, dz) in [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)] {
            let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
            if d.contains(nx, ny, nz) {
                let j = d.idx(nx as usize, ny as usize, nz as usize);
                self.cells.needs_lighting_recalc[j] = true;
            }
        }
    }

    pub fn set_water(&mut self, x: i32, y: i32, z: i32, water: WaterCell) -> Result<(), ChunkError> {
        let i = self.checked_idx(x, y, z)?;
        let mut w = water;
        w.normalize();
        if self.cells.water[i] != w {
            self.cells.water[i] = w;
            self.flags.mark_liquid_dirty();
        }
        Ok(())
    }

    /// Adds liquid to a non-solid cell, saturating at 255. Returns the amount added.
    pub fn pour(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        kind: LiquidKind,
        amount: u8,
        catalog: &VoxelCatalog,
    ) -> Result<u8, ChunkError> {
        let i = self.checked_idx(x, y, z)?;
        if catalog.is_solid(self.cells.types[i]) || kind.is_none() {
            return Ok(0);
        }
        let w = &mut self.cells.water[i];
        if !w.is_empty() && w.kind != kind {
            return Ok(0);
        }
        let added = amount.min(255 - w.level);
        if added > 0 {
            w.level += added;
            w.kind = kind;
            self.flags.mark_liquid_dirty();
        }
        Ok(added)
    }

    /// Lowers health; a solid voxel reaching zero becomes air. Returns true when it broke.
    pub fn damage(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        amount: u8,
        catalog: &VoxelCatalog,
    ) -> Result<bool, ChunkError> {
        let i = self.checked_idx(x, y, z)?;
        if !catalog.is_solid(self.cells.types[i]) {
            return Ok(false);
        }
        let h = self.cells.health[i].saturating_sub(amount);
        self.cells.health[i] = h;
        if h == 0 {
            self.set_type(x, y, z, AIR_ID, catalog)?;
            return Ok(true);
        }
        Ok(false)
    }

    /// Topmost non-empty y in column `(x, z)`.
    pub fn filled_height(&self, x: usize, z: usize, catalog: &VoxelCatalog) -> Option<usize> {
        if x >= self.dims.sx || z >= self.dims.sz {
            return None;
        }
        (0..self.dims.sy)
            .rev()
            .find(|&y| catalog.is_solid(self.cells.types[self.dims.idx(x, y, z)]))
    }

    pub fn liquid_level_sum(&self) -> u64 {
        self.cells.water.iter().map(|w| u64::from(w.level)).sum()
    }

    pub fn has_liquid(&self) -> bool {
        self.cells.water.iter().any(|w| !w.is_empty())
    }

    /// Marks this chunk for a full relight, liquid and mesh rebuild, and
    /// dirties every loaded face neighbor so shared boundaries are redone.
    pub fn notify_total_rebuild(&mut self, neighbors: &impl ChunkFlagsLookup) {
        self.cells.mark_all_for_lighting();
        self.flags.mark_relight_all();
        self.flags.mark_liquid_dirty();
        for key in self.neighbor_keys() {
            if let Some(f) = neighbors.chunk_flags(key) {
                f.mark_relight_all();
                f.mark_liquid_dirty();
            }
        }
    }

    /// Type ids present in the chunk, for catalog validation.
    pub fn type_ids(&self) -> impl Iterator<Item = VoxelTypeId> + '_ {
        self.cells.types.iter().copied()
    }

    /// Clears per-cell liquid tick markers.
    pub fn reset_liquid_tick(&mut self) {
        for w in self.cells.water.iter_mut() {
            w.changed_this_tick = false;
        }
    }

    pub(crate) fn from_parts(coord: ChunkCoord, dims: ChunkDims, cells: CellGrid) -> Self {
        let mut chunk = Self::new(coord, dims);
        chunk.cells = cells;
        chunk.cells.mark_all_for_lighting();
        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::NoNeighbors;

    fn chunk() -> (VoxelChunk, VoxelCatalog) {
        (VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(4, 4, 4)), VoxelCatalog::builtin())
    }

    #[test]
    fn set_type_marks_lighting_and_mesh() {
        let (mut c, cat) = chunk();
        c.flags().take_mesh_work();
        c.cells.needs_lighting_recalc.fill(false);
        let stone = cat.id_by_name("stone").unwrap();
        assert!(c.set_type(1, 1, 1, stone, &cat).unwrap());
        assert!(!c.set_type(1, 1, 1, stone, &cat).unwrap());
        assert!(c.flags().should_rebuild_mesh());
        assert!(c.flags().should_recalc_lighting());
        assert!(c.cells.needs_lighting_recalc[c.dims().idx(1, 1, 1)]);
        assert_eq!(c.get(1, 1, 1).unwrap().health, 120);
    }

    #[test]
    fn out_of_bounds_write_is_an_error_and_read_falls_back() {
        let (mut c, cat) = chunk();
        assert!(matches!(
            c.set_type(4, 0, 0, 1, &cat),
            Err(ChunkError::OutOfBounds { .. })
        ));
        assert!(c.get(-1, 0, 0).is_none());
        assert_eq!(c.sample(-1, 0, 0, &NoNeighbors), ShellSample::Missing);
    }

    #[test]
    fn filled_height_finds_topmost_solid() {
        let (mut c, cat) = chunk();
        assert_eq!(c.filled_height(0, 0, &cat), None);
        c.set_type(0, 0, 0, 1, &cat).unwrap();
        c.set_type(0, 2, 0, 1, &cat).unwrap();
        assert_eq!(c.filled_height(0, 0, &cat), Some(2));
    }

    #[test]
    fn damage_breaks_voxel_into_air() {
        let (mut c, cat) = chunk();
        let sand = cat.id_by_name("sand").unwrap();
        c.set_type(2, 0, 2, sand, &cat).unwrap();
        assert!(!c.damage(2, 0, 2, 10, &cat).unwrap());
        assert!(c.damage(2, 0, 2, 255, &cat).unwrap());
        assert_eq!(c.type_at(2, 0, 2), Some(AIR_ID));
    }

    #[test]
    fn placing_solid_clears_water() {
        let (mut c, cat) = chunk();
        assert_eq!(c.pour(1, 1, 1, LiquidKind::Water, 200, &cat).unwrap(), 200);
        assert_eq!(c.pour(1, 1, 1, LiquidKind::Water, 200, &cat).unwrap(), 55);
        assert_eq!(c.liquid_level_sum(), 255);
        c.set_type(1, 1, 1, 1, &cat).unwrap();
        assert!(!c.has_liquid());
    }

    #[test]
    fn world_local_round_trip() {
        let c = VoxelChunk::new(ChunkCoord::new(-1, 0, 2), ChunkDims::new(4, 4, 4));
        assert_eq!(c.local_to_world(0, 0, 0), [-4, 0, 8]);
        assert_eq!(c.world_to_local(-1, 3, 11), Some([3, 3, 3]));
        assert_eq!(c.world_to_local(0, 0, 8), None);
    }
}

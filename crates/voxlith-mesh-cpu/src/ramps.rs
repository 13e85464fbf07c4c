use voxlith_chunk::{CellGrid, ChunkShell, ChunkView, RampFlags, ShellSample};
use voxlith_voxel::VoxelCatalog;

#[inline]
fn open(s: ShellSample, catalog: &VoxelCatalog) -> bool {
    match s {
        ShellSample::Missing => true,
        ShellSample::Voxel { type_id, .. } => !catalog.is_solid(type_id),
    }
}

/// Ramp flags for the voxel at `(x,y,z)` given its surroundings.
///
/// Only solid, ramp-capable voxels whose cell above is empty or unloaded can
/// slope. A top corner lowers when any of the three cells around it on the
/// same layer is empty or unloaded.
pub fn detect_ramp(view: &ChunkView<'_>, catalog: &VoxelCatalog, x: i32, y: i32, z: i32) -> RampFlags {
    let Some(t) = view.type_id(x, y, z) else {
        return RampFlags::NONE;
    };
    if !catalog.can_ramp(t) || !open(view.sample(x, y + 1, z), catalog) {
        return RampFlags::NONE;
    }
    let mut bits = 0u8;
    for dz in 0..2usize {
        for dx in 0..2usize {
            let sx = if dx == 0 { -1 } else { 1 };
            let sz = if dz == 0 { -1 } else { 1 };
            let exposed = open(view.sample(x + sx, y, z), catalog)
                || open(view.sample(x, y, z + sz), catalog)
                || open(view.sample(x + sx, y, z + sz), catalog);
            if exposed {
                bits |= RampFlags::corner(dx, dz).bits();
            }
        }
    }
    RampFlags::from_corners(bits)
}

/// Recomputes ramp flags for every cell. Cells whose flags change, and their
/// face neighbors, are flagged for lighting. Returns the number of changed cells.
pub fn update_ramps(cells: &mut CellGrid, shell: &ChunkShell, catalog: &VoxelCatalog) -> usize {
    let d = cells.dims;
    let fresh: Vec<RampFlags> = {
        let view = ChunkView::new(cells, shell);
        (0..d.volume())
            .map(|i| {
                let [x, y, z] = d.pos(i);
                detect_ramp(&view, catalog, x as i32, y as i32, z as i32)
            })
            .collect()
    };
    let mut changed = 0;
    for (i, r) in fresh.into_iter().enumerate() {
        if cells.ramps[i] == r {
            continue;
        }
        cells.ramps[i] = r;
        changed += 1;
        let [x, y, z] = d.pos(i);
        cells.needs_lighting_recalc[i] = true;
        for (dx, dy, dz) in [(1, 0, 0), (-1, 0, 0), (0, 1, 0), (0, -1, 0), (0, 0, 1), (0, 0, -1)] {
            let (nx, ny, nz) = (x as i32 + dx, y as i32 + dy, z as i32 + dz);
            if d.contains(nx, ny, nz) {
                cells.needs_lighting_recalc[d.idx(nx as usize, ny as usize, nz as usize)] = true;
            }
        }
    }
    changed
}

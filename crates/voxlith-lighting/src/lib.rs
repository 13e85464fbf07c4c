//! Per-corner lighting bake: sun columns, ambient occlusion and emissive light.
#![forbid(unsafe_code)]

use serde::{Deserialize, Serialize};
use voxlith_chunk::{CellGrid, ChunkShell, ChunkView, CornerGrid, ShellSample, VertexColor};
use voxlith_voxel::VoxelCatalog;

pub const FULL: u8 = 255;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    /// When false every cell gets `constant_sun` and no columns are cast.
    pub sunlight: bool,
    pub constant_sun: u8,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            sunlight: true,
            constant_sun: FULL,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LightingReport {
    pub cells_visited: usize,
    pub corners_baked: usize,
    pub sun_changed: usize,
}

// (dx,dy,dz) for +Y,-Y,+X,-X,+Z,-Z
const FACE_DIRS: [(i32, i32, i32); 6] = [
    (0, 1, 0),
    (0, -1, 0),
    (1, 0, 0),
    (-1, 0, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// True when every face neighbor is a solid, ramp-free, non-emitting voxel.
/// An unloaded neighbor encloses on every side except the top, which is
/// treated as open sky.
pub fn is_enclosed(view: &ChunkView<'_>, catalog: &VoxelCatalog, x: i32, y: i32, z: i32) -> bool {
    FACE_DIRS.iter().enumerate().all(|(f, &(dx, dy, dz))| {
        match view.sample(x + dx, y + dy, z + dz) {
            ShellSample::Missing => f != 0,
            ShellSample::Voxel { type_id, ramp, .. } => {
                catalog.is_solid(type_id) && ramp.is_none() && !catalog.emits_light(type_id)
            }
        }
    })
}

/// Casts sunlight down every `(x,z)` column.
///
/// A column starts lit when the cell above the chunk is unloaded or is an
/// empty cell carrying full sun. Empty cells in the lit run get `FULL`; the
/// first solid gets `FULL` for its top face and darkens the rest. Below that
/// solid the column is only rewritten when the solid itself or a cell under
/// it is flagged.
/// Cells whose sun value changes are flagged for corner recomputation.
pub fn propagate_sun(
    cells: &mut CellGrid,
    shell: &ChunkShell,
    catalog: &VoxelCatalog,
    config: &LightingConfig,
    relight_all: bool,
) -> usize {
    let d = cells.dims;
    let mut changed = 0;
    if !config.sunlight {
        for i in 0..d.volume() {
            if cells.sun[i] != config.constant_sun {
                cells.sun[i] = config.constant_sun;
                cells.needs_lighting_recalc[i] = true;
                changed += 1;
            }
        }
        return changed;
    }
    let mut flagged_below = vec![false; d.sy];
    for z in 0..d.sz {
        for x in 0..d.sx {
            let mut acc = relight_all;
            for y in 0..d.sy {
                acc |= cells.needs_lighting_recalc[d.idx(x, y, z)];
                flagged_below[y] = acc;
            }
            if !acc {
                continue;
            }
            let mut lit = match shell.get(x as i32, d.sy as i32, z as i32) {
                ShellSample::Missing => true,
                ShellSample::Voxel { type_id, sun, .. } => !catalog.is_solid(type_id) && sun == FULL,
            };
            let mut occluded = false;
            let mut rewrite_rest = false;
            for y in (0..d.sy).rev() {
                let i = d.idx(x, y, z);
                if occluded && !rewrite_rest && !flagged_below[y] {
                    break;
                }
                let solid = catalog.is_solid(cells.types[i]);
                let value = if lit { FULL } else { 0 };
                if solid && !occluded {
                    occluded = true;
                    lit = false;
                    rewrite_rest = relight_all || cells.needs_lighting_recalc[i];
                }
                if cells.sun[i] != value {
                    cells.sun[i] = value;
                    cells.needs_lighting_recalc[i] = true;
                    changed += 1;
                }
            }
        }
    }
    changed
}

/// Light at corner `(cx,cy,cz)` from the 8 cells sharing it.
pub fn corner_color(view: &ChunkView<'_>, catalog: &VoxelCatalog, cx: i32, cy: i32, cz: i32) -> VertexColor {
    let mut sun = 0u8;
    let mut solid = 0u32;
    let mut total = 0u32;
    let mut dynamic = 0u8;
    for dy in -1..=0 {
        for dz in -1..=0 {
            for dx in -1..=0 {
                let ShellSample::Voxel { type_id, sun: s, .. } = view.sample(cx + dx, cy + dy, cz + dz)
                else {
                    continue;
                };
                total += 1;
                if catalog.is_solid(type_id) {
                    solid += 1;
                } else {
                    sun = sun.max(s);
                }
                if catalog.emits_light(type_id) {
                    dynamic = FULL;
                }
            }
        }
    }
    let ambient = if total == 0 {
        FULL
    } else {
        (u32::from(FULL) - u32::from(FULL) * solid / total) as u8
    };
    VertexColor {
        sun,
        ambient,
        dynamic,
    }
}

/// Updates visibility for flagged cells and rebakes their corners.
///
/// Enclosed solid cells are marked invisible. On a full relight they skip
/// corner work and their corners are only baked when a visible neighbor shares
/// them; on a partial pass every flagged cell rebakes its corners, since a
/// freshly enclosed cell still changed the light of corners it shares.
/// Flags are cleared on return.
pub fn bake_corners(
    cells: &mut CellGrid,
    corners: &mut CornerGrid,
    shell: &ChunkShell,
    catalog: &VoxelCatalog,
    relight_all: bool,
) -> LightingReport {
    let d = cells.dims;
    let mut report = LightingReport::default();
    let mut pending = vec![false; d.corner_volume()];
    let mut visible = cells.visible.clone();
    {
        let view = ChunkView::new(cells, shell);
        for i in 0..d.volume() {
            if !relight_all && !cells.needs_lighting_recalc[i] {
                continue;
            }
            report.cells_visited += 1;
            let [x, y, z] = d.pos(i);
            let (xi, yi, zi) = (x as i32, y as i32, z as i32);
            let solid = catalog.is_solid(cells.types[i]);
            let enclosed = solid && is_enclosed(&view, catalog, xi, yi, zi);
            visible[i] = solid && !enclosed;
            if enclosed && relight_all {
                continue;
            }
            for cy in y..=y + 1 {
                for cz in z..=z + 1 {
                    for cx in x..=x + 1 {
                        pending[d.corner_idx(cx, cy, cz)] = true;
                    }
                }
            }
        }
        for cy in 0..=d.sy {
            for cz in 0..=d.sz {
                for cx in 0..=d.sx {
                    let ci = d.corner_idx(cx, cy, cz);
                    if !pending[ci] {
                        continue;
                    }
                    corners.colors[ci] = corner_color(&view, catalog, cx as i32, cy as i32, cz as i32);
                    report.corners_baked += 1;
                }
            }
        }
    }
    cells.visible = visible;
    cells.needs_lighting_recalc.fill(false);
    report
}

/// Full lighting pass: sun columns, then visibility and corner bake.
pub fn relight(
    cells: &mut CellGrid,
    corners: &mut CornerGrid,
    shell: &ChunkShell,
    catalog: &VoxelCatalog,
    config: &LightingConfig,
    relight_all: bool,
) -> LightingReport {
    let sun_changed = propagate_sun(cells, shell, catalog, config, relight_all);
    let mut report = bake_corners(cells, corners, shell, catalog, relight_all);
    report.sun_changed = sun_changed;
    log::trace!(
        target: "runtime",
        "relight: {} cells, {} corners, {} sun changes",
        report.cells_visited,
        report.corners_baked,
        report.sun_changed
    );
    report
}

#[cfg(test)]
mod tests;

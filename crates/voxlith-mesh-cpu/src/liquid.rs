use voxlith_chunk::{ChunkView, CornerGrid, ShellSample};
use voxlith_geom::Vec3;
use voxlith_voxel::{LiquidKind, VoxelCatalog};

use crate::face::Face;
use crate::mesh_build::{MeshBuffer, MeshStats, Vertex};

const FULL_BOUNDS: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

fn tint(kind: LiquidKind) -> [u8; 4] {
    match kind {
        LiquidKind::Water => [64, 110, 230, 170],
        LiquidKind::Lava => [255, 110, 30, 255],
        LiquidKind::None => [0, 0, 0, 0],
    }
}

/// One buffer per flowing liquid kind.
#[derive(Clone, Debug, Default)]
pub struct LiquidMesh {
    buffers: [MeshBuffer; 2],
}

impl LiquidMesh {
    pub fn get(&self, kind: LiquidKind) -> Option<&MeshBuffer> {
        kind.slot().map(|s| &self.buffers[s])
    }

    pub fn stats(&self) -> MeshStats {
        let mut s = MeshStats::default();
        for b in &self.buffers {
            s += b.stats();
        }
        s
    }

    pub fn is_empty(&self) -> bool {
        self.buffers.iter().all(MeshBuffer::is_empty)
    }
}

fn same_liquid_level(s: ShellSample, kind: LiquidKind) -> Option<u8> {
    match s.water() {
        Some(w) if w.kind == kind && !w.is_empty() => Some(w.level),
        _ => None,
    }
}

/// Liquid surfaces: a top quad at `level/255` unless the same liquid sits
/// above, and side quads down to the neighbor's level where the neighbor is
/// empty, loaded and lower.
pub fn build_liquid_mesh(
    view: &ChunkView<'_>,
    corners: &CornerGrid,
    origin: Vec3,
    catalog: &VoxelCatalog,
) -> LiquidMesh {
    let cells = view.cells;
    let d = cells.dims;
    let mut out = LiquidMesh::default();
    for i in 0..d.volume() {
        let w = cells.water[i];
        let Some(slot) = w.kind.slot() else { continue };
        if w.is_empty() || catalog.is_solid(cells.types[i]) {
            continue;
        }
        let [x, y, z] = d.pos(i);
        let (xi, yi, zi) = (x as i32, y as i32, z as i32);
        let above_same = same_liquid_level(view.sample(xi, yi + 1, zi), w.kind).is_some();
        let h = if above_same { 1.0 } else { f32::from(w.level) / 255.0 };
        let buf = &mut out.buffers[slot];
        let color = |cx: usize, cz: usize| corners.get(cx, y + 1, cz).rgba();
        let at = |cx: usize, cy: f32, cz: usize| origin + Vec3::new(cx as f32, y as f32 + cy, cz as f32);

        if !above_same {
            let quad = Face::PosY.corners().map(|c| Vertex {
                position: at(x + c[0], h, z + c[2]),
                uv: [c[0] as f32, c[2] as f32],
                uv_bounds: FULL_BOUNDS,
                base_color: color(x + c[0], z + c[2]),
                tint_color: tint(w.kind),
            });
            buf.push_quad(quad, false);
        }

        for face in [Face::PosX, Face::NegX, Face::PosZ, Face::NegZ] {
            let (dx, _, dz) = face.delta();
            let nb = view.sample(xi + dx, yi, zi + dz);
            let ShellSample::Voxel { type_id, .. } = nb else { continue };
            if catalog.is_solid(type_id) {
                continue;
            }
            let low = same_liquid_level(nb, w.kind).map_or(0.0, |l| f32::from(l) / 255.0);
            if low >= h {
                continue;
            }
            let quad = face.corners().map(|c| {
                let cy = if c[1] == 1 { h } else { low };
                Vertex {
                    position: at(x + c[0], cy, z + c[2]),
                    uv: [(if dx != 0 { c[2] } else { c[0] }) as f32, 1.0 - cy],
                    uv_bounds: FULL_BOUNDS,
                    base_color: color(x + c[0], z + c[2]),
                    tint_color: tint(w.kind),
                }
            });
            buf.push_quad(quad, false);
        }
    }
    out
}

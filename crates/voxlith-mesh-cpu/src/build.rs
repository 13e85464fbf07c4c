use serde::{Deserialize, Serialize};
use voxlith_chunk::{ChunkView, CornerGrid, RampFlags, ShellSample};
use voxlith_geom::Vec3;
use voxlith_voxel::{FaceRole, VoxelCatalog};

use crate::face::Face;
use crate::jitter::Jitter;
use crate::mesh_build::{MeshBuffer, MeshStats, Vertex};
use crate::tables::FaceDrawTable;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Depth a ramped top corner is lowered by.
    pub ramp_size: f32,
    pub jitter_amplitude: f32,
    pub jitter_frequency: f32,
    pub jitter_seed: i32,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            ramp_size: 0.5,
            jitter_amplitude: 0.04,
            jitter_frequency: 0.37,
            jitter_seed: 1337,
        }
    }
}

/// Everything the mesher reads but never mutates: config, draw table, jitter noise.
#[derive(Debug)]
pub struct MeshContext {
    pub config: MeshConfig,
    pub table: FaceDrawTable,
    pub jitter: Jitter,
}

impl MeshContext {
    pub fn new(config: MeshConfig) -> Self {
        let jitter = Jitter::new(config.jitter_seed, config.jitter_frequency, config.jitter_amplitude);
        Self {
            config,
            table: FaceDrawTable::build(),
            jitter,
        }
    }
}

/// Whether `face` of the solid voxel at `(x,y,z)` with ramp `mine` is drawn.
///
/// Empty neighbors expose the face. Unloaded neighbors hide it, except above,
/// which is open sky. Solid neighbors hide top and bottom faces; side faces
/// consult the draw table.
pub fn face_visible(
    ctx: &MeshContext,
    view: &ChunkView<'_>,
    catalog: &VoxelCatalog,
    x: i32,
    y: i32,
    z: i32,
    face: Face,
    mine: RampFlags,
) -> bool {
    let (dx, dy, dz) = face.delta();
    match view.sample(x + dx, y + dy, z + dz) {
        ShellSample::Missing => face == Face::PosY,
        ShellSample::Voxel { type_id, ramp, .. } => {
            !catalog.is_solid(type_id) || ctx.table.should_draw(face, mine, ramp)
        }
    }
}

/// Solid geometry for one chunk.
#[derive(Clone, Debug, Default)]
pub struct ChunkMesh {
    pub solid: MeshBuffer,
}

impl ChunkMesh {
    pub fn stats(&self) -> MeshStats {
        self.solid.stats()
    }
}

/// Builds the solid mesh for every visible voxel. Ramps and corner colors must
/// already be current.
pub fn build_chunk_mesh(
    ctx: &MeshContext,
    view: &ChunkView<'_>,
    corners: &CornerGrid,
    origin: Vec3,
    catalog: &VoxelCatalog,
) -> ChunkMesh {
    let cells = view.cells;
    let d = cells.dims;
    let base = [origin.x as i32, origin.y as i32, origin.z as i32];
    let mut mesh = MeshBuffer::with_quad_capacity(d.sx * d.sz * 2);
    for i in 0..d.volume() {
        if !cells.visible[i] {
            continue;
        }
        let t = cells.types[i];
        let Some(ty) = catalog.get_type(t) else {
            continue;
        };
        if !ty.solid {
            continue;
        }
        let [x, y, z] = d.pos(i);
        let ramp = cells.ramps[i];
        for face in Face::ALL {
            if !face_visible(ctx, view, catalog, x as i32, y as i32, z as i32, face, ramp) {
                continue;
            }
            let rect = ty.uv_for(face.role());
            let mut quad = [Vertex::default(); 4];
            for (k, c) in face.corners().into_iter().enumerate() {
                let (cx, cy, cz) = (x + c[0], y + c[1], z + c[2]);
                let lowered = c[1] == 1 && ramp.has_corner(c[0], c[2]);
                let mut p = origin + Vec3::new(cx as f32, cy as f32, cz as f32);
                p += ctx.jitter.offset(base[0] + cx as i32, base[1] + cy as i32, base[2] + cz as i32);
                if lowered {
                    p.y -= ctx.config.ramp_size;
                }
                let (u, mut v) = match face.role() {
                    FaceRole::Top | FaceRole::Bottom => (c[0] as f32, c[2] as f32),
                    FaceRole::Side => {
                        let u = if face.delta().0 != 0 { c[2] } else { c[0] };
                        (u as f32, 1.0 - c[1] as f32)
                    }
                };
                if lowered && face.role() == FaceRole::Side {
                    v += ctx.config.ramp_size;
                }
                quad[k] = Vertex {
                    position: p,
                    uv: rect.lerp(u, v),
                    uv_bounds: rect.bounds(),
                    base_color: corners.get(cx, cy, cz).rgba(),
                    tint_color: ty.tint,
                };
            }
            let light = |k: usize| {
                let [cx, cy, cz] = face.corners()[k];
                corners.get(x + cx, y + cy, z + cz).intensity()
            };
            let flipped = light(0) + light(2) < light(1) + light(3);
            mesh.push_quad(quad, flipped);
        }
    }
    ChunkMesh { solid: mesh }
}

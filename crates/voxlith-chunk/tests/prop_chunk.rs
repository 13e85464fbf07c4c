use proptest::prelude::*;
use voxlith_chunk::{
    ChunkCoord, ChunkDims, ChunkError, ChunkShell, ChunkSnapshot, NoNeighbors, RampFlags,
    ShellSample, VoxelChunk, VoxelLookup, WaterCell,
};
use voxlith_voxel::{LiquidKind, VoxelCatalog};

proptest! {
    #[test]
    fn idx_and_pos_are_inverse(sx in 1usize..20, sy in 1usize..20, sz in 1usize..20, seed in any::<u32>()) {
        let d = ChunkDims::new(sx, sy, sz);
        let i = seed as usize % d.volume();
        let [x, y, z] = d.pos(i);
        prop_assert_eq!(d.idx(x, y, z), i);
    }

    #[test]
    fn from_world_lands_inside_chunk(wx in -500i32..500, wy in -500i32..500, wz in -500i32..500) {
        let d = ChunkDims::new(16, 48, 16);
        let (c, [x, y, z]) = ChunkCoord::from_world(wx, wy, wz, d);
        let [bx, by, bz] = c.base(d);
        prop_assert_eq!([bx + x as i32, by + y as i32, bz + z as i32], [wx, wy, wz]);
    }

    #[test]
    fn normalization_is_idempotent_and_never_degenerate(bits in any::<u8>()) {
        let n = RampFlags::from_bits(bits).normalized();
        prop_assert_eq!(n.normalized(), n);
        prop_assert!(!RampFlags::is_degenerate_corners(n.corners()));
        prop_assert!(n.corners().count_ones() <= 2);
    }
}

#[test]
fn snapshot_round_trip_recomputes_derived_state() {
    let cat = VoxelCatalog::builtin();
    let dims = ChunkDims::new(8, 8, 8);
    let mut c = VoxelChunk::new(ChunkCoord::new(3, -1, 2), dims);
    c.set_type(0, 0, 0, cat.id_by_name("stone").unwrap(), &cat).unwrap();
    c.set_water(4, 4, 4, WaterCell::new(LiquidKind::Water, 77)).unwrap();
    c.cells.sun.fill(9);

    let bytes = c.to_snapshot().encode().unwrap();
    let snap = ChunkSnapshot::decode(&bytes).unwrap();
    let loaded = VoxelChunk::from_snapshot(snap, dims, &cat).unwrap();

    assert_eq!(loaded.coord(), ChunkCoord::new(3, -1, 2));
    assert_eq!(loaded.cells.types, c.cells.types);
    assert_eq!(loaded.liquid_level_sum(), 77);
    assert!(loaded.cells.sun.iter().all(|&s| s == 0));
    assert!(loaded.cells.needs_lighting_recalc.iter().all(|&b| b));
    assert!(loaded.flags().relight_all());
}

#[test]
fn snapshot_with_wrong_dims_is_rejected() {
    let cat = VoxelCatalog::builtin();
    let c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(4, 4, 4));
    let err = VoxelChunk::from_snapshot(c.to_snapshot(), ChunkDims::new(8, 4, 4), &cat).unwrap_err();
    assert!(matches!(err, ChunkError::DimensionMismatch { .. }));
}

#[test]
fn water_cell_without_kind_has_no_level() {
    let w = WaterCell::new(LiquidKind::None, 40);
    assert_eq!(w.level, 0);
    let w = WaterCell::new(LiquidKind::Lava, 0);
    assert_eq!(w.kind, LiquidKind::None);
}

struct SolidBelow;

impl VoxelLookup for SolidBelow {
    fn sample_world(&self, _wx: i32, wy: i32, _wz: i32) -> ShellSample {
        if wy < 0 {
            ShellSample::Voxel {
                type_id: 1,
                ramp: RampFlags::NONE,
                sun: 0,
                water: WaterCell::EMPTY,
            }
        } else {
            ShellSample::Missing
        }
    }
}

#[test]
fn shell_gathers_only_the_outer_layer() {
    let dims = ChunkDims::new(4, 4, 4);
    let shell = ChunkShell::gather(ChunkCoord::new(0, 0, 0), dims, &SolidBelow);
    assert_eq!(shell.get(1, -1, 1).type_id(), Some(1));
    assert!(shell.get(1, 4, 1).is_missing());
    assert!(shell.get(1, -2, 1).is_missing());
    let empty = ChunkShell::gather(ChunkCoord::new(0, 0, 0), dims, &NoNeighbors);
    assert!(empty.get(-1, -1, -1).is_missing());
}

#[test]
fn boundary_voxels_touch_diagonal_neighbors() {
    let d = ChunkDims::new(4, 4, 4);
    assert!(d.touching_neighbors(1, 1, 1).is_empty());
    assert_eq!(d.touching_neighbors(0, 1, 1), vec![(-1, 0, 0)]);
    assert_eq!(d.touching_neighbors(0, 0, 0).len(), 7);
}

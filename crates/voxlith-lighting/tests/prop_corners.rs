use proptest::prelude::*;
use voxlith_chunk::{ChunkCoord, ChunkDims, ChunkShell, ChunkView, VoxelChunk};
use voxlith_lighting::{LightingConfig, corner_color, relight};
use voxlith_voxel::VoxelCatalog;

proptest! {
    // Partial relight after an edit matches a full relight of the same grid.
    #[test]
    fn incremental_matches_full(
        cells in prop::collection::vec(0u8..3, 4 * 4 * 4),
        edit in (0i32..4, 0i32..4, 0i32..4, 0u8..3),
    ) {
        let cat = VoxelCatalog::builtin();
        let dims = ChunkDims::new(4, 4, 4);
        let mut a = VoxelChunk::new(ChunkCoord::new(0, 0, 0), dims);
        for (i, t) in cells.iter().enumerate() {
            let [x, y, z] = dims.pos(i);
            a.set_type(x as i32, y as i32, z as i32, *t, &cat).unwrap();
        }
        let shell = ChunkShell::missing(dims);
        let cfg = LightingConfig::default();
        relight(&mut a.cells, &mut a.corners, &shell, &cat, &cfg, true);

        let (x, y, z, t) = edit;
        a.set_type(x, y, z, t, &cat).unwrap();
        relight(&mut a.cells, &mut a.corners, &shell, &cat, &cfg, false);

        let mut b = VoxelChunk::new(ChunkCoord::new(0, 0, 0), dims);
        b.cells.types = a.cells.types.clone();
        relight(&mut b.cells, &mut b.corners, &shell, &cat, &cfg, true);

        prop_assert_eq!(&a.cells.sun, &b.cells.sun);
        prop_assert_eq!(&a.cells.visible, &b.cells.visible);
        let view = ChunkView::new(&b.cells, &shell);
        for i in 0..dims.volume() {
            if !b.cells.visible[i] {
                continue;
            }
            let [x, y, z] = dims.pos(i);
            for (cx, cy, cz) in [(x, y, z), (x + 1, y + 1, z + 1), (x + 1, y, z), (x, y + 1, z + 1)] {
                let expected = corner_color(&view, &cat, cx as i32, cy as i32, cz as i32);
                prop_assert_eq!(a.corners.get(cx, cy, cz), expected);
            }
        }
    }
}

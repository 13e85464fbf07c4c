use proptest::prelude::*;
use voxlith_chunk::{
    ChunkCoord, ChunkDims, ChunkShell, ChunkView, RampFlags, ShellSample, VertexColor, VoxelChunk,
    WaterCell,
};
use voxlith_geom::Vec3;
use voxlith_lighting::{LightingConfig, relight};
use voxlith_mesh_cpu::{
    ChunkMesh, Face, MeshConfig, MeshContext, build_chunk_mesh, build_liquid_mesh, face_visible,
    update_ramps,
};
use voxlith_voxel::{LiquidKind, VoxelCatalog};

fn ctx() -> MeshContext {
    MeshContext::new(MeshConfig {
        jitter_amplitude: 0.0,
        ..MeshConfig::default()
    })
}

fn solid(cat: &VoxelCatalog, name: &str) -> ShellSample {
    ShellSample::Voxel {
        type_id: cat.id_by_name(name).unwrap(),
        ramp: RampFlags::NONE,
        sun: 0,
        water: WaterCell::EMPTY,
    }
}

fn mesh_chunk(c: &mut VoxelChunk, shell: &ChunkShell, cat: &VoxelCatalog, ctx: &MeshContext) -> ChunkMesh {
    update_ramps(&mut c.cells, shell, cat);
    relight(&mut c.cells, &mut c.corners, shell, cat, &LightingConfig::default(), true);
    let view = ChunkView::new(&c.cells, shell);
    build_chunk_mesh(ctx, &view, &c.corners, c.origin(), cat)
}

#[test]
fn isolated_voxel_in_air_emits_six_outward_faces() {
    let cat = VoxelCatalog::builtin();
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(3, 3, 3));
    c.set_type(1, 1, 1, cat.id_by_name("stone").unwrap(), &cat).unwrap();
    let mut shell = ChunkShell::missing(c.dims());
    shell.fill(ShellSample::AIR);
    let mesh = mesh_chunk(&mut c, &shell, &cat, &ctx());
    let stats = mesh.stats();
    assert_eq!(stats.faces, 6);
    assert_eq!(stats.vertices, 24);
    assert_eq!(stats.indices, 36);

    let center = Vec3::new(1.5, 1.5, 1.5);
    let verts = mesh.solid.vertices();
    for (t, n) in mesh.solid.indices().chunks_exact(3).zip(mesh.solid.triangle_normals()) {
        let p = verts[t[0] as usize].position;
        assert!((p - center).dot(n) > 0.0, "triangle faces inward");
    }
}

#[test]
fn voxel_enclosed_by_solids_emits_nothing() {
    let cat = VoxelCatalog::builtin();
    let ctx = ctx();
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(1, 1, 1));
    c.set_type(0, 0, 0, cat.id_by_name("stone").unwrap(), &cat).unwrap();
    let mut shell = ChunkShell::missing(c.dims());
    shell.fill(solid(&cat, "stone"));
    let mesh = mesh_chunk(&mut c, &shell, &cat, &ctx);
    assert_eq!(mesh.stats().faces, 0);

    let view = ChunkView::new(&c.cells, &shell);
    for face in Face::ALL {
        assert!(!face_visible(&ctx, &view, &cat, 0, 0, 0, face, RampFlags::NONE));
    }
}

#[test]
fn flat_stone_floor_has_one_top_face_per_column() {
    let cat = VoxelCatalog::builtin();
    let stone = cat.id_by_name("stone").unwrap();
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(16, 48, 16));
    for z in 0..16 {
        for x in 0..16 {
            c.set_type(x, 0, z, stone, &cat).unwrap();
        }
    }
    let shell = ChunkShell::missing(c.dims());
    let mesh = mesh_chunk(&mut c, &shell, &cat, &ctx());
    assert_eq!(mesh.stats().faces, 256);
    for n in mesh.solid.triangle_normals() {
        assert!((n - Vec3::UP).length() < 1e-5);
    }
    for v in mesh.solid.vertices() {
        assert!((v.position.y - 1.0).abs() < 1e-6);
        assert_eq!(v.base_color[0], 255);
    }
}

#[test]
fn edge_voxels_slope_and_corners_collapse() {
    let cat = VoxelCatalog::builtin();
    let dirt = cat.id_by_name("dirt").unwrap();
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(3, 3, 3));
    for z in 0..3 {
        for x in 0..3 {
            c.set_type(x, 0, z, dirt, &cat).unwrap();
        }
    }
    let mut shell = ChunkShell::missing(c.dims());
    shell.fill(ShellSample::AIR);
    let ctx = ctx();
    let mesh = mesh_chunk(&mut c, &shell, &cat, &ctx);
    let d = c.dims();
    assert_eq!(c.cells.ramps[d.idx(1, 0, 1)], RampFlags::NONE);
    assert_eq!(c.cells.ramps[d.idx(0, 0, 0)], RampFlags::NONE);
    assert_eq!(c.cells.ramps[d.idx(1, 0, 0)], RampFlags::BACK.normalized());
    assert_eq!(c.cells.ramps[d.idx(1, 0, 2)], RampFlags::FRONT.normalized());

    // The back edge's top vertices along z = 0 are lowered by the ramp depth.
    let lowered = mesh
        .solid
        .vertices()
        .iter()
        .filter(|v| (v.position.y - (1.0 - ctx.config.ramp_size)).abs() < 1e-6)
        .count();
    assert!(lowered > 0);
}

#[test]
fn quad_split_follows_brighter_diagonal() {
    let cat = VoxelCatalog::builtin();
    let ctx = ctx();
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(1, 1, 1));
    c.set_type(0, 0, 0, cat.id_by_name("stone").unwrap(), &cat).unwrap();
    let mut shell = ChunkShell::missing(c.dims());
    shell.fill(solid(&cat, "stone"));
    shell.set(0, 1, 0, ShellSample::AIR);
    update_ramps(&mut c.cells, &shell, &cat);
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &LightingConfig::default(), true);

    // Top face corners in order: (0,1,0) (0,1,1) (1,1,1) (1,1,0); brighten v1 and v3.
    let bright = VertexColor { sun: 255, ambient: 255, dynamic: 0 };
    let dark = VertexColor::DARK;
    c.corners.set(0, 1, 0, dark);
    c.corners.set(1, 1, 1, dark);
    c.corners.set(0, 1, 1, bright);
    c.corners.set(1, 1, 0, bright);
    let view = ChunkView::new(&c.cells, &shell);
    let mesh = build_chunk_mesh(&ctx, &view, &c.corners, c.origin(), &cat);
    assert_eq!(mesh.stats().faces, 1);
    assert_eq!(mesh.solid.indices(), &[1, 2, 3, 1, 3, 0]);

    c.corners.set(0, 1, 0, bright);
    c.corners.set(1, 1, 1, bright);
    let mesh = build_chunk_mesh(&ctx, &view_of(&c, &shell), &c.corners, c.origin(), &cat);
    assert_eq!(mesh.solid.indices(), &[0, 1, 2, 0, 2, 3]);
}

fn view_of<'a>(c: &'a VoxelChunk, shell: &'a ChunkShell) -> ChunkView<'a> {
    ChunkView::new(&c.cells, shell)
}

#[test]
fn water_cell_in_air_has_top_and_four_sides() {
    let cat = VoxelCatalog::builtin();
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(3, 3, 3));
    c.set_water(1, 1, 1, WaterCell::new(LiquidKind::Water, 128)).unwrap();
    let mut shell = ChunkShell::missing(c.dims());
    shell.fill(ShellSample::AIR);
    let view = ChunkView::new(&c.cells, &shell);
    let mesh = build_liquid_mesh(&view, &c.corners, c.origin(), &cat);
    assert_eq!(mesh.get(LiquidKind::Water).unwrap().quad_count(), 5);
    assert!(mesh.get(LiquidKind::Lava).unwrap().is_empty());
    let top = 1.0 + 128.0 / 255.0;
    assert!(
        mesh.get(LiquidKind::Water)
            .unwrap()
            .vertices()
            .iter()
            .any(|v| (v.position.y - top).abs() < 1e-5)
    );
}

proptest! {
    // With flat cubes only, faces equal the number of solid/non-solid adjacencies.
    #[test]
    fn face_count_matches_exposed_sides(cells in prop::collection::vec(prop::bool::ANY, 4 * 4 * 4)) {
        let cat = VoxelCatalog::builtin();
        let stone = cat.id_by_name("stone").unwrap();
        let dims = ChunkDims::new(4, 4, 4);
        let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), dims);
        for (i, s) in cells.iter().enumerate() {
            if *s {
                let [x, y, z] = dims.pos(i);
                c.set_type(x as i32, y as i32, z as i32, stone, &cat).unwrap();
            }
        }
        let mut shell = ChunkShell::missing(dims);
        shell.fill(ShellSample::AIR);
        let mesh = mesh_chunk(&mut c, &shell, &cat, &ctx());

        let is_solid = |x: i32, y: i32, z: i32| dims.contains(x, y, z)
            && cells[dims.idx(x as usize, y as usize, z as usize)];
        let mut expected = 0;
        for i in 0..dims.volume() {
            if !cells[i] {
                continue;
            }
            let [x, y, z] = dims.pos(i);
            for f in Face::ALL {
                let (dx, dy, dz) = f.delta();
                if !is_solid(x as i32 + dx, y as i32 + dy, z as i32 + dz) {
                    expected += 1;
                }
            }
        }
        prop_assert_eq!(mesh.stats().faces, expected);
    }
}

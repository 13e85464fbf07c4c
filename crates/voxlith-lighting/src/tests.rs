use super::*;
use voxlith_chunk::{ChunkCoord, ChunkDims, RampFlags, VoxelChunk, WaterCell};

fn stone_sample(cat: &VoxelCatalog) -> ShellSample {
    ShellSample::Voxel {
        type_id: cat.id_by_name("stone").unwrap(),
        ramp: RampFlags::NONE,
        sun: 0,
        water: WaterCell::EMPTY,
    }
}

fn floor_chunk(cat: &VoxelCatalog) -> VoxelChunk {
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(4, 4, 4));
    let stone = cat.id_by_name("stone").unwrap();
    for z in 0..4 {
        for x in 0..4 {
            c.set_type(x, 0, z, stone, cat).unwrap();
        }
    }
    c
}

#[test]
fn enclosed_single_voxel_is_dark_at_every_corner() {
    let cat = VoxelCatalog::builtin();
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), ChunkDims::new(1, 1, 1));
    c.set_type(0, 0, 0, cat.id_by_name("stone").unwrap(), &cat).unwrap();
    let mut shell = ChunkShell::missing(c.dims());
    shell.fill(stone_sample(&cat));
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &LightingConfig::default(), true);
    assert_eq!(c.cells.sun[0], 0);
    assert!(!c.cells.visible[0]);
    assert_eq!(c.corners.colors.len(), 8);
    for color in &c.corners.colors {
        assert_eq!(color.sun, 0);
        assert_eq!(color.ambient, 0);
        assert_eq!(color.dynamic, 0);
    }
}

#[test]
fn open_sky_lights_floor_and_half_occludes_top_corners() {
    let cat = VoxelCatalog::builtin();
    let mut c = floor_chunk(&cat);
    let shell = ChunkShell::missing(c.dims());
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &LightingConfig::default(), true);
    let d = c.dims();
    assert_eq!(c.cells.sun[d.idx(1, 0, 1)], FULL);
    assert_eq!(c.cells.sun[d.idx(1, 3, 1)], FULL);
    assert!(c.cells.visible[d.idx(1, 0, 1)]);
    let top = c.corners.get(2, 1, 2);
    assert_eq!(top.sun, FULL);
    assert_eq!(top.ambient, 128);
    assert_eq!(top.dynamic, 0);
    assert!(c.cells.needs_lighting_recalc.iter().all(|&b| !b));
}

#[test]
fn placing_a_roof_darkens_the_column_and_removing_it_relights() {
    let cat = VoxelCatalog::builtin();
    let mut c = floor_chunk(&cat);
    let shell = ChunkShell::missing(c.dims());
    let cfg = LightingConfig::default();
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &cfg, true);
    let d = c.dims();

    c.set_type(1, 2, 1, cat.id_by_name("stone").unwrap(), &cat).unwrap();
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &cfg, false);
    assert_eq!(c.cells.sun[d.idx(1, 2, 1)], FULL);
    assert_eq!(c.cells.sun[d.idx(1, 1, 1)], 0);
    assert_eq!(c.cells.sun[d.idx(1, 0, 1)], 0);

    c.set_type(1, 2, 1, voxlith_voxel::AIR_ID, &cat).unwrap();
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &cfg, false);
    assert_eq!(c.cells.sun[d.idx(1, 1, 1)], FULL);
    assert_eq!(c.cells.sun[d.idx(1, 0, 1)], FULL);
}

#[test]
fn emissive_neighbor_maxes_dynamic_channel() {
    let cat = VoxelCatalog::builtin();
    let mut c = floor_chunk(&cat);
    c.set_type(2, 1, 2, cat.id_by_name("magma").unwrap(), &cat).unwrap();
    let shell = ChunkShell::missing(c.dims());
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &LightingConfig::default(), true);
    assert_eq!(c.corners.get(2, 1, 2).dynamic, FULL);
    assert_eq!(c.corners.get(0, 1, 0).dynamic, 0);
}

#[test]
fn disabled_sunlight_uses_constant() {
    let cat = VoxelCatalog::builtin();
    let mut c = floor_chunk(&cat);
    let shell = ChunkShell::missing(c.dims());
    let cfg = LightingConfig {
        sunlight: false,
        constant_sun: 90,
    };
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &cfg, true);
    assert!(c.cells.sun.iter().all(|&s| s == 90));
}

#[test]
fn covered_top_keeps_column_dark() {
    let cat = VoxelCatalog::builtin();
    let mut c = floor_chunk(&cat);
    let mut shell = ChunkShell::missing(c.dims());
    for z in 0..4 {
        for x in 0..4 {
            shell.set(x, 4, z, stone_sample(&cat));
        }
    }
    relight(&mut c.cells, &mut c.corners, &shell, &cat, &LightingConfig::default(), true);
    assert!(c.cells.sun.iter().all(|&s| s == 0));
}

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

use voxlith_chunk::{ChunkCoord, ChunkDims, ChunkShell, ChunkView, VoxelChunk};
use voxlith_lighting::{LightingConfig, relight};
use voxlith_mesh_cpu::{MeshConfig, MeshContext, build_chunk_mesh, update_ramps};
use voxlith_voxel::VoxelCatalog;

fn hills(cat: &VoxelCatalog) -> VoxelChunk {
    let dims = ChunkDims::new(16, 48, 16);
    let mut c = VoxelChunk::new(ChunkCoord::new(0, 0, 0), dims);
    let stone = cat.id_by_name("stone").unwrap();
    let grass = cat.id_by_name("grass").unwrap();
    for z in 0..16 {
        for x in 0..16 {
            let h = 8 + ((x * 7 + z * 13) % 11);
            for y in 0..h {
                let t = if y + 1 == h { grass } else { stone };
                c.set_type(x, y, z, t, cat).unwrap();
            }
        }
    }
    c
}

fn bench_build_chunk_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_chunk_mesh");
    let cat = VoxelCatalog::builtin();
    let ctx = MeshContext::new(MeshConfig::default());
    let template = hills(&cat);
    let shell = ChunkShell::missing(template.dims());
    group.bench_function("hills_16x48x16", |b| {
        b.iter(|| {
            let mut cells = template.cells.clone();
            let mut corners = template.corners.clone();
            update_ramps(&mut cells, &shell, &cat);
            relight(&mut cells, &mut corners, &shell, &cat, &LightingConfig::default(), true);
            let view = ChunkView::new(&cells, &shell);
            black_box(build_chunk_mesh(&ctx, &view, &corners, template.origin(), &cat));
        })
    });
    group.finish();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_build_chunk_mesh
}
criterion_main!(benches);

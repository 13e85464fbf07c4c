#![allow(dead_code)]

use std::sync::Arc;

use voxlith_chunk::{ChunkCoord, ChunkDims};
use voxlith_liquid::LiquidConfig;
use voxlith_runtime::{ChunkStore, RuntimeConfig, StoreConfig};
use voxlith_voxel::{VoxelCatalog, VoxelTypeId};
use voxlith_world::FlatGenerator;

pub const ORIGIN: ChunkCoord = ChunkCoord::new(0, 0, 0);

/// Store over a flat stone world `thickness` voxels deep.
pub fn flat_store(thickness: i32) -> ChunkStore {
    let catalog = Arc::new(VoxelCatalog::builtin());
    let stone = stone(&catalog);
    let generator = Arc::new(FlatGenerator::new(thickness, stone, &catalog));
    let config = StoreConfig {
        dims: ChunkDims::new(16, 48, 16),
        liquid: LiquidConfig::default().without_evaporation(),
        runtime: RuntimeConfig {
            generation_workers: 2,
            ..RuntimeConfig::default()
        },
        ..StoreConfig::default()
    };
    ChunkStore::new(config, catalog, generator).expect("store")
}

pub fn stone(catalog: &VoxelCatalog) -> VoxelTypeId {
    catalog.id_by_name("stone").expect("stone")
}

/// Requests `coords`, generates them and settles every rebuild.
pub fn load(store: &ChunkStore, coords: &[ChunkCoord]) {
    for &c in coords {
        store.request(c);
    }
    while store.queue_debug_counts().0 > 0 {
        store.drain_generation();
    }
    settle(store);
}

pub fn settle(store: &ChunkStore) {
    loop {
        let n = store.drain_mesh_all() + store.drain_liquid_mesh_all();
        if n == 0 {
            break;
        }
    }
    store.update();
}

pub fn faces(store: &ChunkStore, coord: ChunkCoord) -> usize {
    store.with_mesh(coord, |m| m.map(|m| m.stats().faces).unwrap_or(0))
}

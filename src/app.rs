use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use voxlith_chunk::{ChunkCoord, ChunkSnapshot, ChunkState};
use voxlith_runtime::{ChunkManager, ChunkStore, StoreStats, Viewer};
use voxlith_voxel::{LiquidKind, VoxelCatalog};
use voxlith_world::build_generator;

use crate::config::EngineConfig;
use crate::event::log_event;

pub struct RunOptions {
    pub config: PathBuf,
    pub voxels: PathBuf,
    pub ticks: u32,
}

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

fn load_catalog(path: &Path) -> Result<VoxelCatalog, Box<dyn Error>> {
    if path.exists() {
        Ok(VoxelCatalog::load_from_path(path)?)
    } else {
        log::warn!("voxel catalog {} not found; using built-in types", path.display());
        Ok(VoxelCatalog::builtin())
    }
}

/// Pumps the owning-thread side (mesh swaps and events) until `done` holds.
fn pump_until(store: &ChunkStore, done: impl Fn(&ChunkStore) -> bool) -> bool {
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    loop {
        store.update();
        for e in store.drain_events() {
            log_event(&e);
        }
        if done(store) {
            return true;
        }
        if Instant::now() > deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(5));
    }
}

fn all_ready(store: &ChunkStore) -> bool {
    store
        .coords()
        .into_iter()
        .all(|c| store.state(c) == ChunkState::Ready)
}

fn queues_idle(store: &ChunkStore) -> bool {
    store.queue_debug_counts() == (0, 0, 0) && all_ready(store)
}

/// Topmost solid voxel in world column `(wx, wz)` among loaded chunks.
fn surface_y(store: &ChunkStore, wx: i32, wz: i32, top: i32, bottom: i32) -> Option<i32> {
    let cat = store.catalog();
    (bottom..top)
        .rev()
        .find(|&wy| store.voxel_at(wx, wy, wz).is_some_and(|c| cat.is_solid(c.type_id)))
}

/// Scripted edits: dig a basin, place a marker, chip a voxel, fill the basin.
fn scripted_edits(store: &ChunkStore, radius: i32) -> Result<(), Box<dyn Error>> {
    let dims = store.dims();
    let sy = dims.sy as i32;
    let (top, bottom) = ((radius + 1) * sy, -radius * sy);
    let cat = Arc::clone(store.catalog());
    let Some(ground) = surface_y(store, 4, 4, top, bottom) else {
        log::warn!("no ground under (4, 4); skipping edits");
        return Ok(());
    };
    log::info!("ground at y={ground}");

    for dx in 0..3 {
        for dz in 0..3 {
            store.dig(3 + dx, ground, 3 + dz)?;
        }
    }
    if let Some(stone) = cat.id_by_name("stone") {
        store.set_voxel(8, ground + 1, 8, stone)?;
    }
    let mut hits = 0;
    while !store.damage_voxel(10, ground, 10, 50)? {
        hits += 1;
        if hits > 8 {
            break;
        }
    }
    let poured = store.pour_liquid(4, ground, 4, LiquidKind::Water, 255)?;
    log::info!("poured {poured} water into the basin");
    if let Some(y) = surface_y(store, 12, 4, top, bottom) {
        let lava = store.pour_liquid(12, y + 1, 4, LiquidKind::Lava, 200)?;
        log::info!("poured {lava} lava at (12, {}, 4)", y + 1);
    }
    Ok(())
}

/// Saves the origin chunk, encodes it and checks the decoded copy.
fn snapshot_check(store: &ChunkStore) -> Result<(), Box<dyn Error>> {
    let origin = ChunkCoord::new(0, 0, 0);
    let Some(snap) = store.save_chunk(origin) else {
        return Ok(());
    };
    let bytes = snap.encode()?;
    let decoded = ChunkSnapshot::decode(&bytes)?;
    log::info!(
        "origin snapshot: {} bytes, {} cells",
        bytes.len(),
        decoded.types.len()
    );
    Ok(())
}

pub fn run(opts: &RunOptions) -> Result<StoreStats, Box<dyn Error>> {
    let cfg = EngineConfig::load_or_default(&opts.config)?;
    let catalog = Arc::new(load_catalog(&opts.voxels)?);
    log::info!("voxel catalog: {} types", catalog.len());
    let generator = build_generator(&cfg.world.generation, cfg.world.seed, &catalog)?;
    let store = Arc::new(ChunkStore::new(
        cfg.store_config(),
        Arc::clone(&catalog),
        Arc::from(generator),
    )?);
    let mut manager = ChunkManager::start(Arc::clone(&store))?;

    let origin = ChunkCoord::new(0, 0, 0);
    let radius = cfg.world.chunk_radius.max(0);
    store.set_viewer(Viewer::at(origin));
    let requested = store.ensure_radius(origin, radius);
    log::info!("loading {requested} chunks within radius {radius}");
    if !pump_until(&store, all_ready) {
        log::warn!("world did not settle within {SETTLE_TIMEOUT:?}");
    }

    scripted_edits(&store, radius)?;

    let interval = Duration::from_millis(cfg.runtime.tick_interval_ms);
    for tick in 0..opts.ticks {
        manager.tick_liquids();
        thread::sleep(interval);
        store.update();
        for e in store.drain_events() {
            log_event(&e);
        }
        if tick % 50 == 0 {
            log::debug!("tick {tick}: queues {:?}", store.queue_debug_counts());
        }
    }

    if !pump_until(&store, queues_idle) {
        log::warn!("rebuild queues still busy at shutdown");
    }
    snapshot_check(&store)?;
    let stats = store.stats();
    manager.shutdown();
    Ok(stats)
}

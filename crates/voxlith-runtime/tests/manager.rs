mod common;

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use common::{ORIGIN, flat_store};
use voxlith_chunk::ChunkState;
use voxlith_runtime::{ChunkManager, ChunkStore};
use voxlith_voxel::LiquidKind;

fn wait_for(store: &ChunkStore, what: impl Fn(&ChunkStore) -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        if what(store) {
            return true;
        }
        thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn workers_generate_and_mesh_requested_chunks() {
    let store = Arc::new(flat_store(1));
    let mut mgr = ChunkManager::start(Arc::clone(&store)).expect("start");
    assert!(mgr.is_running());
    store.ensure_radius(ORIGIN, 1);
    assert!(wait_for(&store, |s| s
        .coords()
        .into_iter()
        .all(|c| s.state(c) == ChunkState::Ready)));
    assert!(wait_for(&store, |s| {
        s.update();
        s.with_mesh(ORIGIN, |m| m.is_some())
    }));
    mgr.shutdown();
    assert!(!mgr.is_running());
    assert!(store.is_exiting());
}

#[test]
fn paused_manager_leaves_requests_pending() {
    let store = Arc::new(flat_store(1));
    let mgr = ChunkManager::start(Arc::clone(&store)).expect("start");
    mgr.pause();
    store.request(ORIGIN);
    thread::sleep(Duration::from_millis(50));
    assert_eq!(store.state(ORIGIN), ChunkState::Generating);
    mgr.resume();
    assert!(wait_for(&store, |s| s.state(ORIGIN) == ChunkState::Ready));
}

#[test]
fn liquid_ticks_run_on_the_simulation_thread() {
    let store = Arc::new(flat_store(1));
    let mgr = ChunkManager::start(Arc::clone(&store)).expect("start");
    store.request(ORIGIN);
    assert!(wait_for(&store, |s| s.state(ORIGIN) == ChunkState::Ready));
    store
        .pour_liquid(8, 1, 8, LiquidKind::Water, 255)
        .expect("pour");
    mgr.tick_liquids();
    assert!(wait_for(&store, |s| s.voxel_at(9, 1, 8).is_some_and(|c| c.water.level > 0)
        || s.voxel_at(7, 1, 8).is_some_and(|c| c.water.level > 0)));
    drop(mgr);
    assert!(store.is_exiting());
}

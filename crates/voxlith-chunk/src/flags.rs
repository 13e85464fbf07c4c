use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};

use crate::coord::ChunkCoord;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ChunkState {
    Unloaded = 0,
    Generating = 1,
    MeshPending = 2,
    Ready = 3,
}

impl ChunkState {
    fn from_u8(v: u8) -> Self {
        match v {
            1 => ChunkState::Generating,
            2 => ChunkState::MeshPending,
            3 => ChunkState::Ready,
            _ => ChunkState::Unloaded,
        }
    }
}

/// Dirty and in-progress flags shared between the main thread and workers.
///
/// Every flag is an atomic so workers can read and clear them without the
/// chunk's cell lock.
#[derive(Debug)]
pub struct ChunkFlags {
    should_rebuild_mesh: AtomicBool,
    should_recalc_lighting: AtomicBool,
    should_rebuild_liquid: AtomicBool,
    relight_all: AtomicBool,
    rebuild_in_progress: AtomicBool,
    liquid_rebuild_in_progress: AtomicBool,
    mesh_queued: AtomicBool,
    liquid_queued: AtomicBool,
    state: AtomicU8,
    mesh_generation: AtomicU64,
}

impl Default for ChunkFlags {
    fn default() -> Self {
        Self {
            should_rebuild_mesh: AtomicBool::new(false),
            should_recalc_lighting: AtomicBool::new(false),
            should_rebuild_liquid: AtomicBool::new(false),
            relight_all: AtomicBool::new(false),
            rebuild_in_progress: AtomicBool::new(false),
            liquid_rebuild_in_progress: AtomicBool::new(false),
            mesh_queued: AtomicBool::new(false),
            liquid_queued: AtomicBool::new(false),
            state: AtomicU8::new(ChunkState::Unloaded as u8),
            mesh_generation: AtomicU64::new(0),
        }
    }
}

impl ChunkFlags {
    pub fn should_rebuild_mesh(&self) -> bool {
        self.should_rebuild_mesh.load(Ordering::Acquire)
    }
    pub fn should_recalc_lighting(&self) -> bool {
        self.should_recalc_lighting.load(Ordering::Acquire)
    }
    pub fn should_rebuild_liquid(&self) -> bool {
        self.should_rebuild_liquid.load(Ordering::Acquire)
    }
    pub fn relight_all(&self) -> bool {
        self.relight_all.load(Ordering::Acquire)
    }

    pub fn mark_mesh_dirty(&self) {
        self.should_rebuild_mesh.store(true, Ordering::Release);
    }

    /// Lighting changes always invalidate the mesh too.
    pub fn mark_lighting_dirty(&self) {
        self.should_recalc_lighting.store(true, Ordering::Release);
        self.should_rebuild_mesh.store(true, Ordering::Release);
    }

    pub fn mark_relight_all(&self) {
        self.relight_all.store(true, Ordering::Release);
        self.mark_lighting_dirty();
    }

    pub fn mark_liquid_dirty(&self) {
        self.should_rebuild_liquid.store(true, Ordering::Release);
    }

    /// Clears and returns `(rebuild_mesh, recalc_lighting, relight_all)`.
    pub fn take_mesh_work(&self) -> (bool, bool, bool) {
        (
            self.should_rebuild_mesh.swap(false, Ordering::AcqRel),
            self.should_recalc_lighting.swap(false, Ordering::AcqRel),
            self.relight_all.swap(false, Ordering::AcqRel),
        )
    }

    pub fn take_liquid_work(&self) -> bool {
        self.should_rebuild_liquid.swap(false, Ordering::AcqRel)
    }

    /// Claims the mesh rebuild slot; false if a rebuild is already running.
    pub fn try_begin_rebuild(&self) -> bool {
        self.rebuild_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
    pub fn end_rebuild(&self) {
        self.rebuild_in_progress.store(false, Ordering::Release);
    }
    pub fn rebuild_in_progress(&self) -> bool {
        self.rebuild_in_progress.load(Ordering::Acquire)
    }

    pub fn try_begin_liquid_rebuild(&self) -> bool {
        self.liquid_rebuild_in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
    pub fn end_liquid_rebuild(&self) {
        self.liquid_rebuild_in_progress.store(false, Ordering::Release);
    }
    pub fn liquid_rebuild_in_progress(&self) -> bool {
        self.liquid_rebuild_in_progress.load(Ordering::Acquire)
    }

    /// True if the caller should enqueue; false if already queued.
    pub fn try_queue_mesh(&self) -> bool {
        !self.mesh_queued.swap(true, Ordering::AcqRel)
    }
    pub fn dequeue_mesh(&self) {
        self.mesh_queued.store(false, Ordering::Release);
    }
    pub fn try_queue_liquid(&self) -> bool {
        !self.liquid_queued.swap(true, Ordering::AcqRel)
    }
    pub fn dequeue_liquid(&self) {
        self.liquid_queued.store(false, Ordering::Release);
    }

    pub fn state(&self) -> ChunkState {
        ChunkState::from_u8(self.state.load(Ordering::Acquire))
    }
    pub fn set_state(&self, s: ChunkState) {
        self.state.store(s as u8, Ordering::Release);
    }

    pub fn mesh_generation(&self) -> u64 {
        self.mesh_generation.load(Ordering::Acquire)
    }
    /// Returns the new generation.
    pub fn bump_mesh_generation(&self) -> u64 {
        self.mesh_generation.fetch_add(1, Ordering::AcqRel) + 1
    }
}

/// Resolves the flags of a loaded neighbor chunk.
pub trait ChunkFlagsLookup {
    fn chunk_flags(&self, coord: ChunkCoord) -> Option<Arc<ChunkFlags>>;
}

impl ChunkFlagsLookup for () {
    fn chunk_flags(&self, _coord: ChunkCoord) -> Option<Arc<ChunkFlags>> {
        None
    }
}

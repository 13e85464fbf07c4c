use std::ops::RangeInclusive;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use crossbeam_channel::{Receiver, Sender, unbounded};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use hashbrown::HashSet;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use voxlith_chunk::{
    CellGrid, CellRef, ChunkCoord, ChunkDims, ChunkFlags, ChunkFlagsLookup, ChunkShell,
    ChunkSnapshot, ChunkState, ChunkView, RampFlags, ShellSample, VoxelChunk, VoxelLookup,
};
use voxlith_lighting::{LightingConfig, relight};
use voxlith_liquid::{LiquidEvent, LiquidSim, Transfer};
use voxlith_mesh_cpu::{
    ChunkMesh, LiquidMesh, MeshContext, MeshStats, build_chunk_mesh, build_liquid_mesh,
    update_ramps,
};
use voxlith_voxel::{AIR_ID, LiquidKind, VoxelCatalog, VoxelTypeId};
use voxlith_world::TerrainGenerator;

use crate::config::StoreConfig;
use crate::entry::{ChunkEntry, PublishedMesh};
use crate::error::RuntimeError;
use crate::event::ChunkEvent;
use crate::queue::{Viewer, WorkQueue};

/// Counts from one liquid tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidTickReport {
    pub chunks_stepped: usize,
    pub transfers: usize,
    pub cross_chunk: usize,
    pub phase_changes: usize,
}

/// Snapshot of store contents for diagnostics.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StoreStats {
    pub chunks: usize,
    pub ready: usize,
    pub solid: MeshStats,
    pub liquid: MeshStats,
    pub liquid_volume: u64,
}

/// Coordinate-keyed chunk storage plus the work queues that keep derived
/// data (ramps, lighting, meshes, liquid) current.
///
/// Every `drain_*` method processes one batch synchronously; `ChunkManager`
/// runs them on dedicated threads. No method holds a chunk lock while
/// acquiring another chunk's lock: neighbor data is copied into a
/// `ChunkShell` first.
pub struct ChunkStore {
    dims: ChunkDims,
    chunks: DashMap<ChunkCoord, Arc<ChunkEntry>>,
    catalog: Arc<VoxelCatalog>,
    generator: Arc<dyn TerrainGenerator>,
    mesh_ctx: MeshContext,
    lighting: LightingConfig,
    liquid: Mutex<LiquidSim>,
    liquid_active: Mutex<HashSet<ChunkCoord>>,
    gen_queue: WorkQueue,
    mesh_queue: WorkQueue,
    liquid_queue: WorkQueue,
    gen_pool: ThreadPool,
    viewer: RwLock<Viewer>,
    paused: AtomicBool,
    exiting: AtomicBool,
    render_available: AtomicBool,
    events_tx: Sender<ChunkEvent>,
    events_rx: Receiver<ChunkEvent>,
}

impl ChunkStore {
    pub fn new(
        config: StoreConfig,
        catalog: Arc<VoxelCatalog>,
        generator: Arc<dyn TerrainGenerator>,
    ) -> Result<Self, RuntimeError> {
        let liquid = LiquidSim::new(config.liquid, &catalog)?;
        let gen_pool = ThreadPoolBuilder::new()
            .num_threads(config.runtime.generation_workers.max(1))
            .thread_name(|i| format!("voxlith-gen-{i}"))
            .build()?;
        let (events_tx, events_rx) = unbounded();
        log::info!(
            target: "runtime",
            "chunk store: {}x{}x{} chunks, {} generation workers",
            config.dims.sx,
            config.dims.sy,
            config.dims.sz,
            gen_pool.current_num_threads()
        );
        Ok(Self {
            dims: config.dims,
            chunks: DashMap::new(),
            catalog,
            generator,
            mesh_ctx: MeshContext::new(config.mesh),
            lighting: config.lighting,
            liquid: Mutex::new(liquid),
            liquid_active: Mutex::new(HashSet::new()),
            gen_queue: WorkQueue::new("generation"),
            mesh_queue: WorkQueue::new("mesh"),
            liquid_queue: WorkQueue::new("liquid-mesh"),
            gen_pool,
            viewer: RwLock::new(Viewer::default()),
            paused: AtomicBool::new(false),
            exiting: AtomicBool::new(false),
            render_available: AtomicBool::new(true),
            events_tx,
            events_rx,
        })
    }

    pub fn dims(&self) -> ChunkDims {
        self.dims
    }

    pub fn catalog(&self) -> &Arc<VoxelCatalog> {
        &self.catalog
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Shared handle to a chunk slot. The map guard is released before return.
    pub fn entry(&self, coord: ChunkCoord) -> Option<Arc<ChunkEntry>> {
        self.chunks.get(&coord).map(|e| Arc::clone(e.value()))
    }

    fn populated(&self, coord: ChunkCoord) -> Option<Arc<ChunkEntry>> {
        self.entry(coord).filter(|e| e.is_populated())
    }

    pub fn state(&self, coord: ChunkCoord) -> ChunkState {
        self.entry(coord)
            .map(|e| e.state())
            .unwrap_or(ChunkState::Unloaded)
    }

    pub fn coords(&self) -> Vec<ChunkCoord> {
        let mut v: Vec<ChunkCoord> = self.chunks.iter().map(|e| *e.key()).collect();
        v.sort();
        v
    }

    fn entries(&self) -> Vec<Arc<ChunkEntry>> {
        self.chunks.iter().map(|e| Arc::clone(e.value())).collect()
    }

    // ---- control flags ----

    pub fn pause(&self) {
        self.paused.store(true, Ordering::Release);
        log::info!(target: "runtime", "workers paused");
    }

    pub fn resume(&self) {
        self.paused.store(false, Ordering::Release);
        log::info!(target: "runtime", "workers resumed");
        self.wake_all();
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Acquire)
    }

    pub(crate) fn request_exit(&self) {
        self.exiting.store(true, Ordering::Release);
        self.wake_all();
    }

    pub fn is_exiting(&self) -> bool {
        self.exiting.load(Ordering::Acquire)
    }

    fn halted(&self) -> bool {
        self.is_paused() || self.is_exiting()
    }

    /// While unavailable, mesh work is skipped and stays queued.
    pub fn set_render_available(&self, available: bool) {
        self.render_available.store(available, Ordering::Release);
        if available {
            self.mesh_queue.wake();
            self.liquid_queue.wake();
        }
    }

    pub fn render_available(&self) -> bool {
        self.render_available.load(Ordering::Acquire)
    }

    fn wake_all(&self) {
        self.gen_queue.wake();
        self.mesh_queue.wake();
        self.liquid_queue.wake();
    }

    pub(crate) fn generation_waker(&self) -> Receiver<()> {
        self.gen_queue.waker()
    }

    pub(crate) fn mesh_waker(&self) -> Receiver<()> {
        self.mesh_queue.waker()
    }

    pub(crate) fn liquid_mesh_waker(&self) -> Receiver<()> {
        self.liquid_queue.waker()
    }

    /// Pending `(generation, mesh, liquid-mesh)` work items.
    pub fn queue_debug_counts(&self) -> (usize, usize, usize) {
        (self.gen_queue.len(), self.mesh_queue.len(), self.liquid_queue.len())
    }

    pub fn set_viewer(&self, viewer: Viewer) {
        *self.viewer.write().unwrap_or_else(|e| e.into_inner()) = viewer;
    }

    fn take_batch(&self, queue: &WorkQueue) -> Vec<ChunkCoord> {
        let viewer = self.viewer.read().unwrap_or_else(|e| e.into_inner());
        queue.take_sorted(&viewer)
    }

    // ---- events ----

    fn emit(&self, event: ChunkEvent) {
        let _ = self.events_tx.send(event);
    }

    /// Receiver for chunk events; every clone competes for the same events.
    pub fn events(&self) -> Receiver<ChunkEvent> {
        self.events_rx.clone()
    }

    pub fn drain_events(&self) -> Vec<ChunkEvent> {
        self.events_rx.try_iter().collect()
    }

    // ---- loading ----

    /// Reserves a slot for `coord` and queues it for generation. False if
    /// the chunk is already present or pending.
    pub fn request(&self, coord: ChunkCoord) -> bool {
        let inserted = match self.chunks.entry(coord) {
            Entry::Occupied(_) => false,
            Entry::Vacant(v) => {
                v.insert(Arc::new(ChunkEntry::placeholder(coord, self.dims)));
                true
            }
        };
        if inserted {
            self.gen_queue.push(coord);
        }
        inserted
    }

    /// Requests every chunk within `radius` chunks of `center`.
    pub fn ensure_radius(&self, center: ChunkCoord, radius: i32) -> usize {
        let r2 = i64::from(radius) * i64::from(radius);
        let mut requested = 0;
        for dy in -radius..=radius {
            for dz in -radius..=radius {
                for dx in -radius..=radius {
                    let c = center.offset(dx, dy, dz);
                    if c.distance_sq(center) <= r2 && self.request(c) {
                        requested += 1;
                    }
                }
            }
        }
        if requested > 0 {
            log::debug!(target: "runtime", "requested {requested} chunks around {center:?}");
        }
        requested
    }

    /// Drops every chunk further than `radius` from `center`.
    pub fn unload_outside(&self, center: ChunkCoord, radius: i32) -> usize {
        let r2 = i64::from(radius) * i64::from(radius);
        let far: Vec<ChunkCoord> = self
            .chunks
            .iter()
            .map(|e| *e.key())
            .filter(|c| c.distance_sq(center) > r2)
            .collect();
        for &c in &far {
            self.unload(c);
        }
        far.len()
    }

    pub fn unload(&self, coord: ChunkCoord) -> bool {
        let Some((_, entry)) = self.chunks.remove(&coord) else {
            return false;
        };
        entry.flags().set_state(ChunkState::Unloaded);
        entry.mesh().clear();
        entry.liquid_mesh().clear();
        self.gen_queue.remove(coord);
        self.mesh_queue.remove(coord);
        self.liquid_queue.remove(coord);
        self.liquid_set().remove(&coord);
        // Their shells just went Missing.
        self.relight_neighbors(coord, all_offsets());
        self.emit(ChunkEvent::Unloaded { coord });
        true
    }

    /// Generates one batch of requested chunks on the generation pool.
    pub fn drain_generation(&self) -> usize {
        if self.halted() {
            return 0;
        }
        let batch = self.take_batch(&self.gen_queue);
        if batch.is_empty() {
            return 0;
        }
        let dims = self.dims;
        let generator = &self.generator;
        let results: Vec<(ChunkCoord, Option<VoxelChunk>)> = self.gen_pool.install(|| {
            batch
                .par_iter()
                .map(|&c| {
                    let r = catch_unwind(AssertUnwindSafe(|| generator.generate_chunk(c, dims)));
                    (c, r.ok())
                })
                .collect()
        });
        let mut done = 0;
        for (coord, chunk) in results {
            match chunk {
                Some(chunk) => {
                    if self.install(coord, chunk) {
                        self.emit(ChunkEvent::Generated { coord });
                        done += 1;
                    }
                }
                None => {
                    log::error!(target: "runtime", "generation of {coord:?} panicked; dropped");
                    self.chunks.remove(&coord);
                }
            }
        }
        log::debug!(target: "runtime", "generated {done}/{} chunks", batch.len());
        done
    }

    /// Moves a generated or loaded chunk into its reserved slot.
    fn install(&self, coord: ChunkCoord, mut chunk: VoxelChunk) -> bool {
        let Some(entry) = self.entry(coord) else {
            return false;
        };
        if entry.state() != ChunkState::Generating {
            return false;
        }
        if chunk.dims() != self.dims || chunk.coord() != coord {
            log::error!(target: "runtime", "generator returned a mismatched chunk for {coord:?}");
            self.chunks.remove(&coord);
            return false;
        }
        if let Err(e) = self.catalog.validate_ids(chunk.type_ids()) {
            log::warn!(target: "runtime", "chunk {coord:?}: {e}; replacing with air");
            for t in chunk.cells.types.iter_mut() {
                if !self.catalog.contains(*t) {
                    *t = AIR_ID;
                }
            }
        }
        chunk.attach_flags(Arc::clone(entry.flags()));
        chunk.notify_total_rebuild(self);
        let has_liquid = chunk.has_liquid();
        *entry.write() = chunk;
        entry.flags().set_state(ChunkState::MeshPending);
        self.schedule_mesh(coord);
        if has_liquid {
            self.liquid_set().insert(coord);
            self.schedule_liquid_mesh(coord);
        }
        self.relight_neighbors(coord, all_offsets());
        true
    }

    // ---- cross-chunk reads ----

    /// Copies the one-voxel layer around `coord` out of loaded neighbors,
    /// locking one neighbor at a time.
    pub fn gather_shell(&self, coord: ChunkCoord) -> ChunkShell {
        let d = self.dims;
        let (sx, sy, sz) = (d.sx as i32, d.sy as i32, d.sz as i32);
        let mut shell = ChunkShell::missing(d);
        for (ox, oy, oz) in all_offsets() {
            let Some(entry) = self.populated(coord.offset(ox, oy, oz)) else {
                continue;
            };
            let chunk = entry.read();
            for y in shell_range(oy, sy) {
                for z in shell_range(oz, sz) {
                    for x in shell_range(ox, sx) {
                        let s = sample_of(chunk.get(x - ox * sx, y - oy * sy, z - oz * sz));
                        shell.set(x, y, z, s);
                    }
                }
            }
        }
        shell
    }

    /// Reads one world voxel. Must not be called while holding a chunk lock.
    pub fn voxel_at(&self, wx: i32, wy: i32, wz: i32) -> Option<CellRef> {
        let (coord, [x, y, z]) = ChunkCoord::from_world(wx, wy, wz, self.dims);
        let entry = self.populated(coord)?;
        let chunk = entry.read();
        chunk.get(x as i32, y as i32, z as i32)
    }

    // ---- edits ----

    fn locate(&self, wx: i32, wy: i32, wz: i32) -> Result<(Arc<ChunkEntry>, [i32; 3]), RuntimeError> {
        let (coord, [x, y, z]) = ChunkCoord::from_world(wx, wy, wz, self.dims);
        let entry = self.populated(coord).ok_or(RuntimeError::NotLoaded(coord))?;
        Ok((entry, [x as i32, y as i32, z as i32]))
    }

    /// Places `type_id` at a world position. Returns whether anything changed.
    pub fn set_voxel(&self, wx: i32, wy: i32, wz: i32, type_id: VoxelTypeId) -> Result<bool, RuntimeError> {
        if !self.catalog.contains(type_id) {
            return Err(RuntimeError::UnknownVoxel(type_id));
        }
        let (entry, [x, y, z]) = self.locate(wx, wy, wz)?;
        let changed = entry.write().set_type(x, y, z, type_id, &self.catalog)?;
        if changed {
            self.after_edit(&entry, [x, y, z], [wx, wy, wz]);
        }
        Ok(changed)
    }

    pub fn dig(&self, wx: i32, wy: i32, wz: i32) -> Result<bool, RuntimeError> {
        self.set_voxel(wx, wy, wz, AIR_ID)
    }

    /// Damages a voxel; returns true when it broke into air.
    pub fn damage_voxel(&self, wx: i32, wy: i32, wz: i32, amount: u8) -> Result<bool, RuntimeError> {
        let (entry, [x, y, z]) = self.locate(wx, wy, wz)?;
        let broke = entry.write().damage(x, y, z, amount, &self.catalog)?;
        if broke {
            self.after_edit(&entry, [x, y, z], [wx, wy, wz]);
        }
        Ok(broke)
    }

    /// Adds liquid at a world position. Returns the amount accepted.
    pub fn pour_liquid(
        &self,
        wx: i32,
        wy: i32,
        wz: i32,
        kind: LiquidKind,
        amount: u8,
    ) -> Result<u8, RuntimeError> {
        let (entry, [x, y, z]) = self.locate(wx, wy, wz)?;
        let added = entry.write().pour(x, y, z, kind, amount, &self.catalog)?;
        if added > 0 {
            self.liquid_set().insert(entry.coord());
            self.schedule_liquid_mesh(entry.coord());
        }
        Ok(added)
    }

    fn after_edit(&self, entry: &ChunkEntry, local: [i32; 3], world: [i32; 3]) {
        let coord = entry.coord();
        let [x, y, z] = local;
        self.schedule_mesh(coord);
        if entry.flags().should_rebuild_liquid() {
            self.schedule_liquid_mesh(coord);
        }
        let touching = self.dims.touching_neighbors(x as usize, y as usize, z as usize);
        self.relight_neighbors(coord, touching);
        // A dug cell may open a path for nearby liquid.
        self.liquid_set().insert(coord);
        self.emit(ChunkEvent::Modified { coord, at: world });
    }

    /// Marks each loaded chunk at `coord + offset` for a full relight and queues it.
    fn relight_neighbors(&self, coord: ChunkCoord, offsets: impl IntoIterator<Item = (i32, i32, i32)>) {
        for (dx, dy, dz) in offsets {
            let n = coord.offset(dx, dy, dz);
            if let Some(entry) = self.populated(n) {
                entry.flags().mark_relight_all();
                self.schedule_mesh(n);
            }
        }
    }

    pub fn schedule_mesh(&self, coord: ChunkCoord) {
        if let Some(entry) = self.entry(coord) {
            if entry.flags().try_queue_mesh() {
                self.mesh_queue.push(coord);
            }
        }
    }

    pub fn schedule_liquid_mesh(&self, coord: ChunkCoord) {
        if let Some(entry) = self.entry(coord) {
            entry.flags().mark_liquid_dirty();
            if entry.flags().try_queue_liquid() {
                self.liquid_queue.push(coord);
            }
        }
    }

    // ---- mesh rebuild ----

    /// Rebuilds ramps, lighting and the solid mesh for one batch of queued chunks.
    pub fn drain_mesh(&self) -> usize {
        if self.halted() {
            return 0;
        }
        let batch = self.take_batch(&self.mesh_queue);
        let mut done = 0;
        for (n, &coord) in batch.iter().enumerate() {
            if self.halted() {
                for &c in &batch[n..] {
                    self.mesh_queue.push_quiet(c);
                }
                break;
            }
            match catch_unwind(AssertUnwindSafe(|| self.rebuild_mesh(coord))) {
                Ok(true) => done += 1,
                Ok(false) => {}
                Err(_) => {
                    log::error!(target: "runtime", "mesh rebuild of {coord:?} panicked; dropped");
                    if let Some(entry) = self.entry(coord) {
                        entry.flags().end_rebuild();
                        entry.flags().dequeue_mesh();
                    }
                }
            }
        }
        if !batch.is_empty() {
            log::debug!(target: "runtime", "mesh drain: {done}/{} rebuilt", batch.len());
        }
        done
    }

    /// Runs mesh drains until the queue stays empty.
    pub fn drain_mesh_all(&self) -> usize {
        let mut total = 0;
        while !self.mesh_queue.is_empty() && !self.halted() && self.render_available() {
            total += self.drain_mesh();
        }
        total
    }

    fn rebuild_mesh(&self, coord: ChunkCoord) -> bool {
        let Some(entry) = self.entry(coord) else {
            return false;
        };
        let flags = Arc::clone(entry.flags());
        if !entry.is_populated() {
            // Installing the chunk queues it again.
            flags.dequeue_mesh();
            return false;
        }
        if !self.render_available() || !flags.try_begin_rebuild() {
            self.mesh_queue.push_quiet(coord);
            return false;
        }

        let shell = self.gather_shell(coord);
        let snapshot = {
            let mut chunk = entry.write();
            let (mesh, lighting, relight_all) = flags.take_mesh_work();
            if !(mesh || lighting || relight_all) {
                None
            } else {
                let snap = (chunk.cells.clone(), chunk.corners.clone(), chunk.origin());
                // Edits after this point flag their cells afresh.
                chunk.cells.needs_lighting_recalc.fill(false);
                Some((snap, lighting || relight_all, relight_all))
            }
        };
        let Some(((mut cells, mut corners, origin), lighting, relight_all)) = snapshot else {
            self.finish_rebuild(coord, &flags);
            return false;
        };

        let old_ramps = cells.ramps.clone();
        let old_sun = cells.sun.clone();
        let ramp_changes = update_ramps(&mut cells, &shell, &self.catalog);
        if lighting || ramp_changes > 0 {
            relight(&mut cells, &mut corners, &shell, &self.catalog, &self.lighting, relight_all);
        }
        let mesh = build_chunk_mesh(
            &self.mesh_ctx,
            &ChunkView::new(&cells, &shell),
            &corners,
            origin,
            &self.catalog,
        );
        let touched = boundary_changes(&cells, &old_ramps, &old_sun);

        {
            let CellGrid { ramps, visible, sun, .. } = cells;
            let mut chunk = entry.write();
            chunk.cells.ramps = ramps;
            chunk.cells.visible = visible;
            chunk.cells.sun = sun;
            chunk.corners = corners;
        }
        let generation = flags.bump_mesh_generation();
        log::trace!(
            target: "runtime",
            "mesh {coord:?} gen {generation}: {} faces",
            mesh.stats().faces
        );
        entry.mesh().publish(PublishedMesh { generation, mesh });
        flags.set_state(ChunkState::Ready);
        self.relight_neighbors(coord, touched);
        self.finish_rebuild(coord, &flags);
        true
    }

    fn finish_rebuild(&self, coord: ChunkCoord, flags: &ChunkFlags) {
        flags.end_rebuild();
        flags.dequeue_mesh();
        if flags.should_rebuild_mesh() {
            self.schedule_mesh(coord);
        }
    }

    // ---- liquid mesh ----

    pub fn drain_liquid_mesh(&self) -> usize {
        if self.halted() {
            return 0;
        }
        let batch = self.take_batch(&self.liquid_queue);
        let mut done = 0;
        for (n, &coord) in batch.iter().enumerate() {
            if self.halted() {
                for &c in &batch[n..] {
                    self.liquid_queue.push_quiet(c);
                }
                break;
            }
            match catch_unwind(AssertUnwindSafe(|| self.rebuild_liquid_mesh(coord))) {
                Ok(true) => done += 1,
                Ok(false) => {}
                Err(_) => {
                    log::error!(target: "runtime", "liquid mesh of {coord:?} panicked; dropped");
                    if let Some(entry) = self.entry(coord) {
                        entry.flags().end_liquid_rebuild();
                        entry.flags().dequeue_liquid();
                    }
                }
            }
        }
        done
    }

    pub fn drain_liquid_mesh_all(&self) -> usize {
        let mut total = 0;
        while !self.liquid_queue.is_empty() && !self.halted() && self.render_available() {
            total += self.drain_liquid_mesh();
        }
        total
    }

    fn rebuild_liquid_mesh(&self, coord: ChunkCoord) -> bool {
        let Some(entry) = self.entry(coord) else {
            return false;
        };
        let flags = Arc::clone(entry.flags());
        if !entry.is_populated() {
            flags.dequeue_liquid();
            return false;
        }
        if !self.render_available() || !flags.try_begin_liquid_rebuild() {
            self.liquid_queue.push_quiet(coord);
            return false;
        }
        let built = if flags.take_liquid_work() {
            let shell = self.gather_shell(coord);
            let chunk = entry.read();
            let view = ChunkView::new(&chunk.cells, &shell);
            Some(build_liquid_mesh(&view, &chunk.corners, chunk.origin(), &self.catalog))
        } else {
            None
        };
        let published = built.is_some();
        if let Some(mesh) = built {
            entry.liquid_mesh().publish(mesh);
        }
        flags.end_liquid_rebuild();
        flags.dequeue_liquid();
        if flags.should_rebuild_liquid() {
            self.schedule_liquid_mesh(coord);
        }
        published
    }

    // ---- liquid simulation ----

    fn liquid_set(&self) -> MutexGuard<'_, HashSet<ChunkCoord>> {
        self.liquid_active.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// One simulation tick over every chunk that holds or may receive liquid.
    pub fn tick_liquids(&self) -> LiquidTickReport {
        let mut report = LiquidTickReport::default();
        if self.halted() {
            return report;
        }
        let active: Vec<ChunkCoord> = {
            let viewer = self.viewer.read().unwrap_or_else(|e| e.into_inner());
            let mut v: Vec<ChunkCoord> = self.liquid_set().iter().copied().collect();
            v.sort_by_key(|&c| (viewer.priority(c), c));
            v
        };
        let mut sim = self.liquid.lock().unwrap_or_else(|e| e.into_inner());
        let mut events: Vec<LiquidEvent> = Vec::new();
        let mut outbox: Vec<Transfer> = Vec::new();

        for coord in active {
            let Some(entry) = self.populated(coord) else {
                self.liquid_set().remove(&coord);
                continue;
            };
            let shell = self.gather_shell(coord);
            let step = catch_unwind(AssertUnwindSafe(|| {
                let mut chunk = entry.write();
                let out = sim.step_chunk(&mut chunk, &shell, &self.catalog);
                (out, chunk.has_liquid())
            }));
            let Ok((out, still_wet)) = step else {
                log::error!(target: "runtime", "liquid tick of {coord:?} panicked; dropped");
                continue;
            };
            report.chunks_stepped += 1;
            if !still_wet && out.outbox.is_empty() {
                self.liquid_set().remove(&coord);
            }
            if out.changed || out.phase_changed {
                self.schedule_liquid_mesh(coord);
            }
            events.extend(out.events);
            outbox.extend(out.outbox);
        }

        for t in outbox {
            let (target, _) = ChunkCoord::from_world(t.to[0], t.to[1], t.to[2], self.dims);
            let refused = match self.populated(target) {
                Some(entry) => {
                    let r = sim.receive(&mut entry.write(), &t, &self.catalog, &mut events);
                    if r < t.amount {
                        report.cross_chunk += 1;
                        self.liquid_set().insert(target);
                        self.schedule_liquid_mesh(target);
                    }
                    r
                }
                None => t.amount,
            };
            if refused > 0 {
                let (source, _) = ChunkCoord::from_world(t.from[0], t.from[1], t.from[2], self.dims);
                if let Some(entry) = self.entry(source) {
                    sim.refund(&mut entry.write(), &t, refused);
                    self.liquid_set().insert(source);
                }
                self.schedule_liquid_mesh(source);
            }
        }
        drop(sim);

        for e in events {
            match e {
                LiquidEvent::Transfer { .. } => report.transfers += 1,
                LiquidEvent::PhaseChange { at, .. } => {
                    report.phase_changes += 1;
                    let (coord, [x, y, z]) = ChunkCoord::from_world(at[0], at[1], at[2], self.dims);
                    self.schedule_mesh(coord);
                    self.relight_neighbors(coord, self.dims.touching_neighbors(x, y, z));
                }
            }
            self.emit(e.into());
        }
        if report.chunks_stepped > 0 {
            log::trace!(target: "liquid", "{report:?}");
        }
        report
    }

    // ---- owning-thread hand-off ----

    /// Swaps every pending mesh into its active slot. Returns how many swapped.
    pub fn update(&self) -> usize {
        let mut swapped = 0;
        for entry in self.entries() {
            if entry.mesh().swap().is_some() {
                swapped += 1;
            }
            if entry.liquid_mesh().swap().is_some() {
                swapped += 1;
            }
        }
        swapped
    }

    pub fn with_mesh<R>(&self, coord: ChunkCoord, f: impl FnOnce(Option<&ChunkMesh>) -> R) -> R {
        match self.entry(coord) {
            Some(entry) => entry.mesh().with_active(|m| f(m.map(|m| &m.mesh))),
            None => f(None),
        }
    }

    pub fn with_liquid_mesh<R>(&self, coord: ChunkCoord, f: impl FnOnce(Option<&LiquidMesh>) -> R) -> R {
        match self.entry(coord) {
            Some(entry) => entry.liquid_mesh().with_active(f),
            None => f(None),
        }
    }

    pub fn mesh_generation(&self, coord: ChunkCoord) -> Option<u64> {
        self.entry(coord).map(|e| e.flags().mesh_generation())
    }

    pub fn stats(&self) -> StoreStats {
        let mut s = StoreStats::default();
        for entry in self.entries() {
            s.chunks += 1;
            if entry.state() == ChunkState::Ready {
                s.ready += 1;
            }
            if let Some(st) = entry.mesh().with_active(|m| m.map(|m| m.mesh.stats())) {
                s.solid += st;
            }
            if let Some(st) = entry.liquid_mesh().with_active(|m| m.map(|m| m.stats())) {
                s.liquid += st;
            }
            if entry.is_populated() {
                s.liquid_volume += entry.read().liquid_level_sum();
            }
        }
        s
    }

    // ---- persistence ----

    pub fn save_chunk(&self, coord: ChunkCoord) -> Option<ChunkSnapshot> {
        self.populated(coord).map(|e| e.read().to_snapshot())
    }

    /// Installs a saved chunk, replacing whatever occupies its slot.
    pub fn load_chunk(&self, snapshot: ChunkSnapshot) -> Result<ChunkCoord, RuntimeError> {
        let chunk = VoxelChunk::from_snapshot(snapshot, self.dims, &self.catalog)?;
        let coord = chunk.coord();
        let entry = self
            .chunks
            .entry(coord)
            .or_insert_with(|| Arc::new(ChunkEntry::placeholder(coord, self.dims)))
            .value()
            .clone();
        self.gen_queue.remove(coord);
        entry.flags().set_state(ChunkState::Generating);
        self.install(coord, chunk);
        log::debug!(target: "runtime", "loaded chunk {coord:?} from snapshot");
        Ok(coord)
    }
}

impl VoxelLookup for ChunkStore {
    fn sample_world(&self, wx: i32, wy: i32, wz: i32) -> ShellSample {
        sample_of(self.voxel_at(wx, wy, wz))
    }
}

impl ChunkFlagsLookup for ChunkStore {
    fn chunk_flags(&self, coord: ChunkCoord) -> Option<Arc<ChunkFlags>> {
        self.populated(coord).map(|e| Arc::clone(e.flags()))
    }
}

impl std::fmt::Debug for ChunkStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStore")
            .field("dims", &self.dims)
            .field("chunks", &self.chunks.len())
            .field("queues", &self.queue_debug_counts())
            .field("paused", &self.is_paused())
            .finish_non_exhaustive()
    }
}

fn sample_of(cell: Option<CellRef>) -> ShellSample {
    match cell {
        Some(c) => ShellSample::Voxel {
            type_id: c.type_id,
            ramp: c.ramp,
            sun: c.sun,
            water: c.water,
        },
        None => ShellSample::Missing,
    }
}

/// The 26 neighbor offsets.
fn all_offsets() -> impl Iterator<Item = (i32, i32, i32)> {
    (-1..=1).flat_map(|dy| {
        (-1..=1).flat_map(move |dz| {
            (-1..=1)
                .map(move |dx| (dx, dy, dz))
                .filter(|&o| o != (0, 0, 0))
        })
    })
}

/// Local coordinates of the shell slab facing neighbor offset `o` on one axis.
fn shell_range(o: i32, n: i32) -> RangeInclusive<i32> {
    match o {
        -1 => -1..=-1,
        0 => 0..=n - 1,
        _ => n..=n,
    }
}

/// Neighbor offsets whose shells saw a ramp or sun change on our boundary.
fn boundary_changes(
    cells: &CellGrid,
    old_ramps: &[RampFlags],
    old_sun: &[u8],
) -> HashSet<(i32, i32, i32)> {
    let d = cells.dims;
    let mut out = HashSet::new();
    for i in 0..d.volume() {
        if cells.ramps[i] == old_ramps[i] && cells.sun[i] == old_sun[i] {
            continue;
        }
        let [x, y, z] = d.pos(i);
        if x > 0 && y > 0 && z > 0 && x + 1 < d.sx && y + 1 < d.sy && z + 1 < d.sz {
            continue;
        }
        out.extend(d.touching_neighbors(x, y, z));
    }
    out
}

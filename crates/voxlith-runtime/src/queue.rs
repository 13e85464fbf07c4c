use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::HashSet;
use voxlith_chunk::ChunkCoord;

/// Where the viewer is and which chunks it can currently see.
#[derive(Clone, Debug, Default)]
pub struct Viewer {
    pub center: ChunkCoord,
    pub visible: HashSet<ChunkCoord>,
}

impl Viewer {
    pub fn at(center: ChunkCoord) -> Self {
        Self {
            center,
            visible: HashSet::new(),
        }
    }

    /// Sort key: visible chunks first, then nearest first.
    pub fn priority(&self, coord: ChunkCoord) -> (bool, i64) {
        (!self.visible.contains(&coord), coord.distance_sq(self.center))
    }
}

/// A deduplicated set of chunk keys plus a wake channel for the worker
/// that drains it.
#[derive(Debug)]
pub struct WorkQueue {
    name: &'static str,
    pending: Mutex<HashSet<ChunkCoord>>,
    wake_tx: Sender<()>,
    wake_rx: Receiver<()>,
    queued: AtomicUsize,
}

impl WorkQueue {
    pub fn new(name: &'static str) -> Self {
        let (wake_tx, wake_rx) = unbounded();
        Self {
            name,
            pending: Mutex::new(HashSet::new()),
            wake_tx,
            wake_rx,
            queued: AtomicUsize::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Adds `coord` and signals the worker.
    pub fn push(&self, coord: ChunkCoord) {
        self.push_quiet(coord);
        self.wake();
    }

    /// Adds `coord` without waking anyone; it is picked up on the next drain.
    pub fn push_quiet(&self, coord: ChunkCoord) {
        let mut p = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if p.insert(coord) {
            self.queued.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn wake(&self) {
        let _ = self.wake_tx.send(());
    }

    /// Receiver the worker loop blocks on.
    pub fn waker(&self) -> Receiver<()> {
        self.wake_rx.clone()
    }

    /// Empties the queue, ordered by `viewer` priority.
    pub fn take_sorted(&self, viewer: &Viewer) -> Vec<ChunkCoord> {
        let mut batch: Vec<ChunkCoord> = {
            let mut p = self.pending.lock().unwrap_or_else(|e| e.into_inner());
            p.drain().collect()
        };
        self.queued.fetch_sub(batch.len(), Ordering::Relaxed);
        // Ties broken by key so a drain is deterministic.
        batch.sort_by_key(|&c| (viewer.priority(c), c));
        batch
    }

    pub fn remove(&self, coord: ChunkCoord) {
        let mut p = self.pending.lock().unwrap_or_else(|e| e.into_inner());
        if p.remove(&coord) {
            self.queued.fetch_sub(1, Ordering::Relaxed);
        }
    }

    pub fn len(&self) -> usize {
        self.queued.load(Ordering::Relaxed)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drains_visible_then_nearest_without_duplicates() {
        let q = WorkQueue::new("test");
        let far = ChunkCoord::new(5, 0, 0);
        let near = ChunkCoord::new(1, 0, 0);
        let seen = ChunkCoord::new(9, 0, 0);
        for c in [far, near, seen, near] {
            q.push(c);
        }
        assert_eq!(q.len(), 3);
        let mut viewer = Viewer::at(ChunkCoord::new(0, 0, 0));
        viewer.visible.insert(seen);
        assert_eq!(q.take_sorted(&viewer), vec![seen, near, far]);
        assert!(q.is_empty());
        assert_eq!(q.waker().try_iter().count(), 4);
    }
}

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender, select, unbounded};

use crate::error::RuntimeError;
use crate::store::ChunkStore;

/// Owns the worker threads that drain a `ChunkStore`.
///
/// Each loop blocks on its queue's wake channel and the shared shutdown
/// channel; `shutdown` disconnects the latter and joins every thread.
pub struct ChunkManager {
    store: Arc<ChunkStore>,
    tick_tx: Sender<()>,
    shutdown_tx: Option<Sender<()>>,
    threads: Vec<JoinHandle<()>>,
}

fn spawn_loop(
    name: &'static str,
    store: &Arc<ChunkStore>,
    wake: Receiver<()>,
    shutdown: &Receiver<()>,
    drain: fn(&ChunkStore) -> usize,
) -> Result<JoinHandle<()>, RuntimeError> {
    let store = Arc::clone(store);
    let shutdown = shutdown.clone();
    thread::Builder::new()
        .name(name.to_string())
        .spawn(move || {
            log::info!(target: "runtime", "{name} worker started");
            loop {
                select! {
                    recv(wake) -> msg => {
                        if msg.is_err() {
                            break;
                        }
                        // Collapse signals that piled up while draining.
                        while wake.try_recv().is_ok() {}
                    }
                    recv(shutdown) -> _ => break,
                }
                if store.is_exiting() {
                    break;
                }
                let n = drain(&store);
                if n > 0 {
                    log::debug!(target: "runtime", "{name}: processed {n}");
                }
            }
            log::info!(target: "runtime", "{name} worker stopped");
        })
        .map_err(|source| RuntimeError::Spawn { name, source })
}

impl ChunkManager {
    /// Spawns the generation, mesh, liquid-mesh and liquid-simulation threads.
    pub fn start(store: Arc<ChunkStore>) -> Result<Self, RuntimeError> {
        let (shutdown_tx, shutdown_rx) = unbounded::<()>();
        let (tick_tx, tick_rx) = unbounded::<()>();
        let mut mgr = Self {
            store: Arc::clone(&store),
            tick_tx,
            shutdown_tx: Some(shutdown_tx),
            threads: Vec::with_capacity(4),
        };
        let loops: [(&'static str, Receiver<()>, fn(&ChunkStore) -> usize); 4] = [
            ("voxlith-gen", store.generation_waker(), ChunkStore::drain_generation),
            ("voxlith-mesh", store.mesh_waker(), ChunkStore::drain_mesh),
            ("voxlith-liquid-mesh", store.liquid_mesh_waker(), ChunkStore::drain_liquid_mesh),
            ("voxlith-liquid-sim", tick_rx, |s: &ChunkStore| s.tick_liquids().chunks_stepped),
        ];
        for (name, wake, drain) in loops {
            // On failure `mgr` drops here and joins what already started.
            let handle = spawn_loop(name, &store, wake, &shutdown_rx, drain)?;
            mgr.threads.push(handle);
        }
        Ok(mgr)
    }

    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    pub fn pause(&self) {
        self.store.pause();
    }

    pub fn resume(&self) {
        self.store.resume();
    }

    /// Asks the simulation thread for one liquid tick.
    pub fn tick_liquids(&self) {
        let _ = self.tick_tx.send(());
    }

    pub fn is_running(&self) -> bool {
        self.shutdown_tx.is_some()
    }

    /// Sets the exit flag, fires the shutdown signal and joins every worker.
    pub fn shutdown(&mut self) {
        let Some(tx) = self.shutdown_tx.take() else {
            return;
        };
        self.store.request_exit();
        drop(tx);
        for handle in self.threads.drain(..) {
            let name = handle.thread().name().unwrap_or("worker").to_string();
            if handle.join().is_err() {
                log::error!(target: "runtime", "{name} panicked during shutdown");
            }
        }
        log::info!(target: "runtime", "chunk manager shut down");
    }
}

impl Drop for ChunkManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl std::fmt::Debug for ChunkManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkManager")
            .field("store", &self.store)
            .field("threads", &self.threads.len())
            .finish()
    }
}

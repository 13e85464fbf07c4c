//! Chunk store and worker orchestration: generation, ramp/lighting/mesh
//! rebuilds, liquid meshes and the liquid simulation tick.
#![forbid(unsafe_code)]

mod config;
mod entry;
mod error;
mod event;
mod manager;
mod queue;
mod store;

pub use config::{RuntimeConfig, StoreConfig};
pub use entry::{ChunkEntry, PublishedMesh};
pub use error::RuntimeError;
pub use event::ChunkEvent;
pub use manager::ChunkManager;
pub use queue::{Viewer, WorkQueue};
pub use store::{ChunkStore, LiquidTickReport, StoreStats};

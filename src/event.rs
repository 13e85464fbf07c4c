use voxlith_runtime::ChunkEvent;

/// Single sink for chunk events in the headless driver.
pub fn log_event(event: &ChunkEvent) {
    match *event {
        ChunkEvent::Modified { coord, at } => {
            log::debug!(target: "events", "modified {at:?} in chunk {coord:?}");
        }
        ChunkEvent::Generated { coord } => {
            log::debug!(target: "events", "generated {coord:?}");
        }
        ChunkEvent::Unloaded { coord } => {
            log::debug!(target: "events", "unloaded {coord:?}");
        }
        ChunkEvent::LiquidTransfer {
            from,
            to,
            kind,
            amount,
        } => {
            log::trace!(target: "events", "{kind:?} {amount} {from:?} -> {to:?}");
        }
        ChunkEvent::PhaseChange { at, into } => {
            log::info!(target: "events", "phase change at {at:?} into voxel {into}");
        }
    }
}

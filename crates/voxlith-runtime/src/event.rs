use voxlith_chunk::ChunkCoord;
use voxlith_liquid::LiquidEvent;
use voxlith_voxel::{LiquidKind, VoxelTypeId};

/// Notifications for systems outside the core (physics, AI, audio).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkEvent {
    /// A voxel was placed, removed or broken at world position `at`.
    Modified { coord: ChunkCoord, at: [i32; 3] },
    Generated { coord: ChunkCoord },
    Unloaded { coord: ChunkCoord },
    LiquidTransfer {
        from: [i32; 3],
        to: [i32; 3],
        kind: LiquidKind,
        amount: u8,
    },
    /// Opposing liquids met and the cell turned into `into`.
    PhaseChange { at: [i32; 3], into: VoxelTypeId },
}

impl From<LiquidEvent> for ChunkEvent {
    fn from(e: LiquidEvent) -> Self {
        match e {
            LiquidEvent::Transfer {
                from,
                to,
                kind,
                amount,
            } => ChunkEvent::LiquidTransfer {
                from,
                to,
                kind,
                amount,
            },
            LiquidEvent::PhaseChange { at, into } => ChunkEvent::PhaseChange { at, into },
        }
    }
}

use thiserror::Error;

use crate::dims::ChunkDims;

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error("local position ({x},{y},{z}) is outside the chunk")]
    OutOfBounds { x: i32, y: i32, z: i32 },
    #[error("chunk dimensions {found:?} do not match expected {expected:?}")]
    DimensionMismatch { expected: ChunkDims, found: ChunkDims },
    #[error("snapshot array `{array}` has {found} entries, expected {expected}")]
    LengthMismatch {
        array: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("snapshot codec: {0}")]
    Codec(#[from] bincode::Error),
}

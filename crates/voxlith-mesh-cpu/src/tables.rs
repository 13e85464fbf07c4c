//! Immutable lookup tables built once and passed by reference.

use voxlith_chunk::RampFlags;

use crate::face::Face;

/// Triangle orders for a quad `v0..v3`: split along `v0-v2` or along `v1-v3`.
pub const QUAD_INDICES_NORMAL: [u32; 6] = [0, 1, 2, 0, 2, 3];
pub const QUAD_INDICES_FLIPPED: [u32; 6] = [1, 2, 3, 1, 3, 0];

/// Side-face visibility between two solid voxels, keyed by the corner bits of
/// both ramps.
///
/// A face is drawn when at least one of my two top vertices on that face sits
/// higher than the neighbor's touching vertex; otherwise the neighbor covers it.
/// Every one of the 16 x 16 corner combinations is enumerated, including the
/// degenerate ones normalization never produces.
#[derive(Clone, Debug)]
pub struct FaceDrawTable {
    side: [[[bool; 16]; 16]; 4],
}

impl FaceDrawTable {
    pub fn build() -> Self {
        // Any positive slope depth gives the same comparison outcome.
        const PROBE: f32 = 0.5;
        let mut side = [[[false; 16]; 16]; 4];
        for face in Face::SIDES {
            let Some(f) = face.side_index() else { continue };
            let pairs = face.shared_top_corners();
            for mine in 0..16u8 {
                let m = RampFlags::from_bits(mine);
                for nb in 0..16u8 {
                    let n = RampFlags::from_bits(nb);
                    side[f][mine as usize][nb as usize] = pairs.iter().any(|(mc, nc)| {
                        m.corner_height(mc[0], mc[1], PROBE) > n.corner_height(nc[0], nc[1], PROBE)
                    });
                }
            }
        }
        Self { side }
    }

    /// Whether `face` is drawn when the neighbor across it is solid.
    /// Top and bottom faces are never drawn against a solid neighbor.
    #[inline]
    pub fn should_draw(&self, face: Face, mine: RampFlags, neighbor: RampFlags) -> bool {
        match face.side_index() {
            Some(f) => self.side[f][mine.table_index()][neighbor.table_index()],
            None => false,
        }
    }
}

impl Default for FaceDrawTable {
    fn default() -> Self {
        Self::build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_against_flat_is_hidden() {
        let t = FaceDrawTable::build();
        for face in Face::SIDES {
            assert!(!t.should_draw(face, RampFlags::NONE, RampFlags::NONE));
        }
    }

    #[test]
    fn lowered_neighbor_exposes_my_face() {
        let t = FaceDrawTable::build();
        // Neighbor on +X has its -X side lowered.
        assert!(t.should_draw(Face::PosX, RampFlags::NONE, RampFlags::LEFT.normalized()));
        // Neighbor on +X lowered on its far side: touching corners stay full height.
        assert!(!t.should_draw(Face::PosX, RampFlags::NONE, RampFlags::RIGHT.normalized()));
        // My +X side lowered against a flat neighbor: covered.
        assert!(!t.should_draw(Face::PosX, RampFlags::RIGHT.normalized(), RampFlags::NONE));
    }

    #[test]
    fn parallel_slopes_hide_the_face_between_them() {
        let t = FaceDrawTable::build();
        let front = RampFlags::FRONT.normalized();
        assert!(!t.should_draw(Face::PosX, front, front));
        assert!(!t.should_draw(Face::PosZ, front, front));
        // The -Z neighbor slopes down toward me, exposing my back face.
        assert!(t.should_draw(Face::NegZ, front, front));
    }

    #[test]
    fn top_and_bottom_never_use_the_table() {
        let t = FaceDrawTable::build();
        assert!(!t.should_draw(Face::PosY, RampFlags::NONE, RampFlags::from_corners(1)));
        assert!(!t.should_draw(Face::NegY, RampFlags::from_corners(1), RampFlags::NONE));
    }
}

//! Top-corner ramp flags.
//!
//! The low four bits mark which top corners of a voxel are lowered. The high
//! four bits name a whole side and are derived: a side bit is set exactly when
//! both corners on that side are set. Only nine shapes survive normalization:
//! flat, one of the four single corners, or one of the four sides. Anything
//! that lowers two diagonally opposite corners collapses to flat.

use std::ops::{BitOr, BitOrAssign};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct RampFlags(u8);

impl RampFlags {
    pub const NONE: RampFlags = RampFlags(0);
    /// Corner at (-X, -Z).
    pub const TOP_BACK_LEFT: RampFlags = RampFlags(1 << 0);
    /// Corner at (+X, -Z).
    pub const TOP_BACK_RIGHT: RampFlags = RampFlags(1 << 1);
    /// Corner at (-X, +Z).
    pub const TOP_FRONT_LEFT: RampFlags = RampFlags(1 << 2);
    /// Corner at (+X, +Z).
    pub const TOP_FRONT_RIGHT: RampFlags = RampFlags(1 << 3);
    /// +Z side.
    pub const FRONT: RampFlags = RampFlags(1 << 4);
    /// -Z side.
    pub const BACK: RampFlags = RampFlags(1 << 5);
    /// -X side.
    pub const LEFT: RampFlags = RampFlags(1 << 6);
    /// +X side.
    pub const RIGHT: RampFlags = RampFlags(1 << 7);

    const CORNER_MASK: u8 = 0x0F;

    #[inline]
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Raw flags, not normalized.
    #[inline]
    pub const fn from_bits(bits: u8) -> Self {
        RampFlags(bits)
    }

    /// Normalized flags from the four corner bits only.
    #[inline]
    pub fn from_corners(corners: u8) -> Self {
        RampFlags(corners & Self::CORNER_MASK).normalized()
    }

    /// Bit for the top corner at `(dx, dz)`, each 0 or 1.
    #[inline]
    pub const fn corner(dx: usize, dz: usize) -> RampFlags {
        RampFlags(1 << ((dx & 1) + 2 * (dz & 1)))
    }

    #[inline]
    pub const fn corners(self) -> u8 {
        self.0 & Self::CORNER_MASK
    }

    #[inline]
    pub const fn has_corner(self, dx: usize, dz: usize) -> bool {
        self.0 & Self::corner(dx, dz).0 != 0
    }

    #[inline]
    pub const fn contains(self, other: RampFlags) -> bool {
        self.0 & other.0 == other.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }

    /// Index into the 16-way culling table.
    #[inline]
    pub const fn table_index(self) -> usize {
        self.corners() as usize
    }

    /// Height of the top corner `(dx, dz)` within a unit voxel.
    #[inline]
    pub fn corner_height(self, dx: usize, dz: usize, ramp_size: f32) -> f32 {
        if self.has_corner(dx, dz) {
            1.0 - ramp_size
        } else {
            1.0
        }
    }

    /// True when two diagonally opposite corners are both lowered.
    #[inline]
    pub fn is_degenerate_corners(corners: u8) -> bool {
        let a = Self::TOP_BACK_LEFT.0 | Self::TOP_FRONT_RIGHT.0;
        let b = Self::TOP_BACK_RIGHT.0 | Self::TOP_FRONT_LEFT.0;
        corners & a == a || corners & b == b
    }

    /// Expands side bits to their corners, rejects degenerate shapes, then
    /// re-derives side bits.
    pub fn normalized(self) -> RampFlags {
        let mut c = self.corners();
        if self.contains(Self::FRONT) {
            c |= Self::TOP_FRONT_LEFT.0 | Self::TOP_FRONT_RIGHT.0;
        }
        if self.contains(Self::BACK) {
            c |= Self::TOP_BACK_LEFT.0 | Self::TOP_BACK_RIGHT.0;
        }
        if self.contains(Self::LEFT) {
            c |= Self::TOP_BACK_LEFT.0 | Self::TOP_FRONT_LEFT.0;
        }
        if self.contains(Self::RIGHT) {
            c |= Self::TOP_BACK_RIGHT.0 | Self::TOP_FRONT_RIGHT.0;
        }
        if Self::is_degenerate_corners(c) {
            return RampFlags::NONE;
        }
        let both = |m: u8| c & m == m;
        let mut out = c;
        if both(Self::TOP_FRONT_LEFT.0 | Self::TOP_FRONT_RIGHT.0) {
            out |= Self::FRONT.0;
        }
        if both(Self::TOP_BACK_LEFT.0 | Self::TOP_BACK_RIGHT.0) {
            out |= Self::BACK.0;
        }
        if both(Self::TOP_BACK_LEFT.0 | Self::TOP_FRONT_LEFT.0) {
            out |= Self::LEFT.0;
        }
        if both(Self::TOP_BACK_RIGHT.0 | Self::TOP_FRONT_RIGHT.0) {
            out |= Self::RIGHT.0;
        }
        RampFlags(out)
    }

    #[inline]
    pub fn is_normalized(self) -> bool {
        self.normalized() == self
    }
}

impl BitOr for RampFlags {
    type Output = RampFlags;
    #[inline]
    fn bitor(self, rhs: RampFlags) -> RampFlags {
        RampFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for RampFlags {
    #[inline]
    fn bitor_assign(&mut self, rhs: RampFlags) {
        self.0 |= rhs.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn front_and_back_collapse_to_flat() {
        assert_eq!((RampFlags::FRONT | RampFlags::BACK).normalized(), RampFlags::NONE);
        assert_eq!((RampFlags::LEFT | RampFlags::RIGHT).normalized(), RampFlags::NONE);
        assert_eq!(RampFlags::from_corners(0x0F), RampFlags::NONE);
    }

    #[test]
    fn side_bit_follows_corner_pair() {
        let r = RampFlags::from_corners((RampFlags::TOP_FRONT_LEFT | RampFlags::TOP_FRONT_RIGHT).bits());
        assert!(r.contains(RampFlags::FRONT));
        assert!(!r.contains(RampFlags::LEFT));
        assert_eq!(RampFlags::FRONT.normalized(), r);
    }

    #[test]
    fn nine_shapes_survive() {
        let mut valid = std::collections::BTreeSet::new();
        for c in 0u8..16 {
            valid.insert(RampFlags::from_corners(c).bits());
        }
        assert_eq!(valid.len(), 9);
    }

    #[test]
    fn corner_bits_match_positions() {
        assert_eq!(RampFlags::corner(0, 0), RampFlags::TOP_BACK_LEFT);
        assert_eq!(RampFlags::corner(1, 0), RampFlags::TOP_BACK_RIGHT);
        assert_eq!(RampFlags::corner(0, 1), RampFlags::TOP_FRONT_LEFT);
        assert_eq!(RampFlags::corner(1, 1), RampFlags::TOP_FRONT_RIGHT);
    }
}

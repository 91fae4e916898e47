//! Lane-packed datapath containers.
//!
//! Every unit operates on a single fixed-width register that is partitioned
//! into equal lanes. Rather than one register layout per element format, this
//! module provides:
//! 1. **Container:** [`PackedVector`], a fixed-width bit container (64 bits for the
//!    floating-point units, 128 bits for the divider).
//! 2. **Lane View:** [`LaneView`], mapping a lane index to its bit range for a
//!    given element width. Lane 0 occupies the least-significant bits and lanes
//!    never straddle each other.
//! 3. **Masks:** [`LaneMask`], one enable bit per lane.

use std::fmt;
use std::ops::Range;

/// Width of the floating-point datapath in bits.
pub const FP_DATAPATH_BITS: u32 = 64;

/// Width of the integer divider datapath in bits.
pub const DIV_DATAPATH_BITS: u32 = 128;

/// Partition of a `container_bits`-wide register into `elem_bits`-wide lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneView {
    elem_bits: u32,
    count: usize,
}

impl LaneView {
    /// Creates a view of `container_bits` split into lanes of `elem_bits`.
    ///
    /// `elem_bits` must divide `container_bits` and be at most 64.
    pub const fn new(container_bits: u32, elem_bits: u32) -> Self {
        debug_assert!(elem_bits > 0 && elem_bits <= 64 && container_bits % elem_bits == 0);
        Self {
            elem_bits,
            count: (container_bits / elem_bits) as usize,
        }
    }

    /// Element width in bits.
    #[inline]
    pub const fn elem_bits(self) -> u32 {
        self.elem_bits
    }

    /// Number of lanes in the container.
    #[inline]
    pub const fn count(self) -> usize {
        self.count
    }

    /// Bit range occupied by lane `index`.
    #[inline]
    pub const fn range(self, index: usize) -> Range<u32> {
        let lo = index as u32 * self.elem_bits;
        lo..lo + self.elem_bits
    }

    /// All-ones value for one lane.
    #[inline]
    pub const fn lane_mask(self) -> u64 {
        if self.elem_bits == 64 {
            u64::MAX
        } else {
            (1u64 << self.elem_bits) - 1
        }
    }

    /// Mask with one bit set for every lane in the view.
    #[inline]
    pub const fn all_lanes(self) -> LaneMask {
        LaneMask::all(self.count)
    }
}

/// A fixed-width register holding lane-packed elements.
///
/// `WIDTH` is the container width in bits (at most 128). Bits above `WIDTH`
/// are always zero.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct PackedVector<const WIDTH: u32>(u128);

/// 64-bit register used by the floating-point adder and FMA units.
pub type FpVector = PackedVector<FP_DATAPATH_BITS>;

/// 128-bit register used by the integer divider.
pub type DivVector = PackedVector<DIV_DATAPATH_BITS>;

impl<const WIDTH: u32> PackedVector<WIDTH> {
    /// Container mask covering the low `WIDTH` bits.
    const MASK: u128 = u128::MAX >> (128 - WIDTH);

    /// All-zero register.
    pub const ZERO: Self = Self(0);

    /// Wraps raw bits, discarding anything above the container width.
    #[inline]
    pub const fn new(bits: u128) -> Self {
        Self(bits & Self::MASK)
    }

    /// Raw register contents.
    #[inline]
    pub const fn bits(self) -> u128 {
        self.0
    }

    /// Builds a register from lane values, lane 0 first.
    ///
    /// Missing trailing lanes are zero; extra values are ignored; every value
    /// is truncated to the element width.
    pub fn from_lanes<I>(view: LaneView, lanes: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut out = Self::ZERO;
        for (i, value) in lanes.into_iter().take(view.count()).enumerate() {
            out.set_lane(view, i, value);
        }
        out
    }

    /// Reads lane `index`.
    #[inline]
    pub fn lane(self, view: LaneView, index: usize) -> u64 {
        let range = view.range(index);
        ((self.0 >> range.start) as u64) & view.lane_mask()
    }

    /// Overwrites lane `index`, leaving every other lane untouched.
    #[inline]
    pub fn set_lane(&mut self, view: LaneView, index: usize, value: u64) {
        let range = view.range(index);
        let field = u128::from(view.lane_mask()) << range.start;
        self.0 = (self.0 & !field) | ((u128::from(value & view.lane_mask()) << range.start) & field);
    }

    /// Iterates over all lane values, lane 0 first.
    pub fn lanes(self, view: LaneView) -> impl Iterator<Item = u64> {
        (0..view.count()).map(move |i| self.lane(view, i))
    }
}

impl FpVector {
    /// Low 64 bits of the register (the whole floating-point datapath).
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0 as u64
    }
}

impl From<u64> for FpVector {
    fn from(bits: u64) -> Self {
        Self::new(u128::from(bits))
    }
}

impl From<u128> for DivVector {
    fn from(bits: u128) -> Self {
        Self::new(bits)
    }
}

impl<const WIDTH: u32> fmt::Debug for PackedVector<WIDTH> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = (WIDTH / 4) as usize;
        write!(f, "PackedVector<{WIDTH}>({:#0width$x})", self.0, width = digits + 2)
    }
}

/// One enable bit per lane; bit `i` gates lane `i`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct LaneMask(u16);

impl LaneMask {
    /// No lane enabled.
    pub const NONE: Self = Self(0);

    /// Wraps a raw mask value.
    #[inline]
    pub const fn new(bits: u16) -> Self {
        Self(bits)
    }

    /// Mask enabling the first `lanes` lanes.
    #[inline]
    pub const fn all(lanes: usize) -> Self {
        if lanes >= 16 {
            Self(u16::MAX)
        } else {
            Self((1u16 << lanes) - 1)
        }
    }

    /// Raw mask value.
    #[inline]
    pub const fn bits(self) -> u16 {
        self.0
    }

    /// Returns true if lane `index` is enabled.
    #[inline]
    pub const fn is_active(self, index: usize) -> bool {
        index < 16 && (self.0 >> index) & 1 == 1
    }

    /// Number of enabled lanes among the first `lanes`.
    #[inline]
    pub const fn active_count(self, lanes: usize) -> u32 {
        (self.0 & Self::all(lanes).0).count_ones()
    }
}

impl From<u16> for LaneMask {
    fn from(bits: u16) -> Self {
        Self(bits)
    }
}

impl From<u8> for LaneMask {
    fn from(bits: u8) -> Self {
        Self(u16::from(bits))
    }
}

//! Divider operands and results.

use crate::common::error::{UnitError, UnitResult};
use crate::common::lanes::{DivVector, LaneMask, LaneView, DIV_DATAPATH_BITS};

/// Integer element width of the divider lanes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementWidth {
    /// 16 lanes of 8 bits.
    E8,
    /// 8 lanes of 16 bits.
    E16,
    /// 4 lanes of 32 bits.
    E32,
    /// 2 lanes of 64 bits.
    E64,
}

impl ElementWidth {
    /// Every width, narrowest first.
    pub const ALL: [Self; 4] = [Self::E8, Self::E16, Self::E32, Self::E64];

    /// Decodes the 2-bit width selector.
    pub const fn from_bits(bits: u8) -> UnitResult<Self> {
        Ok(match bits {
            0 => Self::E8,
            1 => Self::E16,
            2 => Self::E32,
            3 => Self::E64,
            _ => return Err(UnitError::InvalidElementWidth(bits)),
        })
    }

    /// Element width in bits.
    #[inline]
    pub const fn bits(self) -> u32 {
        match self {
            Self::E8 => 8,
            Self::E16 => 16,
            Self::E32 => 32,
            Self::E64 => 64,
        }
    }

    /// Lane partition of the 128-bit divider register.
    #[inline]
    pub const fn view(self) -> LaneView {
        LaneView::new(DIV_DATAPATH_BITS, self.bits())
    }

    /// Number of lanes.
    #[inline]
    pub const fn lanes(self) -> usize {
        self.view().count()
    }

    /// Sign bit of one lane.
    #[inline]
    pub const fn sign_bit(self) -> u64 {
        1 << (self.bits() - 1)
    }
}

/// One division request: every lane of `dividend` by the same lane of `divisor`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DivRequest {
    /// Lane width.
    pub width: ElementWidth,
    /// Two's-complement (`true`) or unsigned lanes.
    pub signed: bool,
    /// Packed dividends.
    pub dividend: DivVector,
    /// Packed divisors.
    pub divisor: DivVector,
    /// Active lanes; inactive lanes yield zero quotient and remainder.
    pub mask: LaneMask,
}

impl DivRequest {
    /// Request with every lane active.
    pub const fn new(width: ElementWidth, signed: bool, dividend: DivVector, divisor: DivVector) -> Self {
        Self {
            width,
            signed,
            dividend,
            divisor,
            mask: width.view().all_lanes(),
        }
    }

    /// Replaces the active-lane mask.
    #[must_use]
    pub const fn with_mask(mut self, mask: LaneMask) -> Self {
        self.mask = mask;
        self
    }
}

/// Packed quotient and remainder plus the per-lane divide-by-zero mask.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DivResult {
    /// Packed quotients.
    pub quotient: DivVector,
    /// Packed remainders.
    pub remainder: DivVector,
    /// Bit `i` set when active lane `i` divided by zero.
    pub dz_mask: u16,
}

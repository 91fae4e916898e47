//! Floating-point lane formats.
//!
//! The three IEEE 754 binary interchange formats carried by the vector
//! floating-point units, with their field layout and the lane partition they
//! induce on the 64-bit datapath:
//!
//! | Format | Width | Exponent | Fraction | Bias | Lanes | Canonical NaN           |
//! |--------|-------|----------|----------|------|-------|-------------------------|
//! | F16    | 16    | 5        | 10       | 15   | 4     | `0x7E00`                |
//! | F32    | 32    | 8        | 23       | 127  | 2     | `0x7FC0_0000`           |
//! | F64    | 64    | 11       | 52       | 1023 | 1     | `0x7FF8_0000_0000_0000` |

use crate::common::error::{UnitError, UnitResult};
use crate::common::lanes::{FP_DATAPATH_BITS, LaneView};

/// Floating-point element format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Format {
    /// IEEE 754 binary16.
    F16,
    /// IEEE 754 binary32.
    F32,
    /// IEEE 754 binary64.
    F64,
}

impl Format {
    /// Decodes the 2-bit format selector.
    ///
    /// `0b00` is reserved and rejected; `0b01`, `0b10`, `0b11` select
    /// F16, F32 and F64.
    pub const fn from_bits(bits: u8) -> UnitResult<Self> {
        match bits & 0b11 {
            0b01 => Ok(Self::F16),
            0b10 => Ok(Self::F32),
            0b11 => Ok(Self::F64),
            _ => Err(UnitError::ReservedFormat(bits)),
        }
    }

    /// Selector encoding of this format.
    pub const fn bits(self) -> u8 {
        match self {
            Self::F16 => 0b01,
            Self::F32 => 0b10,
            Self::F64 => 0b11,
        }
    }

    /// Total width in bits.
    #[inline]
    pub const fn width(self) -> u32 {
        match self {
            Self::F16 => 16,
            Self::F32 => 32,
            Self::F64 => 64,
        }
    }

    /// Exponent field width in bits.
    #[inline]
    pub const fn exp_bits(self) -> u32 {
        match self {
            Self::F16 => 5,
            Self::F32 => 8,
            Self::F64 => 11,
        }
    }

    /// Fraction (trailing significand) field width in bits.
    #[inline]
    pub const fn frac_bits(self) -> u32 {
        match self {
            Self::F16 => 10,
            Self::F32 => 23,
            Self::F64 => 52,
        }
    }

    /// Exponent bias.
    #[inline]
    pub const fn bias(self) -> i32 {
        (1 << (self.exp_bits() - 1)) - 1
    }

    /// Largest biased exponent value (all ones), used by infinities and NaNs.
    #[inline]
    pub const fn exp_max(self) -> u64 {
        (1 << self.exp_bits()) - 1
    }

    /// Sign bit mask.
    #[inline]
    pub const fn sign_mask(self) -> u64 {
        1 << (self.width() - 1)
    }

    /// Fraction field mask.
    #[inline]
    pub const fn frac_mask(self) -> u64 {
        (1 << self.frac_bits()) - 1
    }

    /// Quiet bit: the most significant fraction bit.
    #[inline]
    pub const fn quiet_bit(self) -> u64 {
        1 << (self.frac_bits() - 1)
    }

    /// The single quiet NaN emitted by every NaN-producing operation.
    #[inline]
    pub const fn canonical_nan(self) -> u64 {
        match self {
            Self::F16 => 0x7E00,
            Self::F32 => 0x7FC0_0000,
            Self::F64 => 0x7FF8_0000_0000_0000,
        }
    }

    /// Positive infinity.
    #[inline]
    pub const fn infinity(self) -> u64 {
        self.exp_max() << self.frac_bits()
    }

    /// Largest finite magnitude (positive).
    #[inline]
    pub const fn max_finite(self) -> u64 {
        ((self.exp_max() - 1) << self.frac_bits()) | self.frac_mask()
    }

    /// Exponent of the smallest normal number, unbiased (`1 - bias`).
    #[inline]
    pub const fn emin(self) -> i32 {
        1 - self.bias()
    }

    /// Lane partition of the 64-bit floating-point datapath.
    #[inline]
    pub const fn view(self) -> LaneView {
        LaneView::new(FP_DATAPATH_BITS, self.width())
    }

    /// Number of lanes in the 64-bit datapath.
    #[inline]
    pub const fn lanes(self) -> usize {
        (FP_DATAPATH_BITS / self.width()) as usize
    }

    /// Next wider format, used by widening reductions.
    pub const fn widened(self) -> UnitResult<Self> {
        match self {
            Self::F16 => Ok(Self::F32),
            Self::F32 => Ok(Self::F64),
            Self::F64 => Err(UnitError::WidenUnsupported(Self::F64)),
        }
    }
}

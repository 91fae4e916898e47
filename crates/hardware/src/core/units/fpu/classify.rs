//! Floating-point classification (RISC-V `vfclass`).
//!
//! Produces a 10-bit one-hot mask per lane:
//!
//! | Bit | Class          |
//! |-----|----------------|
//! | 0   | −∞             |
//! | 1   | negative normal|
//! | 2   | negative subnormal |
//! | 3   | −0             |
//! | 4   | +0             |
//! | 5   | positive subnormal |
//! | 6   | positive normal|
//! | 7   | +∞             |
//! | 8   | signaling NaN  |
//! | 9   | quiet NaN      |

use super::format::Format;
use super::nan_handling::{is_infinite, is_nan, is_negative, is_snan, is_zero};

/// Class of a floating-point encoding, in one-hot bit order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FpClass {
    /// −∞.
    NegInfinity = 0,
    /// Negative normal number.
    NegNormal = 1,
    /// Negative subnormal number.
    NegSubnormal = 2,
    /// −0.
    NegZero = 3,
    /// +0.
    PosZero = 4,
    /// Positive subnormal number.
    PosSubnormal = 5,
    /// Positive normal number.
    PosNormal = 6,
    /// +∞.
    PosInfinity = 7,
    /// Signaling NaN.
    SignalingNan = 8,
    /// Quiet NaN.
    QuietNan = 9,
}

impl FpClass {
    /// Classifies raw lane bits of format `fmt`.
    pub const fn of(fmt: Format, bits: u64) -> Self {
        let negative = is_negative(fmt, bits);
        if is_nan(fmt, bits) {
            if is_snan(fmt, bits) {
                Self::SignalingNan
            } else {
                Self::QuietNan
            }
        } else if is_infinite(fmt, bits) {
            if negative { Self::NegInfinity } else { Self::PosInfinity }
        } else if is_zero(fmt, bits) {
            if negative { Self::NegZero } else { Self::PosZero }
        } else if (bits >> fmt.frac_bits()) & fmt.exp_max() == 0 {
            if negative { Self::NegSubnormal } else { Self::PosSubnormal }
        } else if negative {
            Self::NegNormal
        } else {
            Self::PosNormal
        }
    }

    /// One-hot classification mask.
    #[inline]
    pub const fn mask(self) -> u64 {
        1 << self as u8
    }
}

/// Convenience wrapper returning the one-hot mask directly.
#[inline]
pub const fn fclass(fmt: Format, bits: u64) -> u64 {
    FpClass::of(fmt, bits).mask()
}

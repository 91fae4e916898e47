//! Floating-point rounding modes.
//!
//! RISC-V defines five rounding modes:
//!
//! | Value | Mode | Description                             |
//! |-------|------|-----------------------------------------|
//! | 0b000 | RNE  | Round to Nearest, ties to Even          |
//! | 0b001 | RTZ  | Round towards Zero                      |
//! | 0b010 | RDN  | Round Down (towards −∞)                 |
//! | 0b011 | RUP  | Round Up (towards +∞)                   |
//! | 0b100 | RMM  | Round to Nearest, ties to Max Magnitude |
//!
//! The units receive the mode explicitly with every operation; there is no
//! dynamic (`frm`) encoding at this boundary.

use crate::common::error::{UnitError, UnitResult};

/// RISC-V rounding mode encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum RoundingMode {
    /// Round to Nearest, ties to Even (default IEEE mode).
    #[default]
    Rne = 0b000,
    /// Round towards Zero.
    Rtz = 0b001,
    /// Round Down (towards −∞).
    Rdn = 0b010,
    /// Round Up (towards +∞).
    Rup = 0b011,
    /// Round to Nearest, ties to Max Magnitude.
    Rmm = 0b100,
}

impl RoundingMode {
    /// Every mode, in encoding order.
    pub const ALL: [Self; 5] = [Self::Rne, Self::Rtz, Self::Rdn, Self::Rup, Self::Rmm];

    /// Decodes the 3-bit rounding-mode selector.
    ///
    /// Encodings 0b101..=0b111 are rejected.
    pub const fn from_bits(bits: u8) -> UnitResult<Self> {
        match bits & 0x7 {
            0b000 => Ok(Self::Rne),
            0b001 => Ok(Self::Rtz),
            0b010 => Ok(Self::Rdn),
            0b011 => Ok(Self::Rup),
            0b100 => Ok(Self::Rmm),
            _ => Err(UnitError::InvalidRoundingMode(bits)),
        }
    }

    /// Decides whether a truncated magnitude must be incremented by one ulp.
    ///
    /// * `negative` - sign of the value being rounded.
    /// * `odd`      - least significant kept bit.
    /// * `round`    - first discarded bit.
    /// * `sticky`   - OR of every discarded bit below `round`.
    #[inline]
    pub const fn round_up(self, negative: bool, odd: bool, round: bool, sticky: bool) -> bool {
        match self {
            Self::Rne => round && (sticky || odd),
            Self::Rtz => false,
            Self::Rdn => negative && (round || sticky),
            Self::Rup => !negative && (round || sticky),
            Self::Rmm => round,
        }
    }

    /// Returns true if an overflowing result of the given sign becomes
    /// infinity (otherwise it saturates to the largest finite magnitude).
    #[inline]
    pub const fn overflows_to_infinity(self, negative: bool) -> bool {
        match self {
            Self::Rne | Self::Rmm => true,
            Self::Rtz => false,
            Self::Rdn => negative,
            Self::Rup => !negative,
        }
    }

    /// Sign of an exact zero produced by adding operands of opposite sign.
    ///
    /// Only round-down yields `-0`.
    #[inline]
    pub const fn cancellation_is_negative(self) -> bool {
        matches!(self, Self::Rdn)
    }
}

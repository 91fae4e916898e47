//! Floating-point exception (accrued) flags.
//!
//! RISC-V defines five exception flags (`fflags`):
//!
//! | Bit | Flag | Description         |
//! |-----|------|---------------------|
//! |  4  | NV   | Invalid Operation   |
//! |  3  | DZ   | Divide by Zero      |
//! |  2  | OF   | Overflow            |
//! |  1  | UF   | Underflow           |
//! |  0  | NX   | Inexact             |
//!
//! The vector units report one 5-bit field per lane. [`FlagRegister`]
//! concatenates those fields with lane 0 in the low bits.

use std::ops::{BitOr, BitOrAssign};

use crate::common::lanes::FP_DATAPATH_BITS;

/// Width of one lane's flag field.
pub const FLAG_FIELD_BITS: u32 = 5;

/// Most lanes a float register holds (F16 lanes).
const MAX_LANES: usize = (FP_DATAPATH_BITS / 16) as usize;

/// Floating-point exception flags for one lane.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FpFlags(u8);

impl FpFlags {
    /// No exceptions raised.
    pub const NONE: Self = Self(0);
    /// Invalid Operation.
    pub const NV: Self = Self(1 << 4);
    /// Divide by Zero.
    pub const DZ: Self = Self(1 << 3);
    /// Overflow.
    pub const OF: Self = Self(1 << 2);
    /// Underflow.
    pub const UF: Self = Self(1 << 1);
    /// Inexact.
    pub const NX: Self = Self(1 << 0);

    /// Builds a flag set from a raw 5-bit value; higher bits are dropped.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x1F)
    }

    /// Returns the raw 5-bit flag value.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// Returns true if no flags are set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Returns true if the specified flag is set.
    pub const fn contains(self, other: Self) -> bool {
        (self.0 & other.0) == other.0
    }
}

impl BitOr for FpFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for FpFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Packed per-lane flag register: 5 bits per lane, lane 0 lowest.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FlagRegister(u32);

impl FlagRegister {
    /// Packs per-lane flags, lane 0 first.
    pub fn from_lanes<I>(lanes: I) -> Self
    where
        I: IntoIterator<Item = FpFlags>,
    {
        Self(
            lanes
                .into_iter()
                .enumerate()
                .fold(0, |acc, (i, f)| acc | (u32::from(f.bits()) << (i as u32 * FLAG_FIELD_BITS))),
        )
    }

    /// Raw register value.
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Flag field of lane `index`.
    pub const fn lane(self, index: usize) -> FpFlags {
        FpFlags::from_bits((self.0 >> (index as u32 * FLAG_FIELD_BITS)) as u8)
    }

    /// Union of every lane's flags, as accrued into `fflags`.
    pub fn accrued(self) -> FpFlags {
        (0..MAX_LANES).fold(FpFlags::NONE, |acc, i| acc | self.lane(i))
    }
}

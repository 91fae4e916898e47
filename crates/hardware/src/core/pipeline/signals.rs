//! Control signals shared by the vector functional units.
//!
//! This module defines the control fields a caller drives alongside the
//! packed operands. It performs:
//! 1. **Operation Classification:** The closed set of opcodes and the unit each belongs to.
//! 2. **Selector Decoding:** Raw 5-bit opcode, 2-bit format and 3-bit rounding
//!    fields into typed values, rejecting reserved encodings.

use crate::common::error::{UnitError, UnitResult};
use crate::core::units::fpu::format::Format;
use crate::core::units::fpu::rounding_modes::RoundingMode;

/// Floating-point unit an opcode is routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnitKind {
    /// Floating-point adder / compare / classify / reduce unit.
    Adder,
    /// Floating-point fused multiply-add unit.
    Fma,
}

/// Floating-point operation selected by the 5-bit opcode field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FpOp {
    /// Lane-wise addition.
    Add = 0,
    /// Lane-wise subtraction.
    Sub = 1,
    /// Lane-wise NaN-aware maximum.
    Max = 2,
    /// Lane-wise NaN-aware minimum.
    Min = 3,
    /// Lane-wise classification of operand A.
    Classify = 4,
    /// Masked tree-reduction sum.
    RedSum = 5,
    /// Masked tree-reduction sum into the next wider format.
    WidenRedSum = 6,

    /// Product only (`a * b`); the addend operand is ignored.
    Mul = 8,
    /// `a * b + c`.
    MAdd = 9,
    /// `a * b - c`.
    MSub = 10,
    /// `-(a * b) - c`.
    NMAdd = 11,
    /// `-(a * b) + c`.
    NMSub = 12,
}

impl FpOp {
    /// Decodes the 5-bit opcode field.
    pub const fn from_bits(bits: u8) -> UnitResult<Self> {
        Ok(match bits {
            0 => Self::Add,
            1 => Self::Sub,
            2 => Self::Max,
            3 => Self::Min,
            4 => Self::Classify,
            5 => Self::RedSum,
            6 => Self::WidenRedSum,
            8 => Self::Mul,
            9 => Self::MAdd,
            10 => Self::MSub,
            11 => Self::NMAdd,
            12 => Self::NMSub,
            _ => return Err(UnitError::UndefinedOpcode(bits)),
        })
    }

    /// Opcode encoding.
    #[inline]
    pub const fn bits(self) -> u8 {
        self as u8
    }

    /// The unit that executes this operation.
    pub const fn unit(self) -> UnitKind {
        match self {
            Self::Add
            | Self::Sub
            | Self::Max
            | Self::Min
            | Self::Classify
            | Self::RedSum
            | Self::WidenRedSum => UnitKind::Adder,
            Self::Mul | Self::MAdd | Self::MSub | Self::NMAdd | Self::NMSub => UnitKind::Fma,
        }
    }

    /// Returns true for the reduction opcodes.
    #[inline]
    pub const fn is_reduction(self) -> bool {
        matches!(self, Self::RedSum | Self::WidenRedSum)
    }

    /// Fails with [`UnitError::WrongUnit`] unless this op runs on `unit`.
    pub fn expect_unit(self, unit: UnitKind) -> UnitResult<()> {
        if self.unit() == unit {
            Ok(())
        } else {
            Err(UnitError::WrongUnit { op: self, unit })
        }
    }
}

/// Decoded opcode, format and rounding mode of one floating-point issue.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FpControl {
    /// Operation.
    pub op: FpOp,
    /// Lane format.
    pub format: Format,
    /// Rounding mode for every inexact lane result.
    pub rm: RoundingMode,
}

impl FpControl {
    /// Bundles already-typed control fields.
    pub const fn new(op: FpOp, format: Format, rm: RoundingMode) -> Self {
        Self { op, format, rm }
    }

    /// Decodes raw boundary selectors.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::ReservedFormat`], [`UnitError::UndefinedOpcode`] or
    /// [`UnitError::InvalidRoundingMode`] for encodings with no defined meaning.
    pub const fn decode(format_bits: u8, op_bits: u8, rm_bits: u8) -> UnitResult<Self> {
        let format = match Format::from_bits(format_bits) {
            Ok(f) => f,
            Err(e) => return Err(e),
        };
        let op = match FpOp::from_bits(op_bits) {
            Ok(op) => op,
            Err(e) => return Err(e),
        };
        let rm = match RoundingMode::from_bits(rm_bits) {
            Ok(rm) => rm,
            Err(e) => return Err(e),
        };
        Ok(Self { op, format, rm })
    }
}

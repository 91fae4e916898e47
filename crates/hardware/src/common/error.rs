//! Boundary error definitions.
//!
//! Arithmetic exceptions are never errors in this crate: they are reported as
//! [`FpFlags`](crate::core::units::fpu::exception_flags::FpFlags) next to the
//! numeric result. The types here cover misuse of a unit's boundary instead:
//! 1. **Decode Errors:** Reserved or undefined selector encodings.
//! 2. **Routing Errors:** Operations issued to a unit that does not implement them.
//! 3. **Sequencing Errors:** Out-of-order reduction micro-ops and issue-port conflicts.
//!
//! A request rejected with one of these errors leaves the unit untouched.

use thiserror::Error;

use crate::core::pipeline::signals::{FpOp, UnitKind};
use crate::core::units::fpu::format::Format;

/// Errors raised when a caller drives a functional unit incorrectly.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum UnitError {
    /// The 2-bit format selector carried the reserved encoding `0b00`.
    ///
    /// The associated value is the raw selector.
    #[error("reserved floating-point format selector {0:#04b}")]
    ReservedFormat(u8),

    /// The 5-bit opcode field does not name any operation.
    #[error("undefined opcode {0:#07b}")]
    UndefinedOpcode(u8),

    /// The 3-bit rounding-mode selector carried a reserved encoding (5..=7).
    #[error("invalid rounding mode selector {0:#05b}")]
    InvalidRoundingMode(u8),

    /// The divider element-width selector is out of range.
    #[error("invalid element width selector {0}")]
    InvalidElementWidth(u8),

    /// An operation was issued to a unit that does not implement it.
    #[error("{op:?} is not executed by the {unit:?} unit")]
    WrongUnit {
        /// The operation that was issued.
        op: FpOp,
        /// The unit it was issued to.
        unit: UnitKind,
    },

    /// A widening reduction was requested for a format with no wider sibling.
    #[error("cannot widen {0:?} lanes")]
    WidenUnsupported(Format),

    /// A reduction micro-op arrived with the wrong step index.
    #[error("reduction micro-op {got} issued while step {expected} was expected")]
    ReductionOutOfSequence {
        /// Step index the pending fold is waiting for.
        expected: u8,
        /// Step index carried by the issued micro-op.
        got: u8,
    },

    /// A second operation was issued on a cycle whose issue slot was already taken.
    #[error("issue slot already used in cycle {cycle}")]
    IssueConflict {
        /// Cycle on which the conflict happened.
        cycle: u64,
    },

    /// A request was submitted while the divider was not ready to accept it.
    #[error("divider is not accepting requests")]
    DividerBusy,
}

/// Result alias for fallible unit operations.
pub type UnitResult<T> = Result<T, UnitError>;

//! Floating-Point Units.
//!
//! This module implements the two vector floating-point units that share the
//! 64-bit lane-packed datapath. It handles half (F16), single (F32) and double
//! (F64) precision, with every result rounded exactly once.
//!
//! Operations are organized into submodules:
//! - [`format`]: Field layout, canonical NaN and lane count per format.
//! - [`softfloat`]: Exact unpack, align, add, multiply and the single rounding step.
//! - [`nan_handling`]: Operand predicates, signaling-NaN detection and max/min.
//! - [`classify`]: The ten-way class mask.
//! - [`rounding_modes`] and [`exception_flags`]: Rounding control and the flag set.
//! - [`reduction`]: The explicit fold state of masked reduction sums.
//! - [`adder`] and [`fma`]: The pipelined units built on the above.

/// Pipelined add / sub / max / min / classify / reduce unit.
pub mod adder;

/// Ten-way operand classification.
pub mod classify;

/// Exception flags and the packed per-lane flag register.
pub mod exception_flags;

/// Pipelined fused multiply-add unit.
pub mod fma;

/// IEEE 754 binary16/32/64 field layouts.
pub mod format;

/// NaN predicates, signaling detection and NaN-aware max/min.
pub mod nan_handling;

/// Masked tree-reduction state.
pub mod reduction;

/// Rounding mode definitions and the rounding decision.
pub mod rounding_modes;

/// Exact arithmetic core with single rounding.
pub mod softfloat;

pub use self::adder::{AdderRequest, FloatingAdderUnit, FoldFields};
pub use self::exception_flags::{FlagRegister, FpFlags};
pub use self::fma::{FloatingFmaUnit, FmaRequest};
pub use self::format::Format;
pub use self::reduction::{FoldOutcome, FoldStep, ReductionFold, ReductionResult};
pub use self::rounding_modes::RoundingMode;

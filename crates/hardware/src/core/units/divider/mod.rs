//! SIMD Integer Divider.
//!
//! Divides every 8/16/32/64-bit lane of a 128-bit dividend register by the
//! matching lane of a divisor register, producing packed quotients, packed
//! remainders and a per-lane divide-by-zero mask. Division is restoring and
//! takes `ceil(width / bits_per_cycle) + overhead_cycles` cycles, so narrow
//! lanes finish sooner.
//!
//! Results follow the RISC-V M extension: division by zero gives an
//! all-ones quotient and returns the dividend as remainder, signed division
//! truncates toward zero, and `MIN / -1` gives `MIN` with remainder zero.
//! None of these trap.

/// Restoring division of one lane, and the whole-request reference.
pub mod algorithm;

/// Element widths, requests and results.
pub mod request;

/// The handshake state machine.
pub mod unit;

pub use self::algorithm::{divide, pack};
pub use self::request::{DivRequest, DivResult, ElementWidth};
pub use self::unit::{DivPorts, DivState, IntegerDividerUnit, TickOutcome};

//! Functional-unit core.
//!
//! This module contains the pipeline plumbing shared by the fixed-latency
//! units and the units themselves.

/// Control signals, fixed-latency queue and output latches.
pub mod pipeline;

/// Execution units (floating-point adder, FMA, integer divider).
pub mod units;

pub use self::units::divider::IntegerDividerUnit;
pub use self::units::fpu::{FloatingAdderUnit, FloatingFmaUnit};

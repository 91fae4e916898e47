//! Execution units.
//!
//! This module contains the three vector functional units: the floating-point
//! adder and fused multiply-add unit sharing the 64-bit lane datapath, and
//! the integer divider on the 128-bit datapath.

/// SIMD integer divider with valid/ready handshakes.
pub mod divider;

/// Floating-point adder and FMA units for IEEE 754 lanes.
pub mod fpu;

//! Pipeline plumbing shared by the floating-point units.
//!
//! This module contains the pieces that turn a combinational datapath into a
//! fixed-latency, fully pipelined unit: control signals, the in-flight queue,
//! and the output latches.

/// Output registers and retirement write-back.
pub mod latches;

/// Fixed-latency ring buffer of in-flight operations.
pub mod latency;

/// Opcode, format and rounding-mode control signals.
pub mod signals;

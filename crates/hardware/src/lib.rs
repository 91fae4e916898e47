//! Cycle-level RISC-V vector arithmetic units.
//!
//! This crate models three independent functional units operating on packed
//! lanes of a fixed-width datapath:
//! 1. **Adder:** Add, subtract, max, min, classify and masked reduction sum
//!    over F16/F32/F64 lanes of a 64-bit register.
//! 2. **FMA:** The fused multiply-add family with a single rounding step.
//! 3. **Divider:** A handshake-driven multi-cycle SIMD integer divider over
//!    8/16/32/64-bit lanes of a 128-bit register.
//!
//! Results are bit-exact, including the 5-bit IEEE exception flags of every
//! lane, and every unit is advanced explicitly one clock at a time.

/// Shared types (lane containers, masks, errors).
pub mod common;
/// Unit configuration (defaults, validation, JSON loading).
pub mod config;
/// Pipeline plumbing and the functional units.
pub mod core;

/// Root configuration type; use `Config::default()` or `Config::from_json`.
pub use crate::config::Config;
/// The three functional units.
pub use crate::core::{FloatingAdderUnit, FloatingFmaUnit, IntegerDividerUnit};

//! Common types shared by every functional unit.
//!
//! This module provides the building blocks that sit below the units:
//! 1. **Lanes:** Fixed-width packed registers, lane views, and lane masks.
//! 2. **Error Handling:** Boundary errors for misdriven units.

/// Boundary error types.
pub mod error;

/// Lane-packed containers, lane views, and masks.
pub mod lanes;

pub use error::{UnitError, UnitResult};
pub use lanes::{DivVector, FpVector, LaneMask, LaneView, PackedVector};

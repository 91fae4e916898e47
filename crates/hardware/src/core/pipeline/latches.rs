//! Output latches of the fixed-latency floating-point units.
//!
//! Results are computed when an operation is issued and carried through the
//! [`LatencyPipe`](super::latency::LatencyPipe) as a [`Retirement`]. On the
//! retiring cycle the [`OutputLatch`] merges it into the unit's result register:
//! 1. **Lane Write-Back:** Only lanes enabled by the write mask are replaced;
//!    masked-off lanes keep their previous contents.
//! 2. **Flag Register:** Replaced wholesale; disabled lanes report no flags.
//! 3. **Valid Pulse:** Asserted for exactly the retiring cycle.

use crate::common::lanes::{FpVector, LaneMask, LaneView};
use crate::core::units::fpu::exception_flags::FlagRegister;

/// Which part of the result register a retiring operation writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteBack {
    /// Lanes of `view` selected by `mask`.
    Lanes {
        /// Lane partition of the operation's format.
        view: LaneView,
        /// Lanes to write.
        mask: LaneMask,
    },
    /// The whole register (folded vectors and zero-extended reduction scalars).
    Full,
}

/// Result of one operation, computed at issue and applied at retirement.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Retirement {
    /// Packed lane results.
    pub value: FpVector,
    /// Packed per-lane flags (disabled lanes already zero).
    pub flags: FlagRegister,
    /// Write-back policy.
    pub write: WriteBack,
}

/// Result and flag registers plus the result-valid pulse.
#[derive(Clone, Copy, Debug, Default)]
pub struct OutputLatch {
    result: FpVector,
    flags: FlagRegister,
    valid: bool,
}

impl OutputLatch {
    /// Current contents of the result register.
    #[inline]
    pub const fn result(&self) -> FpVector {
        self.result
    }

    /// Current contents of the packed flag register.
    #[inline]
    pub const fn flags(&self) -> FlagRegister {
        self.flags
    }

    /// Returns true on the cycle an operation retired.
    #[inline]
    pub const fn valid(&self) -> bool {
        self.valid
    }

    /// Drops the valid pulse at the start of a new cycle.
    #[inline]
    pub fn clear_valid(&mut self) {
        self.valid = false;
    }

    /// Applies a retiring operation.
    pub fn retire(&mut self, r: Retirement) {
        match r.write {
            WriteBack::Lanes { view, mask } => {
                for i in (0..view.count()).filter(|&i| mask.is_active(i)) {
                    self.result.set_lane(view, i, r.value.lane(view, i));
                }
            }
            WriteBack::Full => self.result = r.value,
        }
        self.flags = r.flags;
        self.valid = true;
    }
}

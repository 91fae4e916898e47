//! Masked tree-reduction sum.
//!
//! A reduction is a short micro-op sequence carried by an explicit
//! [`ReductionFold`] value instead of hidden register state, so a sequence can
//! be replayed deterministically:
//! 1. **Begin:** micro-op 0 creates the fold with the accumulator set to the
//!    additive identity.
//! 2. **Fold Steps:** each `is_fold` step adds a source register and its fold
//!    partner lane by lane and emits the folded register. The accumulator is
//!    untouched; the fold is returned for the next step.
//! 3. **Terminal Step:** widens the source lanes if asked, halves the lane
//!    count until one value remains, adds it to the accumulator and consumes
//!    the fold.
//!
//! Lanes outside the reduction mask contribute the identity. The identity is
//! `-0` unless rounding down, where it is `+0`; folding it into any value
//! leaves that value unchanged, so a reduction over no lanes returns the
//! identity itself.

use tracing::trace;

use super::adder::fadd;
use super::exception_flags::{FlagRegister, FpFlags};
use super::format::Format;
use super::rounding_modes::RoundingMode;
use super::softfloat::{widen, zero};
use crate::common::error::{UnitError, UnitResult};
use crate::common::lanes::{FpVector, LaneMask};

/// Additive identity of a reduction in `fmt` under `rm`.
#[inline]
pub const fn identity(fmt: Format, rm: RoundingMode) -> u64 {
    zero(fmt, !matches!(rm, RoundingMode::Rdn))
}

/// Inputs of one reduction micro-op.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FoldStep {
    /// Source register.
    pub source: FpVector,
    /// Lanes of `source` taking part in the reduction.
    pub mask: LaneMask,
    /// Fold partner register (fold steps only).
    pub partner: FpVector,
    /// Lanes of `partner` taking part in the reduction.
    pub partner_mask: LaneMask,
    /// Fold step (`true`) or terminal combine step (`false`).
    pub is_fold: bool,
    /// Accumulate into the next wider format (read on micro-op 0 only).
    pub widen: bool,
    /// Position of this micro-op in its sequence.
    pub uop_index: u8,
}

impl FoldStep {
    /// Single terminal step reducing `source` under `mask`.
    pub const fn terminal(source: FpVector, mask: LaneMask) -> Self {
        Self {
            source,
            mask,
            partner: FpVector::ZERO,
            partner_mask: LaneMask::NONE,
            is_fold: false,
            widen: false,
            uop_index: 0,
        }
    }

    /// Fold step combining `source` and `partner`.
    pub const fn fold(source: FpVector, mask: LaneMask, partner: FpVector, partner_mask: LaneMask) -> Self {
        Self {
            source,
            mask,
            partner,
            partner_mask,
            is_fold: true,
            widen: false,
            uop_index: 0,
        }
    }

    /// Sets the micro-op index.
    #[must_use]
    pub const fn at(mut self, uop_index: u8) -> Self {
        self.uop_index = uop_index;
        self
    }

    /// Requests a widening accumulation.
    #[must_use]
    pub const fn widening(mut self) -> Self {
        self.widen = true;
        self
    }
}

/// Scalar emitted by a terminal step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReductionResult {
    /// Result bits in `format`.
    pub scalar: u64,
    /// Accumulator format (the source format, or the next wider one).
    pub format: Format,
    /// Flags raised by the terminal step.
    pub flags: FpFlags,
}

/// What a micro-op left behind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FoldOutcome {
    /// A fold step ran; the fold continues.
    Folded {
        /// Updated fold state, expecting the next micro-op.
        fold: ReductionFold,
        /// Source and partner added lane by lane, in the source format.
        folded: FpVector,
        /// Flags raised by this step, per lane.
        flags: FlagRegister,
    },
    /// The terminal step ran and the fold was consumed.
    Complete(ReductionResult),
}

/// In-progress reduction: accumulator and step index.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReductionFold {
    format: Format,
    acc_format: Format,
    rm: RoundingMode,
    /// Running scalar, in `acc_format`.
    acc: u64,
    step: u8,
}

impl ReductionFold {
    /// Starts a reduction over `format` lanes.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::WidenUnsupported`] when widening F64.
    pub fn begin(format: Format, rm: RoundingMode, widen: bool) -> UnitResult<Self> {
        let acc_format = if widen { format.widened()? } else { format };
        Ok(Self {
            format,
            acc_format,
            rm,
            acc: identity(acc_format, rm),
            step: 0,
        })
    }

    /// Reduces one register in a single terminal micro-op.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::WidenUnsupported`] when widening F64.
    pub fn reduce(format: Format, rm: RoundingMode, source: FpVector, mask: LaneMask, widen: bool) -> UnitResult<ReductionResult> {
        let fold = Self::begin(format, rm, widen)?;
        Ok(fold.combine(&FoldStep::terminal(source, mask)))
    }

    /// Step index the next micro-op must carry.
    #[inline]
    pub const fn expected_step(&self) -> u8 {
        self.step
    }

    /// Format the accumulator is kept in.
    #[inline]
    pub const fn acc_format(&self) -> Format {
        self.acc_format
    }

    /// Current accumulator bits.
    #[inline]
    pub const fn accumulator(&self) -> u64 {
        self.acc
    }

    /// Executes one micro-op.
    ///
    /// # Errors
    ///
    /// Returns [`UnitError::ReductionOutOfSequence`] when `step.uop_index`
    /// is not [`expected_step`](Self::expected_step).
    pub fn step(mut self, step: &FoldStep) -> UnitResult<FoldOutcome> {
        if step.uop_index != self.step {
            return Err(UnitError::ReductionOutOfSequence {
                expected: self.step,
                got: step.uop_index,
            });
        }
        if !step.is_fold {
            return Ok(FoldOutcome::Complete(self.combine(step)));
        }

        let view = self.format.view();
        let mut folded = FpVector::ZERO;
        let mut lane_flags = Vec::with_capacity(view.count());
        for i in 0..view.count() {
            let x = self.lane(step.source, step.mask, i);
            let y = self.lane(step.partner, step.partner_mask, i);
            let (sum, f) = fadd(self.format, self.rm, x, y);
            folded.set_lane(view, i, sum);
            lane_flags.push(f);
        }
        trace!(step = self.step, format = ?self.format, "reduction fold step");
        self.step += 1;
        Ok(FoldOutcome::Folded {
            fold: self,
            folded,
            flags: FlagRegister::from_lanes(lane_flags),
        })
    }

    /// Lane `i` of `reg`, or the identity if masked off.
    fn lane(&self, reg: FpVector, mask: LaneMask, i: usize) -> u64 {
        if mask.is_active(i) {
            reg.lane(self.format.view(), i)
        } else {
            identity(self.format, self.rm)
        }
    }

    /// Terminal step: widen, fold lanes pairwise, add to the accumulator.
    fn combine(self, step: &FoldStep) -> ReductionResult {
        let mut flags = FpFlags::NONE;
        let mut lanes: Vec<u64> = (0..self.format.lanes())
            .map(|i| {
                let raw = self.lane(step.source, step.mask, i);
                if self.acc_format == self.format {
                    return raw;
                }
                let (wide, f) = widen(self.format, self.acc_format, raw);
                flags |= f;
                wide
            })
            .collect();

        // Upper half onto lower half until one lane remains.
        while lanes.len() > 1 {
            let half = lanes.len() / 2;
            for i in 0..half {
                let (sum, f) = fadd(self.acc_format, self.rm, lanes[i], lanes[i + half]);
                lanes[i] = sum;
                flags |= f;
            }
            lanes.truncate(half);
        }

        let (scalar, f) = fadd(self.acc_format, self.rm, self.acc, lanes[0]);
        flags |= f;
        trace!(steps = self.step + 1, format = ?self.acc_format, "reduction complete");
        ReductionResult {
            scalar,
            format: self.acc_format,
            flags,
        }
    }
}

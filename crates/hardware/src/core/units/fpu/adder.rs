//! Floating-point adder unit.
//!
//! Add, subtract, max, min, classify and masked reduction-sum over the lanes
//! of the 64-bit datapath. The unit is fully pipelined: one operation may be
//! issued per cycle, and its result and flags appear `latency` cycles later
//! in issue order.
//!
//! Lane semantics:
//! - **Add/Sub**: correctly rounded; any NaN input gives the canonical NaN,
//!   and a signaling NaN or `inf - inf` raises NV. An exact zero from operands
//!   of opposite sign is `-0` only when rounding down.
//! - **Max/Min**: see [`fmax`] and [`fmin`].
//! - **Classify**: the one-hot mask of operand A written into the lane.
//! - **RedSum/WidenRedSum**: driven through [`ReductionFold`].

use tracing::{debug, warn};

use super::classify::fclass;
use super::exception_flags::{FlagRegister, FpFlags};
use super::format::Format;
use super::nan_handling::{fmax, fmin, is_infinite, is_nan, is_negative, is_zero, signaling_flags};
use super::reduction::{FoldOutcome, FoldStep, ReductionFold};
use super::rounding_modes::RoundingMode;
use super::softfloat::{add_exact, unpack, zero};
use crate::common::error::{UnitError, UnitResult};
use crate::common::lanes::{FpVector, LaneMask};
use crate::config::Config;
use crate::core::pipeline::latches::{OutputLatch, Retirement, WriteBack};
use crate::core::pipeline::latency::LatencyPipe;
use crate::core::pipeline::signals::{FpControl, FpOp, UnitKind};

/// Correctly rounded `a + b` on raw lane bits.
pub fn fadd(fmt: Format, rm: RoundingMode, a: u64, b: u64) -> (u64, FpFlags) {
    if is_nan(fmt, a) || is_nan(fmt, b) {
        return (fmt.canonical_nan(), signaling_flags(fmt, &[a, b]));
    }
    match (is_infinite(fmt, a), is_infinite(fmt, b)) {
        (true, true) if is_negative(fmt, a) != is_negative(fmt, b) => {
            return (fmt.canonical_nan(), FpFlags::NV);
        }
        (true, _) => return (a, FpFlags::NONE),
        (false, true) => return (b, FpFlags::NONE),
        (false, false) => {}
    }
    match (is_zero(fmt, a), is_zero(fmt, b)) {
        (true, true) => {
            let negative = if is_negative(fmt, a) == is_negative(fmt, b) {
                is_negative(fmt, a)
            } else {
                rm.cancellation_is_negative()
            };
            (zero(fmt, negative), FpFlags::NONE)
        }
        (true, false) => (b, FpFlags::NONE),
        (false, true) => (a, FpFlags::NONE),
        (false, false) => add_exact(fmt, rm, unpack(fmt, a), unpack(fmt, b)),
    }
}

/// Correctly rounded `a - b`, defined as `a + (-b)`.
#[inline]
pub fn fsub(fmt: Format, rm: RoundingMode, a: u64, b: u64) -> (u64, FpFlags) {
    fadd(fmt, rm, a, b ^ fmt.sign_mask())
}

/// Applies a lane-wise adder operation to one pair of lane values.
///
/// Reduction opcodes have no lane-wise meaning and return `None`.
pub fn lane_op(ctrl: FpControl, a: u64, b: u64) -> Option<(u64, FpFlags)> {
    let FpControl { op, format, rm } = ctrl;
    Some(match op {
        FpOp::Add => fadd(format, rm, a, b),
        FpOp::Sub => fsub(format, rm, a, b),
        FpOp::Max => fmax(format, a, b),
        FpOp::Min => fmin(format, a, b),
        FpOp::Classify => (fclass(format, a), FpFlags::NONE),
        _ => return None,
    })
}

/// One issue to the adder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AdderRequest {
    /// Opcode, format and rounding mode.
    pub ctrl: FpControl,
    /// Operand A (reduction source for reduction opcodes).
    pub a: FpVector,
    /// Operand B (unused by classify and reductions).
    pub b: FpVector,
    /// Write mask for lane-wise opcodes.
    pub mask: LaneMask,
    /// Reduction micro-op fields (reduction opcodes only).
    pub fold: FoldFields,
}

/// Reduction-specific control carried by an [`AdderRequest`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FoldFields {
    /// Lanes of operand A taking part in the reduction.
    pub red_mask: LaneMask,
    /// Fold step (`true`) or terminal step (`false`).
    pub is_fold: bool,
    /// Widening accumulation (forced on by `WidenRedSum`).
    pub widen: bool,
    /// Fold partner register.
    pub partner: FpVector,
    /// Lanes of the partner taking part in the reduction.
    pub partner_mask: LaneMask,
    /// Micro-op index within the reduction sequence.
    pub uop_index: u8,
}

impl AdderRequest {
    /// Lane-wise request with every lane enabled.
    pub const fn new(ctrl: FpControl, a: FpVector, b: FpVector) -> Self {
        Self {
            ctrl,
            a,
            b,
            mask: ctrl.format.view().all_lanes(),
            fold: FoldFields {
                red_mask: LaneMask::NONE,
                is_fold: false,
                widen: false,
                partner: FpVector::ZERO,
                partner_mask: LaneMask::NONE,
                uop_index: 0,
            },
        }
    }

    /// Single-step reduction of `source` over the lanes in `red_mask`.
    pub const fn reduction(ctrl: FpControl, source: FpVector, red_mask: LaneMask) -> Self {
        let mut req = Self::new(ctrl, source, FpVector::ZERO);
        req.fold.red_mask = red_mask;
        req
    }

    /// Replaces the write mask.
    #[must_use]
    pub const fn with_mask(mut self, mask: LaneMask) -> Self {
        self.mask = mask;
        self
    }

    /// Replaces the reduction fields.
    #[must_use]
    pub const fn with_fold(mut self, fold: FoldFields) -> Self {
        self.fold = fold;
        self
    }

    fn fold_step(&self) -> FoldStep {
        FoldStep {
            source: self.a,
            mask: self.fold.red_mask,
            partner: self.fold.partner,
            partner_mask: self.fold.partner_mask,
            is_fold: self.fold.is_fold,
            widen: self.fold.widen || self.ctrl.op == FpOp::WidenRedSum,
            uop_index: self.fold.uop_index,
        }
    }
}

/// Computes a lane-wise request combinationally.
///
/// Disabled lanes produce a zero value and a zero flag field.
fn execute_lanes(req: &AdderRequest) -> Retirement {
    let view = req.ctrl.format.view();
    let mut value = FpVector::ZERO;
    let mut flags = Vec::with_capacity(view.count());
    for i in 0..view.count() {
        if !req.mask.is_active(i) {
            flags.push(FpFlags::NONE);
            continue;
        }
        let (bits, f) = lane_op(req.ctrl, req.a.lane(view, i), req.b.lane(view, i))
            .unwrap_or((0, FpFlags::NONE));
        value.set_lane(view, i, bits);
        flags.push(f);
    }
    Retirement {
        value,
        flags: FlagRegister::from_lanes(flags),
        write: WriteBack::Lanes { view, mask: req.mask },
    }
}

/// Pipelined floating-point adder / compare / classify / reduce unit.
///
/// # Examples
///
/// ```
/// use rvvfu_core::config::Config;
/// use rvvfu_core::core::pipeline::signals::{FpControl, FpOp};
/// use rvvfu_core::core::units::fpu::adder::{AdderRequest, FloatingAdderUnit};
/// use rvvfu_core::core::units::fpu::format::Format;
/// use rvvfu_core::core::units::fpu::rounding_modes::RoundingMode;
///
/// let mut unit = FloatingAdderUnit::new(&Config::default());
/// let ctrl = FpControl::new(FpOp::Max, Format::F16, RoundingMode::Rne);
/// unit.issue(AdderRequest::new(ctrl, 0x4000_4000_u64.into(), 0x3C00_3C00_u64.into()))?;
/// unit.tick();
/// unit.tick();
/// assert!(unit.result_valid());
/// assert_eq!(unit.result().as_u64(), 0x4000_4000);
/// # Ok::<(), rvvfu_core::common::UnitError>(())
/// ```
#[derive(Debug)]
pub struct FloatingAdderUnit {
    pipe: LatencyPipe<Retirement>,
    out: OutputLatch,
    cycle: u64,
    last_issue: Option<u64>,
    /// Reduction in progress, if any; owned by this unit alone.
    fold: Option<ReductionFold>,
}

impl FloatingAdderUnit {
    /// Creates an idle unit with the configured latency.
    pub fn new(config: &Config) -> Self {
        Self::with_latency(config.adder.latency)
    }

    /// Creates an idle unit with an explicit latency.
    pub fn with_latency(latency: u64) -> Self {
        Self {
            pipe: LatencyPipe::new(latency),
            out: OutputLatch::default(),
            cycle: 0,
            last_issue: None,
            fold: None,
        }
    }

    /// Cycles from issue to result-valid.
    #[inline]
    pub const fn latency(&self) -> u64 {
        self.pipe.latency()
    }

    /// Current cycle number.
    #[inline]
    pub const fn cycle(&self) -> u64 {
        self.cycle
    }

    /// Returns true on the cycle an operation retired.
    #[inline]
    pub const fn result_valid(&self) -> bool {
        self.out.valid()
    }

    /// Packed result register.
    #[inline]
    pub const fn result(&self) -> FpVector {
        self.out.result()
    }

    /// Packed per-lane flag register.
    #[inline]
    pub const fn flags(&self) -> FlagRegister {
        self.out.flags()
    }

    /// Returns true while a reduction sequence is open.
    #[inline]
    pub const fn reduction_pending(&self) -> bool {
        self.fold.is_some()
    }

    /// Number of operations in flight.
    #[inline]
    pub const fn in_flight(&self) -> usize {
        self.pipe.len()
    }

    /// Issues an operation on the current cycle (the start pulse).
    ///
    /// # Errors
    ///
    /// - [`UnitError::WrongUnit`] for FMA opcodes.
    /// - [`UnitError::IssueConflict`] if an operation was already issued this cycle.
    /// - [`UnitError::ReductionOutOfSequence`] / [`UnitError::WidenUnsupported`]
    ///   for malformed reduction micro-ops.
    ///
    /// On error nothing is issued and the unit state is unchanged.
    pub fn issue(&mut self, req: AdderRequest) -> UnitResult<()> {
        req.ctrl.op.expect_unit(UnitKind::Adder)?;
        if self.last_issue == Some(self.cycle) || self.pipe.is_full() {
            return Err(UnitError::IssueConflict { cycle: self.cycle });
        }

        let retirement = if req.ctrl.op.is_reduction() {
            self.reduce(&req)?
        } else {
            if let Some(fold) = self.fold.take() {
                warn!(
                    step = fold.expected_step(),
                    op = ?req.ctrl.op,
                    "discarding unfinished reduction"
                );
            }
            execute_lanes(&req)
        };

        debug!(cycle = self.cycle, op = ?req.ctrl.op, format = ?req.ctrl.format, "adder issue");
        if self.pipe.push(self.cycle, retirement).is_err() {
            return Err(UnitError::IssueConflict { cycle: self.cycle });
        }
        self.last_issue = Some(self.cycle);
        Ok(())
    }

    /// Runs one reduction micro-op against the owned fold state.
    fn reduce(&mut self, req: &AdderRequest) -> UnitResult<Retirement> {
        let step = req.fold_step();
        let FpControl { format, rm, .. } = req.ctrl;
        let fold = if step.uop_index == 0 {
            if self.fold.is_some() {
                warn!("reduction restarted at micro-op 0");
            }
            ReductionFold::begin(format, rm, step.widen)?
        } else {
            match &self.fold {
                Some(f) if f.expected_step() == step.uop_index => {}
                Some(f) => {
                    return Err(UnitError::ReductionOutOfSequence {
                        expected: f.expected_step(),
                        got: step.uop_index,
                    });
                }
                None => {
                    return Err(UnitError::ReductionOutOfSequence {
                        expected: 0,
                        got: step.uop_index,
                    });
                }
            }
            self.fold.take().ok_or(UnitError::ReductionOutOfSequence {
                expected: 0,
                got: step.uop_index,
            })?
        };

        match fold.step(&step)? {
            FoldOutcome::Folded { fold, folded, flags } => {
                self.fold = Some(fold);
                Ok(Retirement {
                    value: folded,
                    flags,
                    write: WriteBack::Full,
                })
            }
            FoldOutcome::Complete(done) => {
                self.fold = None;
                debug!(format = ?done.format, scalar = done.scalar, "reduction result");
                Ok(Retirement {
                    value: FpVector::from(done.scalar),
                    flags: FlagRegister::from_lanes([done.flags]),
                    write: WriteBack::Full,
                })
            }
        }
    }

    /// Advances one clock cycle, retiring at most one operation.
    pub fn tick(&mut self) {
        self.cycle += 1;
        self.out.clear_valid();
        if let Some(r) = self.pipe.pop_ready(self.cycle) {
            self.out.retire(r);
            debug!(cycle = self.cycle, result = ?self.out.result(), "adder retire");
        }
    }
}

//! Fused multiply-add unit.
//!
//! Computes `±(a * b) ± c` per lane with a single rounding step: the product
//! is formed exactly in 128 bits and only the final sum is rounded. The unit
//! is fully pipelined with a fixed latency (4 cycles by default).
//!
//! | Opcode  | Result         |
//! |---------|----------------|
//! | `Mul`   | `a * b`        |
//! | `MAdd`  | `a * b + c`    |
//! | `MSub`  | `a * b - c`    |
//! | `NMSub` | `-(a * b) + c` |
//! | `NMAdd` | `-(a * b) - c` |
//!
//! `Mul` never reads `c`: the result is the rounded product alone, so the
//! sign of a zero product is preserved.

use tracing::debug;

use super::exception_flags::{FlagRegister, FpFlags};
use super::format::Format;
use super::nan_handling::{is_infinite, is_nan, is_negative, is_zero, signaling_flags};
use super::rounding_modes::RoundingMode;
use super::softfloat::{add_exact, infinity, mul_exact, round_pack, unpack, zero};
use crate::common::error::{UnitError, UnitResult};
use crate::common::lanes::{FpVector, LaneMask};
use crate::config::Config;
use crate::core::pipeline::latches::{OutputLatch, Retirement, WriteBack};
use crate::core::pipeline::latency::LatencyPipe;
use crate::core::pipeline::signals::{FpControl, FpOp, UnitKind};

/// Operand routing for one multiply-add opcode.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Routing {
    /// Whether the addend takes part at all.
    uses_addend: bool,
    /// Flip the sign of the product.
    negate_product: bool,
    /// Flip the sign of the addend.
    negate_addend: bool,
}

impl Routing {
    const fn of(op: FpOp) -> Option<Self> {
        let (uses_addend, negate_product, negate_addend) = match op {
            FpOp::Mul => (false, false, false),
            FpOp::MAdd => (true, false, false),
            FpOp::MSub => (true, false, true),
            FpOp::NMSub => (true, true, false),
            FpOp::NMAdd => (true, true, true),
            _ => return None,
        };
        Some(Self {
            uses_addend,
            negate_product,
            negate_addend,
        })
    }
}

/// Fused `±(a * b) ± c` on raw lane bits with one rounding.
///
/// Returns `None` for opcodes outside the multiply-add family.
pub fn fmadd(op: FpOp, fmt: Format, rm: RoundingMode, a: u64, b: u64, c: u64) -> Option<(u64, FpFlags)> {
    let route = Routing::of(op)?;
    let operands: &[u64] = if route.uses_addend { &[a, b, c] } else { &[a, b] };

    // 0 * inf is invalid even when the addend is a quiet NaN.
    if (is_infinite(fmt, a) && is_zero(fmt, b)) || (is_zero(fmt, a) && is_infinite(fmt, b)) {
        return Some((fmt.canonical_nan(), FpFlags::NV));
    }
    if operands.iter().any(|&x| is_nan(fmt, x)) {
        return Some((fmt.canonical_nan(), signaling_flags(fmt, operands)));
    }

    let prod_neg = (is_negative(fmt, a) != is_negative(fmt, b)) != route.negate_product;
    let addend = if route.negate_addend { c ^ fmt.sign_mask() } else { c };
    let add_neg = is_negative(fmt, addend);

    if is_infinite(fmt, a) || is_infinite(fmt, b) {
        if route.uses_addend && is_infinite(fmt, addend) && add_neg != prod_neg {
            return Some((fmt.canonical_nan(), FpFlags::NV));
        }
        return Some((infinity(fmt, prod_neg), FpFlags::NONE));
    }
    if route.uses_addend && is_infinite(fmt, addend) {
        return Some((addend, FpFlags::NONE));
    }

    let addend_zero = !route.uses_addend || is_zero(fmt, addend);
    if is_zero(fmt, a) || is_zero(fmt, b) {
        if !route.uses_addend {
            return Some((zero(fmt, prod_neg), FpFlags::NONE));
        }
        if addend_zero {
            let negative = if prod_neg == add_neg {
                prod_neg
            } else {
                rm.cancellation_is_negative()
            };
            return Some((zero(fmt, negative), FpFlags::NONE));
        }
        return Some((addend, FpFlags::NONE));
    }

    let mut product = mul_exact(unpack(fmt, a), unpack(fmt, b));
    product.negative = prod_neg;
    if addend_zero {
        return Some(round_pack(fmt, rm, product.negative, product.sig, product.exp));
    }
    Some(add_exact(fmt, rm, product, unpack(fmt, addend)))
}

/// One issue to the FMA unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FmaRequest {
    /// Opcode, format and rounding mode.
    pub ctrl: FpControl,
    /// Multiplicand.
    pub a: FpVector,
    /// Multiplier.
    pub b: FpVector,
    /// Addend (ignored by `Mul`).
    pub c: FpVector,
    /// Write mask.
    pub mask: LaneMask,
}

impl FmaRequest {
    /// Request with every lane enabled.
    pub const fn new(ctrl: FpControl, a: FpVector, b: FpVector, c: FpVector) -> Self {
        Self {
            ctrl,
            a,
            b,
            c,
            mask: ctrl.format.view().all_lanes(),
        }
    }

    /// Replaces the write mask.
    #[must_use]
    pub const fn with_mask(mut self, mask: LaneMask) -> Self {
        self.mask = mask;
        self
    }
}

/// Pipelined fused multiply-add unit.
#[derive(Debug)]
pub struct FloatingFmaUnit {
    pipe: LatencyPipe<Retirement>,
    out: OutputLatch,
    cycle: u64,
    last_issue: Option<u64>,
}

impl FloatingFmaUnit {
    /// Creates an idle unit with the configured latency.
    pub fn new(config: &Config) -> Self {
        Self::with_latency(config.fma.latency)
    }

    /// Creates an idle unit with an explicit latency.
    pub fn with_latency(latency: u64) -> Self {
        Self {
            pipe: LatencyPipe::new(latency),
            out: OutputLatch::default(),
            cycle: 0,
            last_issue: None,
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

    /// Number of operations in flight.
    #[inline]
    pub const fn in_flight(&self) -> usize {
        self.pipe.len()
    }

    /// Issues an operation on the current cycle.
    ///
    /// # Errors
    ///
    /// - [`UnitError::WrongUnit`] for adder opcodes.
    /// - [`UnitError::IssueConflict`] if an operation was already issued this cycle.
    pub fn issue(&mut self, req: FmaRequest) -> UnitResult<()> {
        req.ctrl.op.expect_unit(UnitKind::Fma)?;
        if self.last_issue == Some(self.cycle) || self.pipe.is_full() {
            return Err(UnitError::IssueConflict { cycle: self.cycle });
        }

        let FpControl { op, format, rm } = req.ctrl;
        let view = format.view();
        let mut value = FpVector::ZERO;
        let mut flags = Vec::with_capacity(view.count());
        for i in 0..view.count() {
            if !req.mask.is_active(i) {
                flags.push(FpFlags::NONE);
                continue;
            }
            let (bits, f) = fmadd(op, format, rm, req.a.lane(view, i), req.b.lane(view, i), req.c.lane(view, i))
                .unwrap_or((0, FpFlags::NONE));
            value.set_lane(view, i, bits);
            flags.push(f);
        }
        let retirement = Retirement {
            value,
            flags: FlagRegister::from_lanes(flags),
            write: WriteBack::Lanes { view, mask: req.mask },
        };

        debug!(cycle = self.cycle, ?op, ?format, "fma issue");
        if self.pipe.push(self.cycle, retirement).is_err() {
            return Err(UnitError::IssueConflict { cycle: self.cycle });
        }
        self.last_issue = Some(self.cycle);
        Ok(())
    }

    /// Advances one clock cycle, retiring at most one operation.
    pub fn tick(&mut self) {
        self.cycle += 1;
        self.out.clear_valid();
        if let Some(r) = self.pipe.pop_ready(self.cycle) {
            self.out.retire(r);
            debug!(cycle = self.cycle, result = ?self.out.result(), "fma retire");
        }
    }
}

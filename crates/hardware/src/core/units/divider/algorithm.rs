//! Per-lane restoring division.
//!
//! Each lane divides magnitudes one quotient bit at a time, most significant
//! bit first, and applies the signs at the end:
//! 1. **Preparation:** Take absolute values of signed operands and record the
//!    result signs. A zero divisor short-circuits to the divide-by-zero result.
//! 2. **Iteration:** Shift the next dividend bit into the partial remainder and
//!    subtract the divisor whenever it fits, setting the quotient bit.
//! 3. **Fix-up:** Negate the quotient when the operand signs differ and the
//!    remainder when the dividend was negative, truncating to the lane width.
//!
//! Truncating the negated magnitude quotient to the lane width makes
//! `MIN / -1` come out as `MIN` with remainder zero without a special case.

use super::request::{DivRequest, DivResult, ElementWidth};
use crate::common::lanes::DivVector;

/// Division state of a single lane.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LaneDivision {
    width: ElementWidth,
    dividend: u64,
    divisor: u64,
    /// Partial remainder; one bit wider than a lane while shifting.
    rem: u128,
    quot: u64,
    /// Dividend bits not yet shifted in.
    bits_left: u32,
    negate_quot: bool,
    negate_rem: bool,
    /// Raw dividend lane, kept for the divide-by-zero remainder.
    raw_dividend: u64,
    by_zero: bool,
}

const fn magnitude(value: u64, width: ElementWidth, signed: bool) -> (u64, bool) {
    let mask = width.view().lane_mask();
    if signed && value & width.sign_bit() != 0 {
        ((value.wrapping_neg()) & mask, true)
    } else {
        (value, false)
    }
}

impl LaneDivision {
    /// Prepares one lane from raw lane bits.
    pub const fn prepare(width: ElementWidth, signed: bool, dividend: u64, divisor: u64) -> Self {
        let (a, a_neg) = magnitude(dividend, width, signed);
        let (b, b_neg) = magnitude(divisor, width, signed);
        Self {
            width,
            dividend: a,
            divisor: b,
            rem: 0,
            quot: 0,
            bits_left: width.bits(),
            negate_quot: a_neg != b_neg,
            negate_rem: a_neg,
            raw_dividend: dividend,
            by_zero: divisor == 0,
        }
    }

    /// Returns true when the divisor is zero.
    #[inline]
    pub const fn by_zero(&self) -> bool {
        self.by_zero
    }

    /// Returns true once every quotient bit is known.
    #[inline]
    pub const fn is_complete(&self) -> bool {
        self.by_zero || self.bits_left == 0
    }

    /// Retires up to `bits` quotient bits.
    pub fn iterate(&mut self, bits: u32) {
        if self.by_zero {
            return;
        }
        let divisor = u128::from(self.divisor);
        for _ in 0..bits.min(self.bits_left) {
            self.bits_left -= 1;
            let next = (self.dividend >> self.bits_left) & 1;
            self.rem = (self.rem << 1) | u128::from(next);
            if self.rem >= divisor {
                self.rem -= divisor;
                self.quot |= 1 << self.bits_left;
            }
        }
    }

    /// Final `(quotient, remainder)` lane bits.
    ///
    /// Only meaningful once [`is_complete`](Self::is_complete) holds.
    pub const fn finish(&self) -> (u64, u64) {
        let mask = self.width.view().lane_mask();
        if self.by_zero {
            return (mask, self.raw_dividend & mask);
        }
        // rem < divisor <= lane max, so it fits a lane.
        let rem = self.rem as u64;
        let quot = if self.negate_quot { self.quot.wrapping_neg() } else { self.quot };
        let rem = if self.negate_rem { rem.wrapping_neg() } else { rem };
        (quot & mask, rem & mask)
    }
}

/// Lane states of a whole request; inactive lanes are `None`.
pub fn prepare_lanes(req: &DivRequest) -> Vec<Option<LaneDivision>> {
    let view = req.width.view();
    (0..view.count())
        .map(|i| {
            req.mask.is_active(i).then(|| {
                LaneDivision::prepare(
                    req.width,
                    req.signed,
                    req.dividend.lane(view, i),
                    req.divisor.lane(view, i),
                )
            })
        })
        .collect()
}

/// Packs finished lane states into a [`DivResult`].
pub fn collect(width: ElementWidth, lanes: &[Option<LaneDivision>]) -> DivResult {
    let view = width.view();
    let mut out = DivResult::default();
    for (i, lane) in lanes.iter().enumerate() {
        let Some(lane) = lane else { continue };
        let (q, r) = lane.finish();
        out.quotient.set_lane(view, i, q);
        out.remainder.set_lane(view, i, r);
        if lane.by_zero() {
            out.dz_mask |= 1 << i;
        }
    }
    out
}

/// Divides a whole request at once; the reference the cycle model must match.
pub fn divide(req: &DivRequest) -> DivResult {
    let mut lanes = prepare_lanes(req);
    for lane in lanes.iter_mut().flatten() {
        lane.iterate(req.width.bits());
    }
    collect(req.width, &lanes)
}

/// Convenience for building divider registers from lane values.
pub fn pack(width: ElementWidth, lanes: impl IntoIterator<Item = u64>) -> DivVector {
    DivVector::from_lanes(width.view(), lanes)
}

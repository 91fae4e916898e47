//! Bit-accurate rounding core.
//!
//! The host FPU cannot be used for the vector units: it has no F16, it only
//! rounds to nearest, and it does not report underflow. Values are therefore
//! carried as exact `(sign, significand, exponent)` triples in 128-bit
//! integers and rounded exactly once by [`round_pack`]:
//!
//! 1. **Unpack:** [`unpack`] turns a finite non-zero encoding into an exact triple.
//! 2. **Exact Arithmetic:** [`mul_exact`] forms full-width products; [`add_exact`]
//!    aligns two triples with a sticky ("jam") bit far below the rounding point.
//! 3. **Round and Pack:** [`round_pack`] applies the rounding mode, handles
//!    subnormals and overflow, and raises OF/UF/NX.
//!
//! Tininess is detected after rounding, as RISC-V requires: a result is tiny
//! when rounding it with an unbounded exponent range still leaves it below the
//! smallest normal magnitude.

use super::exception_flags::FpFlags;
use super::format::Format;
use super::nan_handling::{is_infinite, is_nan, is_negative, is_snan, is_zero};
use super::rounding_modes::RoundingMode;

/// Bit position the most significant set bit is moved to before alignment.
///
/// Leaves one bit of carry headroom and at least 15 bits below a full
/// double-precision product.
const NORM_BIT: u32 = 120;

/// A finite non-zero value `(-1)^negative * sig * 2^exp`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Unpacked {
    /// Sign.
    pub negative: bool,
    /// Exponent of the least significant bit of `sig`.
    pub exp: i32,
    /// Integer significand; never zero.
    pub sig: u128,
}

impl Unpacked {
    /// Same magnitude, opposite sign.
    #[inline]
    pub const fn negated(self) -> Self {
        Self {
            negative: !self.negative,
            ..self
        }
    }

    /// Moves the leading one to [`NORM_BIT`], keeping the value exact.
    #[inline]
    fn normalized(self) -> Self {
        let shift = self.sig.leading_zeros() as i32 - (127 - NORM_BIT as i32);
        if shift >= 0 {
            Self {
                sig: self.sig << shift,
                exp: self.exp - shift,
                ..self
            }
        } else {
            Self {
                sig: shift_right_jam(self.sig, shift.unsigned_abs()),
                exp: self.exp - shift,
                ..self
            }
        }
    }
}

/// Signed zero of `fmt`.
#[inline]
pub const fn zero(fmt: Format, negative: bool) -> u64 {
    if negative { fmt.sign_mask() } else { 0 }
}

/// Signed infinity of `fmt`.
#[inline]
pub const fn infinity(fmt: Format, negative: bool) -> u64 {
    fmt.infinity() | zero(fmt, negative)
}

/// Unpacks a finite, non-zero encoding into an exact triple.
///
/// Subnormals keep their reduced significand; nothing is normalized here.
pub const fn unpack(fmt: Format, bits: u64) -> Unpacked {
    let m = fmt.frac_bits();
    let biased = (bits >> m) & fmt.exp_max();
    let frac = bits & fmt.frac_mask();
    let negative = is_negative(fmt, bits);
    if biased == 0 {
        Unpacked {
            negative,
            exp: fmt.emin() - m as i32,
            sig: frac as u128,
        }
    } else {
        Unpacked {
            negative,
            exp: biased as i32 - fmt.bias() - m as i32,
            sig: (frac | (1 << m)) as u128,
        }
    }
}

/// Exact product of two triples.
#[inline]
pub const fn mul_exact(a: Unpacked, b: Unpacked) -> Unpacked {
    Unpacked {
        negative: a.negative != b.negative,
        exp: a.exp + b.exp,
        sig: a.sig * b.sig,
    }
}

/// Shifts right, ORing every discarded bit into the result's LSB.
#[inline]
pub const fn shift_right_jam(x: u128, shift: u32) -> u128 {
    if shift == 0 {
        x
    } else if shift >= 128 {
        (x != 0) as u128
    } else {
        (x >> shift) | ((x & ((1u128 << shift) - 1)) != 0) as u128
    }
}

/// Splits `sig` at bit `shift`: kept part, round bit, sticky bit.
///
/// A non-positive `shift` scales `sig` up; callers guarantee it fits.
#[inline]
const fn split(sig: u128, shift: i32) -> (u128, bool, bool) {
    if shift <= 0 {
        (sig << shift.unsigned_abs(), false, false)
    } else if shift > 128 {
        (0, false, sig != 0)
    } else {
        let s = shift as u32;
        let kept = if s == 128 { 0 } else { sig >> s };
        let round = (sig >> (s - 1)) & 1 == 1;
        let sticky = sig & ((1u128 << (s - 1)) - 1) != 0;
        (kept, round, sticky)
    }
}

/// Rounds an exact value to `fmt` and encodes it.
///
/// `sig * 2^exp` is the exact magnitude (any bits below `sig` must already
/// be folded into its LSB). `sig` must be non-zero.
pub fn round_pack(fmt: Format, rm: RoundingMode, negative: bool, sig: u128, exp: i32) -> (u64, FpFlags) {
    debug_assert!(sig != 0);
    let m = fmt.frac_bits() as i32;
    let emin = fmt.emin();
    let width = 128 - sig.leading_zeros() as i32;
    let e_msb = exp + width - 1;

    let mut lsb = (e_msb - m).max(emin - m);
    let (mut kept, round, sticky) = split(sig, lsb - exp);
    let inexact = round || sticky;

    let tiny = if e_msb >= emin {
        false
    } else if e_msb < emin - 1 {
        true
    } else {
        // One bit finer than the subnormal grid: does rounding carry to 2^emin?
        let (k, r, s) = split(sig, e_msb - m - exp);
        let carried = k + u128::from(rm.round_up(negative, k & 1 == 1, r, s));
        carried != 1u128 << (m + 1)
    };

    if rm.round_up(negative, kept & 1 == 1, round, sticky) {
        kept += 1;
        if kept == 1u128 << (m + 1) {
            kept >>= 1;
            lsb += 1;
        }
    }

    let mut flags = FpFlags::NONE;
    if inexact {
        flags |= FpFlags::NX;
        if tiny {
            flags |= FpFlags::UF;
        }
    }

    let sign = zero(fmt, negative);
    if kept < 1u128 << m {
        // Subnormal or zero: the biased exponent field stays 0.
        return (sign | kept as u64, flags);
    }

    let biased = lsb + m + fmt.bias();
    if biased >= fmt.exp_max() as i32 {
        let bits = if rm.overflows_to_infinity(negative) {
            infinity(fmt, negative)
        } else {
            sign | fmt.max_finite()
        };
        return (bits, FpFlags::OF | FpFlags::NX);
    }

    (
        sign | ((biased as u64) << m) | (kept as u64 & fmt.frac_mask()),
        flags,
    )
}

/// Adds two exact triples with a single rounding.
///
/// An exact zero sum is `-0` only under round-down.
pub fn add_exact(fmt: Format, rm: RoundingMode, a: Unpacked, b: Unpacked) -> (u64, FpFlags) {
    let a = a.normalized();
    let b = b.normalized();
    let (big, small) = if (a.exp, a.sig) >= (b.exp, b.sig) {
        (a, b)
    } else {
        (b, a)
    };
    let aligned = shift_right_jam(small.sig, (big.exp - small.exp).unsigned_abs());

    if big.negative == small.negative {
        return round_pack(fmt, rm, big.negative, big.sig + aligned, big.exp);
    }
    let diff = big.sig - aligned;
    if diff == 0 {
        return (zero(fmt, rm.cancellation_is_negative()), FpFlags::NONE);
    }
    round_pack(fmt, rm, big.negative, diff, big.exp)
}

/// Exact conversion of lane bits to a wider format.
///
/// NaNs become the target's canonical NaN; a signaling NaN raises NV.
pub fn widen(from: Format, to: Format, bits: u64) -> (u64, FpFlags) {
    debug_assert!(to.width() > from.width());
    let negative = is_negative(from, bits);
    if is_nan(from, bits) {
        let flags = if is_snan(from, bits) { FpFlags::NV } else { FpFlags::NONE };
        return (to.canonical_nan(), flags);
    }
    if is_infinite(from, bits) {
        return (infinity(to, negative), FpFlags::NONE);
    }
    if is_zero(from, bits) {
        return (zero(to, negative), FpFlags::NONE);
    }
    let v = unpack(from, bits);
    round_pack(to, RoundingMode::Rne, v.negative, v.sig, v.exp)
}

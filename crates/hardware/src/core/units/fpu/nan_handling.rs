//! NaN detection, canonical NaN propagation and NaN-aware max/min.
//!
//! All helpers work on raw lane bits of a given [`Format`]:
//!
//! - **Detection** ([`is_nan`], [`is_snan`]): a NaN has an all-ones exponent
//!   and a non-zero fraction; it is signaling when the most significant
//!   fraction bit is clear.
//! - **Canonicalization**: every NaN produced by an arithmetic operation is
//!   the format's canonical quiet NaN, discarding sign and payload.
//! - **Max/Min** ([`fmax`], [`fmin`]): IEEE 754-2019 `maximumNumber` /
//!   `minimumNumber` as adopted by RISC-V.

use super::exception_flags::FpFlags;
use super::format::Format;

/// Returns true if `bits` encodes any NaN.
#[inline]
pub const fn is_nan(fmt: Format, bits: u64) -> bool {
    let mag = bits & !fmt.sign_mask();
    mag > fmt.infinity()
}

/// Returns true if `bits` encodes a signaling NaN.
#[inline]
pub const fn is_snan(fmt: Format, bits: u64) -> bool {
    is_nan(fmt, bits) && bits & fmt.quiet_bit() == 0
}

/// Returns true if `bits` encodes ±∞.
#[inline]
pub const fn is_infinite(fmt: Format, bits: u64) -> bool {
    bits & !fmt.sign_mask() == fmt.infinity()
}

/// Returns true if `bits` encodes ±0.
#[inline]
pub const fn is_zero(fmt: Format, bits: u64) -> bool {
    bits & !fmt.sign_mask() == 0
}

/// Returns true if the sign bit is set.
#[inline]
pub const fn is_negative(fmt: Format, bits: u64) -> bool {
    bits & fmt.sign_mask() != 0
}

/// NV if any of the operands is a signaling NaN, otherwise no flags.
#[inline]
pub fn signaling_flags(fmt: Format, operands: &[u64]) -> FpFlags {
    if operands.iter().any(|&x| is_snan(fmt, x)) {
        FpFlags::NV
    } else {
        FpFlags::NONE
    }
}

/// Maps a non-NaN encoding onto an unsigned key with the same numeric order.
///
/// `-0` sorts immediately below `+0`.
#[inline]
const fn order_key(fmt: Format, bits: u64) -> u64 {
    if is_negative(fmt, bits) {
        !bits & (fmt.sign_mask() | (fmt.sign_mask() - 1))
    } else {
        bits | fmt.sign_mask()
    }
}

/// Shared NaN ladder for [`fmin`] and [`fmax`].
fn min_max(fmt: Format, a: u64, b: u64, pick_larger: bool) -> (u64, FpFlags) {
    let flags = signaling_flags(fmt, &[a, b]);
    let bits = match (is_nan(fmt, a), is_nan(fmt, b)) {
        (true, true) => fmt.canonical_nan(),
        (true, false) => b,
        (false, true) => a,
        (false, false) => {
            let a_larger = order_key(fmt, a) > order_key(fmt, b);
            if a_larger == pick_larger { a } else { b }
        }
    };
    (bits, flags)
}

/// NaN-aware minimum (RISC-V `vfmin`).
///
/// If exactly one operand is NaN, returns the other. If both are NaN,
/// returns the canonical NaN. A signaling NaN operand raises NV.
#[inline]
pub fn fmin(fmt: Format, a: u64, b: u64) -> (u64, FpFlags) {
    min_max(fmt, a, b, false)
}

/// NaN-aware maximum (RISC-V `vfmax`).
///
/// Same NaN rules as [`fmin`]; `+0` is larger than `-0`.
#[inline]
pub fn fmax(fmt: Format, a: u64, b: u64) -> (u64, FpFlags) {
    min_max(fmt, a, b, true)
}

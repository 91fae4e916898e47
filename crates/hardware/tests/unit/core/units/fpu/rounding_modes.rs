//! Correct rounding of the adder and FMA datapaths.
//!
//! Round-to-nearest-even results are compared bit for bit with host IEEE
//! arithmetic. The directed modes are checked by bracketing: when a result is
//! inexact, round-down and round-up must be adjacent encodings around the
//! exact value, and every other mode must pick one of the two.

use proptest::prelude::*;
use rvvfu_core::core::pipeline::signals::FpOp;
use rvvfu_core::core::units::fpu::adder::fadd;
use rvvfu_core::core::units::fpu::fma::fmadd;
use rvvfu_core::core::units::fpu::{FpFlags, Format, RoundingMode};

fn finite_f32() -> impl Strategy<Value = f32> {
    any::<u32>().prop_map(f32::from_bits).prop_filter("finite", |x| x.is_finite())
}

fn finite_f64() -> impl Strategy<Value = f64> {
    any::<u64>().prop_map(f64::from_bits).prop_filter("finite", |x| x.is_finite())
}

fn add32(rm: RoundingMode, a: f32, b: f32) -> (u64, FpFlags) {
    fadd(Format::F32, rm, u64::from(a.to_bits()), u64::from(b.to_bits()))
}

proptest! {
    #[test]
    fn f32_add_matches_host(a in finite_f32(), b in finite_f32()) {
        let (bits, _) = add32(RoundingMode::Rne, a, b);
        prop_assert_eq!(bits, u64::from((a + b).to_bits()));
    }

    #[test]
    fn f64_add_matches_host(a in finite_f64(), b in finite_f64()) {
        let (bits, _) = fadd(Format::F64, RoundingMode::Rne, a.to_bits(), b.to_bits());
        prop_assert_eq!(bits, (a + b).to_bits());
    }

    #[test]
    fn f64_mul_matches_host(a in finite_f64(), b in finite_f64()) {
        let (bits, _) = fmadd(FpOp::Mul, Format::F64, RoundingMode::Rne, a.to_bits(), b.to_bits(), 0)
            .unwrap();
        prop_assert_eq!(bits, (a * b).to_bits());
    }

    #[test]
    fn f64_fused_multiply_add_matches_host(a in finite_f64(), b in finite_f64(), c in finite_f64()) {
        let expected = a.mul_add(b, c);
        prop_assume!(!expected.is_nan());
        let (bits, _) = fmadd(FpOp::MAdd, Format::F64, RoundingMode::Rne, a.to_bits(), b.to_bits(), c.to_bits())
            .unwrap();
        prop_assert_eq!(bits, expected.to_bits());
    }

    #[test]
    fn f32_fused_multiply_add_matches_host(a in finite_f32(), b in finite_f32(), c in finite_f32()) {
        let expected = a.mul_add(b, c);
        prop_assume!(!expected.is_nan());
        let (bits, _) = fmadd(
            FpOp::MAdd,
            Format::F32,
            RoundingMode::Rne,
            u64::from(a.to_bits()),
            u64::from(b.to_bits()),
            u64::from(c.to_bits()),
        )
        .unwrap();
        prop_assert_eq!(bits, u64::from(expected.to_bits()));
    }

    #[test]
    fn directed_modes_bracket_the_exact_sum(a in finite_f32(), b in finite_f32()) {
        // An exact zero takes its sign from the rounding mode.
        prop_assume!(a != -b);
        let (rne, nx) = add32(RoundingMode::Rne, a, b);
        let (down, _) = add32(RoundingMode::Rdn, a, b);
        let (up, _) = add32(RoundingMode::Rup, a, b);
        let (rtz, _) = add32(RoundingMode::Rtz, a, b);
        let (rmm, _) = add32(RoundingMode::Rmm, a, b);

        if nx.contains(FpFlags::NX) {
            let negative = down & 0x8000_0000 != 0;
            if negative {
                prop_assert_eq!(down, up + 1);
                prop_assert_eq!(rtz, up);
            } else {
                prop_assert_eq!(up, down + 1);
                prop_assert_eq!(rtz, down);
            }
            prop_assert!(rne == down || rne == up);
            prop_assert!(rmm == down || rmm == up);
        } else {
            for r in [down, up, rtz, rmm] {
                prop_assert_eq!(r, rne);
            }
        }
    }

    #[test]
    fn flags_are_mode_independent_except_overflow_and_tininess(a in finite_f32(), b in finite_f32()) {
        prop_assume!(a != -b);
        let (_, rne) = add32(RoundingMode::Rne, a, b);
        for rm in RoundingMode::ALL {
            let (_, f) = add32(rm, a, b);
            prop_assert_eq!(f.contains(FpFlags::NX), rne.contains(FpFlags::NX));
            prop_assert!(!f.contains(FpFlags::NV));
        }
    }
}

#[test]
fn tiny_product_underflows() {
    let tiny = 0x0010_0000_0000_0000; // 2^-1022
    let (bits, flags) = fmadd(FpOp::Mul, Format::F64, RoundingMode::Rne, tiny, tiny, 0).unwrap();
    assert_eq!(bits, 0);
    assert_eq!(flags.bits(), 0b00011);

    let (bits, _) = fmadd(FpOp::Mul, Format::F64, RoundingMode::Rup, tiny, tiny, 0).unwrap();
    assert_eq!(bits, 1);
}

#[test]
fn tininess_is_detected_after_rounding() {
    // (1 - 2^-23) * 2^-126 * (1 + 2^-23) = 2^-126 * (1 - 2^-46), just below the
    // smallest normal.
    let a = 0x3F7F_FFFE;
    let b = 0x0080_0001;

    // Rounds up to 2^-126 with an unbounded exponent: not tiny, so no UF.
    let (bits, flags) = fmadd(FpOp::Mul, Format::F32, RoundingMode::Rne, a, b, 0).unwrap();
    assert_eq!(bits, 0x0080_0000);
    assert_eq!(flags, FpFlags::NX);

    // Truncation stays below 2^-126: tiny and inexact.
    let (bits, flags) = fmadd(FpOp::Mul, Format::F32, RoundingMode::Rtz, a, b, 0).unwrap();
    assert_eq!(bits, 0x007F_FFFF);
    assert_eq!(flags, FpFlags::UF | FpFlags::NX);
}

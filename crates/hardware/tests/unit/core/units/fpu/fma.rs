use pretty_assertions::assert_eq;
use rstest::rstest;
use rvvfu_core::common::LaneMask;
use rvvfu_core::core::pipeline::signals::{FpControl, FpOp};
use rvvfu_core::core::units::fpu::fma::fmadd;
use rvvfu_core::core::units::fpu::{FmaRequest, FpFlags, Format, RoundingMode};

use crate::common::harness::{fp, FpContext};

const TWO: u64 = 0x4000_0000;
const THREE: u64 = 0x4040_0000;
const ONE: u64 = 0x3F80_0000;

fn f32_lane(op: FpOp, rm: RoundingMode, a: u64, b: u64, c: u64) -> (u64, FpFlags) {
    fmadd(op, Format::F32, rm, a, b, c).unwrap()
}

#[test]
fn mul_only_ignores_the_addend() {
    let mut ctx = FpContext::default();
    let ctrl = FpControl::new(FpOp::Mul, Format::F64, RoundingMode::Rne);
    let (result, flags) = ctx.fma(FmaRequest::new(
        ctrl,
        fp(Format::F64, [2.0f64.to_bits()]),
        fp(Format::F64, [3.0f64.to_bits()]),
        fp(Format::F64, [1.0f64.to_bits()]),
    ));
    assert_eq!(f64::from_bits(result.as_u64()), 6.0);
    assert_eq!(flags.bits(), 0);
}

#[test]
fn zero_times_infinity_is_invalid_in_every_lane() {
    let mut ctx = FpContext::default();
    let ctrl = FpControl::new(FpOp::MAdd, Format::F32, RoundingMode::Rne);
    let (result, flags) = ctx.fma(FmaRequest::new(
        ctrl,
        fp(Format::F32, [0, 0x8000_0000]),
        fp(Format::F32, [0x7F80_0000, 0xFF80_0000]),
        fp(Format::F32, [ONE, 0x7FC0_0000]),
    ));
    assert_eq!(result.as_u64(), 0x7FC0_0000_7FC0_0000);
    assert_eq!(flags.lane(0), FpFlags::NV);
    assert_eq!(flags.lane(1), FpFlags::NV, "raised even with a quiet NaN addend");
}

#[test]
fn tiny_squared_underflows_to_zero() {
    let mut ctx = FpContext::default();
    let ctrl = FpControl::new(FpOp::Mul, Format::F64, RoundingMode::Rne);
    let tiny = fp(Format::F64, [0x0010_0000_0000_0000]);
    let (result, flags) = ctx.fma(FmaRequest::new(ctrl, tiny, tiny, tiny));
    assert_eq!(result.as_u64(), 0);
    assert_eq!(flags.bits(), 0b00011);
}

#[rstest]
#[case(FpOp::MAdd, 0x40E0_0000)] // 7
#[case(FpOp::MSub, 0x40A0_0000)] // 5
#[case(FpOp::NMSub, 0xC0A0_0000)] // -5
#[case(FpOp::NMAdd, 0xC0E0_0000)] // -7
#[case(FpOp::Mul, 0x40C0_0000)] // 6
fn sign_conventions(#[case] op: FpOp, #[case] expected: u64) {
    assert_eq!(f32_lane(op, RoundingMode::Rne, TWO, THREE, ONE), (expected, FpFlags::NONE));
}

#[test]
fn product_is_not_rounded_before_the_add() {
    // (1 + 2^-22)^2 - 1 = 2^-21 + 2^-44 is exact in F32; rounding the product
    // first would lose the 2^-44 term.
    let a = 0x3F80_0002;
    let (bits, flags) = f32_lane(FpOp::MSub, RoundingMode::Rne, a, a, ONE);
    assert_eq!(bits, 0x3500_0001);
    assert_eq!(flags, FpFlags::NONE);
}

#[test]
fn negative_zero_product_keeps_its_sign() {
    assert_eq!(f32_lane(FpOp::Mul, RoundingMode::Rne, 0xBF80_0000, 0, 0), (0x8000_0000, FpFlags::NONE));
}

#[rstest]
#[case(RoundingMode::Rne, 0x0000_0000)]
#[case(RoundingMode::Rdn, 0x8000_0000)]
fn zero_product_plus_opposite_zero(#[case] rm: RoundingMode, #[case] expected: u64) {
    assert_eq!(f32_lane(FpOp::MAdd, rm, 0, ONE, 0x8000_0000).0, expected);
}

#[test]
fn infinite_product_against_opposite_infinity_is_invalid() {
    let inf = 0x7F80_0000;
    assert_eq!(f32_lane(FpOp::MSub, RoundingMode::Rne, inf, ONE, inf), (0x7FC0_0000, FpFlags::NV));
    assert_eq!(f32_lane(FpOp::MAdd, RoundingMode::Rne, inf, ONE, inf), (inf, FpFlags::NONE));
    assert_eq!(f32_lane(FpOp::MAdd, RoundingMode::Rne, ONE, ONE, inf), (inf, FpFlags::NONE));
}

#[test]
fn signaling_addend_raises_invalid() {
    assert_eq!(
        f32_lane(FpOp::MAdd, RoundingMode::Rne, ONE, ONE, 0x7F80_0001),
        (0x7FC0_0000, FpFlags::NV)
    );
    // Mul never reads the addend.
    assert_eq!(f32_lane(FpOp::Mul, RoundingMode::Rne, ONE, ONE, 0x7F80_0001), (ONE, FpFlags::NONE));
}

#[test]
fn f16_lanes_and_mask() {
    let mut ctx = FpContext::default();
    let ctrl = FpControl::new(FpOp::MAdd, Format::F16, RoundingMode::Rne);
    let two = fp(Format::F16, [0x4000; 4]);
    let (result, _) = ctx.fma(FmaRequest::new(ctrl, two, two, two).with_mask(LaneMask::new(0b0101)));
    // 2*2+2 = 6 (0x4600) in lanes 0 and 2, zero elsewhere
    assert_eq!(result.as_u64(), 0x0000_4600_0000_4600);
}

#[test]
fn adder_opcodes_are_not_fma_opcodes() {
    assert_eq!(fmadd(FpOp::Add, Format::F32, RoundingMode::Rne, ONE, ONE, ONE), None);
}

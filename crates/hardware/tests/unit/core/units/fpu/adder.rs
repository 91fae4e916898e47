use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rstest::rstest;
use rvvfu_core::common::LaneMask;
use rvvfu_core::core::pipeline::signals::{FpControl, FpOp};
use rvvfu_core::core::units::fpu::{AdderRequest, FpFlags, Format, RoundingMode};

use crate::common::harness::{fp, FpContext};

fn ctrl(op: FpOp, format: Format, rm: RoundingMode) -> FpControl {
    FpControl::new(op, format, rm)
}

/// Runs a one-lane adder operation in lane 0 and returns its bits and flags.
fn lane0(op: FpOp, format: Format, rm: RoundingMode, a: u64, b: u64) -> (u64, FpFlags) {
    let mut ctx = FpContext::default();
    let (result, flags) = ctx.add(AdderRequest::new(ctrl(op, format, rm), fp(format, [a]), fp(format, [b])));
    (result.lane(format.view(), 0), flags.lane(0))
}

#[test]
fn f16_signaling_nan_raises_invalid() {
    let (bits, flags) = lane0(FpOp::Add, Format::F16, RoundingMode::Rne, 0x7D00, 0x3C00);
    assert_eq!(bits, 0x7E00);
    assert_eq!(flags.bits() & 0x10, 0x10);
}

#[test]
fn f16_max_keeps_operand_order() {
    let mut ctx = FpContext::default();
    let req = AdderRequest::new(
        ctrl(FpOp::Max, Format::F16, RoundingMode::Rne),
        0x4000_4000_u64.into(),
        0x3C00_3C00_u64.into(),
    );
    let (result, flags) = ctx.add(req);
    assert_eq!(result.as_u64(), 0x4000_4000);
    assert_eq!(flags.bits(), 0);
}

#[test]
fn finite_plus_infinity_is_infinity() {
    let (bits, flags) = lane0(FpOp::Add, Format::F32, RoundingMode::Rne, 0x3F80_0000, 0x7F80_0000);
    assert_eq!(bits, 0x7F80_0000);
    assert!(flags.is_empty());
}

#[test]
fn infinity_minus_infinity_is_invalid() {
    let inf = f64::INFINITY.to_bits();
    let (bits, flags) = lane0(FpOp::Sub, Format::F64, RoundingMode::Rne, inf, inf);
    assert_eq!(bits, 0x7FF8_0000_0000_0000);
    assert_eq!(flags, FpFlags::NV);
}

#[rstest]
#[case(RoundingMode::Rne, 0x3C00)]
#[case(RoundingMode::Rtz, 0x3C00)]
#[case(RoundingMode::Rdn, 0x3C00)]
#[case(RoundingMode::Rup, 0x3C01)]
#[case(RoundingMode::Rmm, 0x3C01)]
fn f16_halfway_case(#[case] rm: RoundingMode, #[case] expected: u64) {
    // 1 + 2^-11 lies exactly between 1.0 and its successor.
    let (bits, flags) = lane0(FpOp::Add, Format::F16, rm, 0x3C00, 0x1000);
    assert_eq!(bits, expected);
    assert_eq!(flags, FpFlags::NX);
}

#[rstest]
#[case(RoundingMode::Rne, 0x7C00)]
#[case(RoundingMode::Rtz, 0x7BFF)]
#[case(RoundingMode::Rdn, 0x7BFF)]
#[case(RoundingMode::Rup, 0x7C00)]
fn f16_overflow_depends_on_mode(#[case] rm: RoundingMode, #[case] expected: u64) {
    let (bits, flags) = lane0(FpOp::Add, Format::F16, rm, 0x7BFF, 0x7BFF);
    assert_eq!(bits, expected);
    assert_eq!(flags.bits(), 0b00101);
}

#[test]
fn exact_subnormal_result_raises_nothing() {
    let (bits, flags) = lane0(FpOp::Sub, Format::F16, RoundingMode::Rne, 0x0400, 0x0001);
    assert_eq!(bits, 0x03FF);
    assert!(flags.is_empty());
}

#[rstest]
#[case(RoundingMode::Rne, 0x0000)]
#[case(RoundingMode::Rup, 0x0000)]
#[case(RoundingMode::Rdn, 0x8000)]
fn exact_cancellation_sign(#[case] rm: RoundingMode, #[case] expected: u64) {
    let (bits, _) = lane0(FpOp::Sub, Format::F16, rm, 0x4500, 0x4500);
    assert_eq!(bits, expected);
}

#[test]
fn flags_are_packed_per_lane() {
    let mut ctx = FpContext::default();
    // lane 0: exact, lane 1: sNaN, lane 2: inexact, lane 3: overflow
    let a = fp(Format::F16, [0x3C00, 0x7D00, 0x3C00, 0x7BFF]);
    let b = fp(Format::F16, [0x3C00, 0x3C00, 0x1000, 0x7BFF]);
    let (_, flags) = ctx.add(AdderRequest::new(ctrl(FpOp::Add, Format::F16, RoundingMode::Rne), a, b));
    assert_eq!(flags.lane(0), FpFlags::NONE);
    assert_eq!(flags.lane(1), FpFlags::NV);
    assert_eq!(flags.lane(2), FpFlags::NX);
    assert_eq!(flags.lane(3), FpFlags::OF | FpFlags::NX);
    assert_eq!(flags.bits(), (0b00101 << 15) | (0b00001 << 10) | (0b10000 << 5));
    assert_eq!(flags.accrued(), FpFlags::NV | FpFlags::OF | FpFlags::NX);
}

#[test]
fn masked_lanes_keep_previous_contents() {
    let mut ctx = FpContext::default();
    let c = ctrl(FpOp::Add, Format::F32, RoundingMode::Rne);
    let one = fp(Format::F32, [0x3F80_0000, 0x3F80_0000]);
    let (first, _) = ctx.add(AdderRequest::new(c, one, one));
    assert_eq!(first.as_u64(), 0x4000_0000_4000_0000);

    // Lane 1 disabled; its sNaN input must neither land nor flag.
    let a = fp(Format::F32, [0x4040_0000, 0x7F80_0001]);
    let (second, flags) = ctx.add(AdderRequest::new(c, a, one).with_mask(LaneMask::new(0b01)));
    assert_eq!(second.as_u64(), 0x4000_0000_4080_0000);
    assert_eq!(flags.bits(), 0);
}

proptest! {
    #[test]
    fn sub_is_add_of_negated_operand(a in any::<u64>(), b in any::<u64>(), rm_bits in 0u8..5) {
        let rm = RoundingMode::from_bits(rm_bits).unwrap();
        for format in [Format::F16, Format::F32, Format::F64] {
            let mut ctx = FpContext::default();
            let neg_b = b ^ fp(format, vec![format.sign_mask(); format.lanes()]).as_u64();
            let sub = ctx.add(AdderRequest::new(ctrl(FpOp::Sub, format, rm), a.into(), b.into()));
            let add = ctx.add(AdderRequest::new(ctrl(FpOp::Add, format, rm), a.into(), neg_b.into()));
            prop_assert_eq!(sub.0, add.0);
            prop_assert_eq!(sub.1, add.1);
        }
    }
}

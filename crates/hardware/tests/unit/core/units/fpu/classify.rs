use rstest::rstest;
use rvvfu_core::core::pipeline::signals::{FpControl, FpOp};
use rvvfu_core::core::units::fpu::classify::{fclass, FpClass};
use rvvfu_core::core::units::fpu::{AdderRequest, Format, RoundingMode};
use rvvfu_core::common::FpVector;

use crate::common::harness::{fp, FpContext};

#[rstest]
#[case(0xFFF0_0000_0000_0000, 0)]
#[case(0xBFF0_0000_0000_0000, 1)]
#[case(0x800F_FFFF_FFFF_FFFF, 2)]
#[case(0x8000_0000_0000_0000, 3)]
#[case(0x0000_0000_0000_0000, 4)]
#[case(0x0000_0000_0000_0001, 5)]
#[case(0x3FF0_0000_0000_0000, 6)]
#[case(0x7FF0_0000_0000_0000, 7)]
#[case(0x7FF0_0000_0000_0001, 8)]
#[case(0x7FF8_0000_0000_0000, 9)]
#[case(0xFFF8_0000_0000_0001, 9)]
fn f64_classes(#[case] bits: u64, #[case] class_bit: u32) {
    let mut ctx = FpContext::default();
    let req = AdderRequest::new(
        FpControl::new(FpOp::Classify, Format::F64, RoundingMode::Rne),
        bits.into(),
        FpVector::ZERO,
    );
    let (result, flags) = ctx.add(req);
    assert_eq!(result.as_u64(), 1 << class_bit);
    assert_eq!(flags.bits(), 0, "classify never raises flags");
}

#[test]
fn f16_lanes_classify_independently() {
    let mut ctx = FpContext::default();
    let a = fp(Format::F16, [0x7C00, 0x7D00, 0x8001, 0x3C00]);
    let req = AdderRequest::new(
        FpControl::new(FpOp::Classify, Format::F16, RoundingMode::Rne),
        a,
        FpVector::ZERO,
    );
    let (result, _) = ctx.add(req);
    let view = Format::F16.view();
    assert_eq!(result.lane(view, 0), 1 << 7);
    assert_eq!(result.lane(view, 1), 1 << 8);
    assert_eq!(result.lane(view, 2), 1 << 2);
    assert_eq!(result.lane(view, 3), 1 << 6);
}

#[test]
fn class_masks_are_one_hot() {
    assert_eq!(FpClass::of(Format::F32, 0x7FC0_0000), FpClass::QuietNan);
    assert_eq!(fclass(Format::F32, 0xFF80_0000), FpClass::NegInfinity.mask());
    assert_eq!(fclass(Format::F32, 0x0000_0001).count_ones(), 1);
}

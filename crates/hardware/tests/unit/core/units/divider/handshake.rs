use pretty_assertions::assert_eq;
use rstest::rstest;
use rvvfu_core::common::UnitError;
use rvvfu_core::config::Config;
use rvvfu_core::core::units::divider::{divide, DivPorts, DivRequest, DivState, ElementWidth};

use crate::common::harness::{div, DivContext};

fn request(w: ElementWidth, a: u64, b: u64) -> DivRequest {
    DivRequest::new(w, false, div(w, vec![a; w.lanes()]), div(w, vec![b; w.lanes()]))
}

#[rstest]
#[case(ElementWidth::E8, 6)]
#[case(ElementWidth::E16, 10)]
#[case(ElementWidth::E32, 18)]
#[case(ElementWidth::E64, 34)]
fn busy_time_grows_with_width(#[case] w: ElementWidth, #[case] cycles: u32) {
    let mut ctx = DivContext::default();
    let (result, busy) = ctx.run(request(w, 100, 7));
    assert_eq!(busy, cycles);
    assert_eq!(result.quotient.lane(w.view(), 0), 14);
}

#[rstest]
#[case(1, 0, 8)]
#[case(4, 0, 2)]
#[case(8, 3, 4)]
fn timing_follows_configuration(#[case] bits_per_cycle: u32, #[case] overhead: u32, #[case] cycles: u32) {
    let json = format!(r#"{{ "divider": {{ "bits_per_cycle": {bits_per_cycle}, "overhead_cycles": {overhead} }} }}"#);
    let mut ctx = DivContext::new(&Config::from_json(&json).unwrap());
    let w = ElementWidth::E8;
    let req = request(w, 0xFE, 0x03);
    let (result, busy) = ctx.run(req);
    assert_eq!(busy, cycles);
    assert_eq!(result, divide(&req));
}

#[test]
fn ready_and_valid_follow_the_state() {
    let mut ctx = DivContext::default();
    assert!(ctx.unit.in_ready());
    assert!(!ctx.unit.out_valid());

    ctx.unit.submit(request(ElementWidth::E8, 9, 3)).unwrap();
    assert!(matches!(ctx.unit.state(), DivState::Busy { elapsed: 0, total: 6 }));
    assert!(!ctx.unit.in_ready());
    assert_eq!(ctx.unit.submit(request(ElementWidth::E8, 1, 1)), Err(UnitError::DividerBusy));

    let _ = ctx.wait_valid();
    assert!(ctx.unit.out_valid());
    assert!(ctx.unit.result().is_some());
}

#[test]
fn result_is_held_until_out_ready() {
    let mut ctx = DivContext::default();
    ctx.unit.submit(request(ElementWidth::E16, 50, 5)).unwrap();
    let _ = ctx.wait_valid();
    for _ in 0..10 {
        let out = ctx.unit.tick(&DivPorts::idle());
        assert_eq!(out.delivered, None);
        assert!(ctx.unit.out_valid());
    }
    let out = ctx.unit.tick(&DivPorts::idle().ready());
    assert_eq!(out.delivered.map(|r| r.quotient.lane(ElementWidth::E16.view(), 0)), Some(10));
    assert!(ctx.unit.in_ready());
    assert_eq!(ctx.unit.result(), None);
}

#[test]
fn request_is_ignored_while_holding_a_result() {
    let mut ctx = DivContext::default();
    ctx.unit.submit(request(ElementWidth::E8, 9, 3)).unwrap();
    let _ = ctx.wait_valid();
    let out = ctx.unit.tick(&DivPorts::request(request(ElementWidth::E8, 8, 2)));
    assert!(!out.accepted);
    assert!(ctx.unit.out_valid());
}

#[test]
fn take_and_accept_on_the_same_tick() {
    let mut ctx = DivContext::default();
    let w = ElementWidth::E8;
    ctx.unit.submit(request(w, 9, 3)).unwrap();
    let _ = ctx.wait_valid();

    let out = ctx.unit.tick(&DivPorts::request(request(w, 8, 2)).ready());
    assert!(out.accepted);
    assert_eq!(out.delivered.map(|r| r.quotient.lane(w.view(), 0)), Some(3));
    assert!(!ctx.unit.in_ready());

    assert_eq!(ctx.wait_valid(), 6);
    let out = ctx.unit.tick(&DivPorts::idle().ready());
    assert_eq!(out.delivered.map(|r| r.quotient.lane(w.view(), 0)), Some(4));
}

#[test]
fn flush_mid_busy_returns_to_idle_in_one_tick() {
    let mut ctx = DivContext::default();
    let w = ElementWidth::E64;
    ctx.unit.submit(request(w, 1000, 10)).unwrap();
    for _ in 0..5 {
        let _ = ctx.unit.tick(&DivPorts::idle());
    }

    // A request presented with the flush is dropped.
    let out = ctx.unit.tick(&DivPorts::request(request(w, 7, 7)).flushing());
    assert!(!out.accepted);
    assert_eq!(out.delivered, None);
    assert!(ctx.unit.in_ready());
    assert_eq!(ctx.unit.state(), DivState::Idle);

    let next = request(ElementWidth::E32, 81, 9);
    let (result, busy) = ctx.run(next);
    assert_eq!(busy, 18);
    assert_eq!(result, divide(&next), "nothing leaks from the flushed operation");
}

#[test]
fn flush_discards_a_held_result() {
    let mut ctx = DivContext::default();
    ctx.unit.submit(request(ElementWidth::E8, 9, 3)).unwrap();
    let _ = ctx.wait_valid();
    let out = ctx.unit.tick(&DivPorts::idle().ready().flushing());
    assert_eq!(out.delivered, None, "flush wins over out_ready");
    assert!(!ctx.unit.out_valid());
    assert_eq!(ctx.unit.result(), None);
}

#[test]
fn cycle_counter_advances_every_tick() {
    let mut ctx = DivContext::default();
    for _ in 0..3 {
        let _ = ctx.unit.tick(&DivPorts::idle());
    }
    assert_eq!(ctx.unit.cycle(), 3);
}

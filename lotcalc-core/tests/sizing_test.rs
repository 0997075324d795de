//! Worked sizing scenarios across instrument types.

use lotcalc_core::domain::{Commission, Instrument, RiskMode, Side, StopUnit};
use lotcalc_core::sizing::{
    calculate_position_size, calculate_position_size_with, PositionSizeInput, SizingError,
    SizingPolicy,
};

fn eurusd() -> Instrument {
    Instrument::new(5, 0.00001, 1.0, 0.00001, 100_000.0, 0.01)
}

fn base_input() -> PositionSizeInput {
    PositionSizeInput {
        instrument: eurusd(),
        price: 1.1,
        balance: 10_000.0,
        risk: RiskMode::Percentage(1.0),
        sl_unit: StopUnit::Pips,
        sl_value: 20.0,
        commission: Commission::none(),
        rr_ratio: 2.0,
        min_net: 20.0,
        side: Side::Buy,
    }
}

#[test]
fn eurusd_one_percent_exits_loop_immediately() {
    let res = calculate_position_size(&base_input()).unwrap();

    assert_eq!(res.breakdown.risk_amount, 100.0);
    assert_eq!(res.breakdown.required_profit, 200.0);
    assert_eq!(res.breakdown.iterations, 0);
    assert_eq!(res.lot_size, 0.5);
    assert_eq!(res.net_profit, 200.0);
    assert_eq!(res.sl_price, 1.098);
    assert_eq!(res.tp_price, 1.104);
}

#[test]
fn fixed_amount_ignores_balance() {
    let mut inp = base_input();
    inp.risk = RiskMode::FixedAmount(100.0);
    inp.balance = 0.0;
    let res = calculate_position_size(&inp).unwrap();
    assert_eq!(res.lot_size, 0.5);
}

#[test]
fn whole_lot_step_rounds_up() {
    // default volume step of 1 lot: 0.5 raw lots becomes 1 lot
    let mut inp = base_input();
    inp.instrument.volume_step = 1.0;
    let res = calculate_position_size(&inp).unwrap();

    assert_eq!(res.lot_size, 1.0);
    assert_eq!(res.breakdown.lot_precision, 0);
    // realized risk exceeds the budget after rounding up
    assert_eq!(res.net_risk, 200.0);
    assert_eq!(res.net_profit, 400.0);
}

#[test]
fn jpy_pair_in_points() {
    // USDJPY, 3 digits: pip = 0.01, point = 0.001
    let inp = PositionSizeInput {
        instrument: Instrument::new(3, 0.001, 0.67, 0.001, 100_000.0, 0.01),
        price: 150.0,
        balance: 20_000.0,
        risk: RiskMode::Percentage(0.5),
        sl_unit: StopUnit::Points,
        sl_value: 300.0,
        commission: Commission::none(),
        rr_ratio: 2.0,
        min_net: 20.0,
        side: Side::Sell,
    };
    let res = calculate_position_size(&inp).unwrap();

    // 300 points = 30 pips; pip value 6.7; 100 / 201 = 0.4975 -> 0.50
    assert!((res.breakdown.sl_pips - 30.0).abs() < 1e-9);
    assert_eq!(res.lot_size, 0.5);
    assert_eq!(res.sl_price, 150.3);
    assert!(res.tp_price < 150.0);
    assert_eq!(res.stop_loss, 300.0);
    // 60 pips * 6.7 * 0.5 = 201 >= 200 -> no widening, 600 points
    assert_eq!(res.breakdown.iterations, 0);
    assert_eq!(res.take_profit, 600.0);
    assert_eq!(res.tp_price, 149.4);
}

#[test]
fn legacy_commission_sentinel_is_free() {
    let mut legacy = base_input();
    legacy.commission = Commission::from_legacy(7.0);
    let mut zero = base_input();
    zero.commission = Commission::per_lot(0.0);

    let a = calculate_position_size(&legacy).unwrap();
    let b = calculate_position_size(&zero).unwrap();
    assert_eq!(a.lot_size, b.lot_size);
    assert_eq!(a.commission_total, 0.0);
    assert_eq!(a.net_profit, b.net_profit);
}

#[test]
fn literal_seven_is_charged() {
    let mut inp = base_input();
    inp.commission = Commission::per_lot(7.0);
    let res = calculate_position_size(&inp).unwrap();

    // 100 / (200 + 7) = 0.483 -> 0.49
    assert_eq!(res.lot_size, 0.49);
    assert_eq!(res.commission_total, 3.43);
    assert!(res.net_profit >= 200.0);
}

#[test]
fn non_positive_risk_reports_amount() {
    let mut inp = base_input();
    inp.risk = RiskMode::FixedAmount(-50.0);
    let err = calculate_position_size(&inp).unwrap_err();
    assert_eq!(err, SizingError::NonPositiveRisk(-50.0));
    assert_eq!(err.to_string(), "risk amount must be positive, got -50");
}

#[test]
fn coarser_step_policy_overshoots_more() {
    let mut inp = base_input();
    inp.commission = Commission::per_lot(5.0);

    let fine = calculate_position_size(&inp).unwrap();
    let coarse =
        calculate_position_size_with(&inp, &SizingPolicy { tp_step_pips: 5.0, max_iterations: 100 })
            .unwrap();

    assert_eq!(fine.lot_size, coarse.lot_size);
    assert!(coarse.breakdown.tp_pips >= fine.breakdown.tp_pips);
    assert_eq!(coarse.breakdown.tp_pips, 45.0);
}

#[test]
fn result_serializes_to_json() {
    let res = calculate_position_size(&base_input()).unwrap();
    let json = serde_json::to_value(&res).unwrap();
    assert_eq!(json["lot_size"], 0.5);
    assert_eq!(json["distance_unit"], "pips");
    assert_eq!(json["breakdown"]["iterations"], 0);
}

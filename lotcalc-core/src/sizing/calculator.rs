//! Position size calculator.

use tracing::debug;

use super::{PositionSizeInput, PositionSizeResult, SizingBreakdown, SizingError, SizingPolicy};
use crate::domain::{round_to, Leg, StopUnit};

/// Absolute slack when comparing net reward against the required profit.
///
/// A reward equal to the requirement in exact arithmetic can land a few ulps
/// short in f64; it still counts as reached.
const PROFIT_EPSILON: f64 = 1e-9;

/// Size a trade with the default [`SizingPolicy`].
pub fn calculate_position_size(input: &PositionSizeInput) -> Result<PositionSizeResult, SizingError> {
    calculate_position_size_with(input, &SizingPolicy::default())
}

/// Size a trade.
///
/// # Formula
/// ```text
/// pip_size        = 10^-(digits - 1)
/// pip_value       = tick_value * pip_size / tick_size
/// lot             = ceil_to_step(risk_amount / (sl_pips * pip_value + commission))
/// tp_pips         = sl_pips * rr_ratio, widened by tp_step_pips until
/// net_reward      = tp_pips * pip_value * lot - lot * commission
///                   >= max(risk_amount * rr_ratio, min_net)
/// ```
///
/// Because the lot is rounded up, the loss at the stop may exceed
/// `risk_amount` by up to one volume step's worth.
pub fn calculate_position_size_with(
    input: &PositionSizeInput,
    policy: &SizingPolicy,
) -> Result<PositionSizeResult, SizingError> {
    policy.validate()?;
    input.validate()?;

    let inst = &input.instrument;
    let pip_size = positive_finite("pip_size", inst.pip_size())?;
    let pip_value = positive_finite("pip_value", inst.pip_value())?;
    let sl_pips = positive_finite("sl_pips", input.sl_pips())?;
    let commission = input.commission.per_lot_amount();

    let risk_amount = input.risk.risk_amount(input.balance);
    if risk_amount <= 0.0 {
        return Err(SizingError::NonPositiveRisk(risk_amount));
    }

    let lot_raw = positive_finite("lot_raw", risk_amount / (sl_pips * pip_value + commission))?;
    let lot = positive_finite("lot", inst.quantize_lot_up(lot_raw))?;
    let commission_total = lot * commission;

    debug!(pip_size, pip_value, sl_pips, risk_amount, lot_raw, lot, "sized lot");

    let required_profit = (risk_amount * input.rr_ratio).max(input.min_net);
    let net_reward_at = |tp_pips: f64| tp_pips * pip_value * lot - commission_total;

    let mut tp_pips = sl_pips * input.rr_ratio;
    let mut net_reward = net_reward_at(tp_pips);
    let mut iterations = 0u32;
    while net_reward < required_profit - PROFIT_EPSILON {
        if iterations >= policy.max_iterations {
            return Err(SizingError::ConvergenceExceeded {
                iterations,
                net_reward,
                required_profit,
            });
        }
        tp_pips += policy.tp_step_pips;
        net_reward = net_reward_at(tp_pips);
        iterations += 1;
    }

    debug!(tp_pips, net_reward, required_profit, iterations, "take profit converged");

    let sl_price = positive_finite(
        "sl_price",
        inst.round_price(inst.price_offset(input.price, sl_pips, input.side, Leg::Stop)),
    )?;
    let tp_price = positive_finite(
        "tp_price",
        inst.round_price(inst.price_offset(input.price, tp_pips, input.side, Leg::Target)),
    )?;

    let take_profit = match input.sl_unit {
        StopUnit::Pips => tp_pips,
        StopUnit::Points => inst.pips_to_points(tp_pips),
    };

    Ok(PositionSizeResult {
        lot_size: inst.round_lot(lot),
        commission_total: round_to(commission_total, 2),
        net_risk: round_to(sl_pips * pip_value * lot + commission_total, 2),
        stop_loss: input.sl_value,
        take_profit: round_to(take_profit, 1),
        distance_unit: input.sl_unit,
        tp_price,
        sl_price,
        net_profit: round_to(net_reward, 2),
        breakdown: SizingBreakdown {
            pip_size,
            pip_value,
            sl_pips,
            tp_pips,
            risk_amount,
            required_profit,
            lot_raw,
            lot_precision: inst.lot_precision(),
            iterations,
        },
    })
}

/// Derived quantities must stay usable; degenerate instruments or stops
/// surface here instead of as NaN or negative prices in the result.
fn positive_finite(field: &'static str, value: f64) -> Result<f64, SizingError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(SizingError::InvalidInput {
            field,
            reason: format!("must be a positive finite number, got {value}"),
        })
    }
}

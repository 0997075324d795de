//! Sizing request.

use serde::{Deserialize, Serialize};

use super::SizingError;
use crate::domain::{Commission, Instrument, RiskMode, Side, StopUnit};

/// Everything needed to size one trade.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionSizeInput {
    pub instrument: Instrument,
    /// Current market price.
    pub price: f64,
    /// Account balance. Only read in percentage risk mode.
    pub balance: f64,
    pub risk: RiskMode,
    pub sl_unit: StopUnit,
    /// Stop distance in `sl_unit`.
    pub sl_value: f64,
    pub commission: Commission,
    /// Target reward:risk multiple used to seed the take profit.
    pub rr_ratio: f64,
    /// Floor on net profit after commission.
    pub min_net: f64,
    pub side: Side,
}

impl PositionSizeInput {
    /// Reject inputs that would divide by zero, take the log of a
    /// non-positive number, or otherwise yield a meaningless result.
    ///
    /// A zero risk budget passes here; it is reported as
    /// [`SizingError::NonPositiveRisk`] by the calculator.
    pub fn validate(&self) -> Result<(), SizingError> {
        self.instrument.validate()?;

        require(self.price.is_finite() && self.price > 0.0, "price", self.price, "must be positive")?;
        require(self.sl_value.is_finite() && self.sl_value > 0.0, "sl_value", self.sl_value, "must be positive")?;
        require(self.rr_ratio.is_finite() && self.rr_ratio > 0.0, "rr_ratio", self.rr_ratio, "must be positive")?;
        require(self.min_net.is_finite() && self.min_net >= 0.0, "min_net", self.min_net, "must not be negative")?;
        require(self.balance.is_finite() && self.balance >= 0.0, "balance", self.balance, "must not be negative")?;

        match self.risk {
            RiskMode::Percentage(pct) => {
                require(pct.is_finite() && (0.0..=100.0).contains(&pct), "risk_pct", pct, "must be within [0, 100]")?;
            }
            RiskMode::FixedAmount(amount) => {
                require(amount.is_finite(), "fixed_risk", amount, "must be finite")?;
            }
        }

        if let Some(commission) = self.commission.as_option() {
            require(
                commission.is_finite() && commission >= 0.0,
                "commission",
                commission,
                "must not be negative",
            )?;
        }

        Ok(())
    }

    /// Stop distance normalized to pips.
    pub fn sl_pips(&self) -> f64 {
        match self.sl_unit {
            StopUnit::Pips => self.sl_value,
            StopUnit::Points => self.instrument.points_to_pips(self.sl_value),
        }
    }
}

fn require(ok: bool, field: &'static str, value: f64, reason: &str) -> Result<(), SizingError> {
    if ok {
        Ok(())
    } else {
        Err(SizingError::InvalidInput { field, reason: format!("{reason}, got {value}") })
    }
}

//! Sizing output.

use serde::{Deserialize, Serialize};

use crate::domain::StopUnit;

/// Sized trade, rounded for display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PositionSizeResult {
    /// Lots, a multiple of the instrument volume step.
    pub lot_size: f64,
    /// `lot_size * commission`, 2 decimals.
    pub commission_total: f64,
    /// Loss at the stop including commission, 2 decimals.
    pub net_risk: f64,
    /// Stop distance exactly as supplied, in `distance_unit`.
    pub stop_loss: f64,
    /// Target distance in `distance_unit`, 1 decimal.
    pub take_profit: f64,
    pub distance_unit: StopUnit,
    pub tp_price: f64,
    pub sl_price: f64,
    /// Profit at the target after commission, 2 decimals.
    pub net_profit: f64,
    pub breakdown: SizingBreakdown,
}

/// Unrounded intermediate quantities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SizingBreakdown {
    pub pip_size: f64,
    pub pip_value: f64,
    pub sl_pips: f64,
    pub tp_pips: f64,
    pub risk_amount: f64,
    pub required_profit: f64,
    pub lot_raw: f64,
    pub lot_precision: i32,
    /// Half-pip widenings applied to the initial target.
    pub iterations: u32,
}

impl PositionSizeResult {
    /// `(label, value)` pairs in display order.
    ///
    /// Lot size keeps the volume-step precision and prices keep the quoted
    /// digits; money amounts use two decimals.
    pub fn labeled_fields(&self, digits: u32) -> Vec<(&'static str, String)> {
        let lot_decimals = self.breakdown.lot_precision.max(0) as usize;
        let price_decimals = digits as usize;
        vec![
            ("Lot Size", format!("{:.*}", lot_decimals, self.lot_size)),
            ("Commission", format!("{:.2}", self.commission_total)),
            ("Net Risk", format!("{:.2}", self.net_risk)),
            ("Stop Loss", format!("{}", self.stop_loss)),
            ("Take Profit", format!("{:.1}", self.take_profit)),
            ("Tp Price", format!("{:.*}", price_decimals, self.tp_price)),
            ("Sl Price", format!("{:.*}", price_decimals, self.sl_price)),
            ("Net Profit", format!("{:.2}", self.net_profit)),
        ]
    }
}

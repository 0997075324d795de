use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Slack allowed when snapping a quotient onto an integer grid.
///
/// `raw / volume_step` carries float noise; a quotient a hair above a grid
/// point must not cost a whole extra volume step.
pub const GRID_EPSILON: f64 = 1e-9;

/// Largest quoted precision accepted.
pub const MAX_DIGITS: u32 = 15;

/// Trade direction.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// +1 for buy, -1 for sell.
    pub fn sign(self) -> f64 {
        match self {
            Side::Buy => 1.0,
            Side::Sell => -1.0,
        }
    }
}

/// Which bracket leg a price offset is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Leg {
    /// Protective stop: below price for buys, above for sells.
    Stop,
    /// Profit target: above price for buys, below for sells.
    Target,
}

/// Quote metadata for a tradable symbol.
///
/// A pip is a one-unit move in the last-but-one quoted decimal, so a 5-digit
/// EURUSD quote has `pip_size = 0.0001` while its `point` is `0.00001`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instrument {
    /// Quoted decimal places.
    pub digits: u32,
    /// Smallest quoted price increment.
    pub point: f64,
    /// Money value of one `tick_size` move for one lot.
    pub tick_value: f64,
    pub tick_size: f64,
    /// Units per lot. Carried for reporting, never used in sizing.
    pub contract_size: f64,
    /// Lot quantization grid.
    pub volume_step: f64,
}

impl Instrument {
    pub fn new(
        digits: u32,
        point: f64,
        tick_value: f64,
        tick_size: f64,
        contract_size: f64,
        volume_step: f64,
    ) -> Self {
        Self { digits, point, tick_value, tick_size, contract_size, volume_step }
    }

    /// Check every field the derived quantities divide by or take logs of.
    pub fn validate(&self) -> Result<(), InstrumentError> {
        if !(1..=MAX_DIGITS).contains(&self.digits) {
            return Err(InstrumentError::InvalidDigits(self.digits));
        }
        let positive = [
            ("point", self.point),
            ("tick_value", self.tick_value),
            ("tick_size", self.tick_size),
            ("contract_size", self.contract_size),
            ("volume_step", self.volume_step),
        ];
        for (field, value) in positive {
            if !value.is_finite() || value <= 0.0 {
                return Err(InstrumentError::NonPositive { field, value });
            }
        }
        Ok(())
    }

    /// `10^-(digits - 1)`
    pub fn pip_size(&self) -> f64 {
        let exponent = i32::try_from(self.digits).map_or(i32::MIN, |d| 1 - d);
        10f64.powi(exponent)
    }

    /// Money value of a one-pip move for one lot.
    pub fn pip_value(&self) -> f64 {
        self.tick_value * self.pip_size() / self.tick_size
    }

    /// Convert a distance in points to pips.
    pub fn points_to_pips(&self, points: f64) -> f64 {
        points * self.point / self.pip_size()
    }

    /// Convert a distance in pips to points.
    pub fn pips_to_points(&self, pips: f64) -> f64 {
        pips * self.pip_size() / self.point
    }

    /// Decimal places implied by the volume step: `round(log10(1 / step))`.
    ///
    /// Negative for steps above one (a step of 10 gives -1).
    pub fn lot_precision(&self) -> i32 {
        (1.0 / self.volume_step).log10().round() as i32
    }

    /// Round a lot quantity to `lot_precision` decimals.
    pub fn round_lot(&self, lots: f64) -> f64 {
        round_to(lots, self.lot_precision())
    }

    /// Round a raw lot quantity up to the next multiple of `volume_step`,
    /// never below one step.
    pub fn quantize_lot_up(&self, raw: f64) -> f64 {
        let steps = (raw / self.volume_step - GRID_EPSILON).ceil().max(1.0);
        self.round_lot(steps * self.volume_step)
    }

    /// Round a price to the quoted number of digits.
    pub fn round_price(&self, price: f64) -> f64 {
        round_to(price, self.digits as i32)
    }

    /// Offset `price` by `pips` on the side of `leg` appropriate for `side`.
    pub fn price_offset(&self, price: f64, pips: f64, side: Side, leg: Leg) -> f64 {
        let direction = match leg {
            Leg::Target => side.sign(),
            Leg::Stop => -side.sign(),
        };
        price + direction * pips * self.pip_size()
    }
}

/// Round to `decimals` places, exact halves to even. Negative `decimals`
/// round to tens, hundreds and so on.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if decimals >= 0 {
        let factor = 10f64.powi(decimals);
        (value * factor).round_ties_even() / factor
    } else {
        let factor = 10f64.powi(-decimals);
        (value / factor).round_ties_even() * factor
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum InstrumentError {
    #[error("digits must be within 1..=15, got {0}")]
    InvalidDigits(u32),

    #[error("{field} must be a positive finite number, got {value}")]
    NonPositive { field: &'static str, value: f64 },
}

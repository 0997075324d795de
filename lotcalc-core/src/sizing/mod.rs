//! Position sizing: lot size, bracket prices and money amounts from a risk budget.
//!
//! The calculation is a single pass:
//! 1. Derive pip size/value from the instrument and normalize the stop to pips
//! 2. Size the position so a stop-out loses `risk_amount` (commission included)
//! 3. Snap the lot up onto the volume grid
//! 4. Widen the target in half-pip steps until the net reward clears
//!    `max(risk_amount * rr_ratio, min_net)`

pub mod calculator;
pub mod input;
pub mod result;

pub use calculator::{calculate_position_size, calculate_position_size_with};
pub use input::PositionSizeInput;
pub use result::{PositionSizeResult, SizingBreakdown};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::InstrumentError;

/// Default take-profit widening per convergence iteration, in pips.
pub const DEFAULT_TP_STEP_PIPS: f64 = 0.5;

/// Default cap on convergence iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 100_000;

/// Knobs for the take-profit convergence loop.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SizingPolicy {
    pub tp_step_pips: f64,
    pub max_iterations: u32,
}

impl Default for SizingPolicy {
    fn default() -> Self {
        Self {
            tp_step_pips: DEFAULT_TP_STEP_PIPS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SizingPolicy {
    pub fn validate(&self) -> Result<(), SizingError> {
        if !self.tp_step_pips.is_finite() || self.tp_step_pips <= 0.0 {
            return Err(SizingError::InvalidPolicy(format!(
                "tp_step_pips must be positive, got {}",
                self.tp_step_pips
            )));
        }
        if self.max_iterations == 0 {
            return Err(SizingError::InvalidPolicy("max_iterations must be at least 1".into()));
        }
        Ok(())
    }
}

/// Errors from position sizing.
#[derive(Debug, Error, PartialEq)]
pub enum SizingError {
    #[error("invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("risk amount must be positive, got {0}")]
    NonPositiveRisk(f64),

    #[error(
        "take profit did not reach required profit {required_profit:.2} within {iterations} steps (last net reward {net_reward:.2})"
    )]
    ConvergenceExceeded {
        iterations: u32,
        net_reward: f64,
        required_profit: f64,
    },

    #[error("invalid sizing policy: {0}")]
    InvalidPolicy(String),
}

impl From<InstrumentError> for SizingError {
    fn from(err: InstrumentError) -> Self {
        let field = match &err {
            InstrumentError::InvalidDigits(_) => "digits",
            InstrumentError::NonPositive { field, .. } => *field,
        };
        SizingError::InvalidInput { field, reason: err.to_string() }
    }
}

//! Domain types for lotcalc

pub mod instrument;
pub mod units;

pub use instrument::{round_to, Instrument, InstrumentError, Leg, Side, GRID_EPSILON, MAX_DIGITS};
pub use units::{Commission, RiskMode, StopUnit, LEGACY_NO_COMMISSION};

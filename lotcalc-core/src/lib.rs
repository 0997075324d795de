//! lotcalc core: position sizing and range highlighting.
//!
//! This crate contains:
//! - Domain types (instrument quote metadata, side, risk mode, stop unit, commission)
//! - The position-size calculator with its take-profit convergence loop
//! - A TOML defaults file for the optional parameters
//! - Top-percent highlighting of CSV range tables

pub mod config;
pub mod domain;
pub mod highlight;
pub mod sizing;

pub use config::{ConfigError, LotcalcConfig};
pub use highlight::{highlight_csv, HighlightError, HighlightReport, HighlightRule};
pub use sizing::{
    calculate_position_size, calculate_position_size_with, PositionSizeInput, PositionSizeResult,
    SizingError, SizingPolicy,
};

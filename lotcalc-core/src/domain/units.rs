//! Risk, stop-distance and commission parameters.

use serde::{Deserialize, Serialize};

/// Commission value that older tooling passed to mean "no commission".
pub const LEGACY_NO_COMMISSION: f64 = 7.0;

/// How the amount at risk is specified.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "mode", content = "value", rename_all = "snake_case")]
pub enum RiskMode {
    /// Percent of account balance, in `[0, 100]`.
    Percentage(f64),
    /// Absolute money amount in account currency.
    FixedAmount(f64),
}

impl RiskMode {
    /// Money at risk for the given balance.
    pub fn risk_amount(&self, balance: f64) -> f64 {
        match *self {
            RiskMode::Percentage(pct) => balance * pct / 100.0,
            RiskMode::FixedAmount(amount) => amount,
        }
    }
}

/// Unit a stop distance is quoted in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StopUnit {
    Pips,
    Points,
}

/// Per-lot round-trip commission. `None` means the account pays none.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(transparent)]
pub struct Commission(Option<f64>);

impl Commission {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn per_lot(amount: f64) -> Self {
        Self(Some(amount))
    }

    /// Interpret a raw value the way the legacy command line did: exactly
    /// `7` stands for "no commission".
    pub fn from_legacy(value: f64) -> Self {
        if value == LEGACY_NO_COMMISSION {
            tracing::warn!(
                value,
                "commission of 7 treated as no commission; pass a literal commission to charge it"
            );
            Self(None)
        } else {
            Self(Some(value))
        }
    }

    pub fn is_none(&self) -> bool {
        self.0.is_none()
    }

    /// Commission charged per lot, zero when absent.
    pub fn per_lot_amount(&self) -> f64 {
        self.0.unwrap_or(0.0)
    }

    pub fn as_option(&self) -> Option<f64> {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_risk_scales_balance() {
        assert_eq!(RiskMode::Percentage(1.0).risk_amount(10_000.0), 100.0);
        assert_eq!(RiskMode::Percentage(0.0).risk_amount(10_000.0), 0.0);
    }

    #[test]
    fn fixed_risk_ignores_balance() {
        assert_eq!(RiskMode::FixedAmount(250.0).risk_amount(0.0), 250.0);
        assert_eq!(RiskMode::FixedAmount(250.0).risk_amount(1e6), 250.0);
    }

    #[test]
    fn legacy_sentinel_means_none() {
        assert!(Commission::from_legacy(7.0).is_none());
        assert_eq!(Commission::from_legacy(7.0).per_lot_amount(), 0.0);
        assert_eq!(Commission::from_legacy(6.5), Commission::per_lot(6.5));
        assert_eq!(Commission::from_legacy(0.0), Commission::per_lot(0.0));
    }

    #[test]
    fn literal_commission_keeps_seven() {
        assert_eq!(Commission::per_lot(7.0).per_lot_amount(), 7.0);
    }

    #[test]
    fn commission_serializes_as_plain_option() {
        let json = serde_json::to_string(&Commission::per_lot(3.5)).unwrap();
        assert_eq!(json, "3.5");
        let json = serde_json::to_string(&Commission::none()).unwrap();
        assert_eq!(json, "null");
    }

    #[test]
    fn risk_mode_serde_shape() {
        let json = serde_json::to_string(&RiskMode::Percentage(1.5)).unwrap();
        assert_eq!(json, r#"{"mode":"percentage","value":1.5}"#);
    }
}

//! TOML defaults file.
//!
//! Every key is optional; an absent file, section or key falls back to the
//! built-in default. Command-line flags override whatever is loaded here.
//!
//! ```toml
//! [sizing]
//! commission = 3.5
//! volume_step = 0.01
//! rr_ratio = 2.0
//! min_net = 20.0
//! literal_commission = false
//! tp_step_pips = 0.5
//! max_iterations = 100000
//!
//! [highlight]
//! columns = ["PERIOD_M1", "PERIOD_M5"]
//! top_percent = 10.0
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::highlight::{HighlightRule, DEFAULT_COLUMNS, DEFAULT_TOP_PERCENT};
use crate::sizing::{SizingPolicy, DEFAULT_MAX_ITERATIONS, DEFAULT_TP_STEP_PIPS};

pub const DEFAULT_VOLUME_STEP: f64 = 1.0;
pub const DEFAULT_RR_RATIO: f64 = 2.0;
pub const DEFAULT_MIN_NET: f64 = 20.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct LotcalcConfig {
    pub sizing: SizingDefaults,
    pub highlight: HighlightDefaults,
}

/// Defaults for the optional sizing parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SizingDefaults {
    /// Per-lot commission; absent means none.
    pub commission: Option<f64>,
    pub volume_step: f64,
    pub rr_ratio: f64,
    pub min_net: f64,
    /// Charge a commission of exactly 7 instead of reading it as "none".
    pub literal_commission: bool,
    pub tp_step_pips: f64,
    pub max_iterations: u32,
}

impl Default for SizingDefaults {
    fn default() -> Self {
        Self {
            commission: None,
            volume_step: DEFAULT_VOLUME_STEP,
            rr_ratio: DEFAULT_RR_RATIO,
            min_net: DEFAULT_MIN_NET,
            literal_commission: false,
            tp_step_pips: DEFAULT_TP_STEP_PIPS,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }
}

impl SizingDefaults {
    pub fn policy(&self) -> SizingPolicy {
        SizingPolicy {
            tp_step_pips: self.tp_step_pips,
            max_iterations: self.max_iterations,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightDefaults {
    pub columns: Vec<String>,
    pub top_percent: f64,
}

impl Default for HighlightDefaults {
    fn default() -> Self {
        Self {
            columns: DEFAULT_COLUMNS.iter().map(|c| c.to_string()).collect(),
            top_percent: DEFAULT_TOP_PERCENT,
        }
    }
}

impl HighlightDefaults {
    pub fn rule(&self) -> HighlightRule {
        HighlightRule {
            columns: self.columns.clone(),
            top_percent: self.top_percent,
        }
    }
}

impl LotcalcConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Load `path` if given, otherwise the built-in defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.sizing;
        if let Some(c) = s.commission {
            if !c.is_finite() || c < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "sizing.commission must not be negative, got {c}"
                )));
            }
        }
        for (key, value) in [
            ("sizing.volume_step", s.volume_step),
            ("sizing.rr_ratio", s.rr_ratio),
            ("sizing.tp_step_pips", s.tp_step_pips),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::Invalid(format!("{key} must be positive, got {value}")));
            }
        }
        if !s.min_net.is_finite() || s.min_net < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "sizing.min_net must not be negative, got {}",
                s.min_net
            )));
        }
        if s.max_iterations == 0 {
            return Err(ConfigError::Invalid("sizing.max_iterations must be at least 1".into()));
        }
        self.highlight
            .rule()
            .validate()
            .map_err(|e| ConfigError::Invalid(format!("highlight: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = LotcalcConfig::from_toml("").unwrap();
        assert_eq!(config, LotcalcConfig::default());
        assert_eq!(config.sizing.volume_step, 1.0);
        assert_eq!(config.sizing.rr_ratio, 2.0);
        assert_eq!(config.sizing.min_net, 20.0);
        assert_eq!(config.sizing.commission, None);
        assert_eq!(config.highlight.columns.len(), 4);
    }

    #[test]
    fn partial_sections_merge_with_defaults() {
        let config = LotcalcConfig::from_toml(
            r#"
[sizing]
commission = 3.5
volume_step = 0.01

[highlight]
top_percent = 25.0
"#,
        )
        .unwrap();
        assert_eq!(config.sizing.commission, Some(3.5));
        assert_eq!(config.sizing.volume_step, 0.01);
        assert_eq!(config.sizing.rr_ratio, 2.0);
        assert_eq!(config.highlight.top_percent, 25.0);
        assert_eq!(config.highlight.columns[0], "PERIOD_M1");
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = LotcalcConfig::from_toml("[sizing]\nvolume_stpe = 0.01\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn non_positive_step_rejected() {
        let err = LotcalcConfig::from_toml("[sizing]\nvolume_step = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = LotcalcConfig::from_toml("[sizing]\ntp_step_pips = -0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn bad_highlight_percent_rejected() {
        let err = LotcalcConfig::from_toml("[highlight]\ntop_percent = 0.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn repeated_highlight_column_rejected() {
        let err = LotcalcConfig::from_toml(
            "[highlight]\ncolumns = [\"PERIOD_M1\", \"PERIOD_M1\"]\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("PERIOD_M1")));
    }

    #[test]
    fn policy_reflects_sizing_section() {
        let config =
            LotcalcConfig::from_toml("[sizing]\ntp_step_pips = 1.0\nmax_iterations = 50\n").unwrap();
        let policy = config.sizing.policy();
        assert_eq!(policy.tp_step_pips, 1.0);
        assert_eq!(policy.max_iterations, 50);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = LotcalcConfig::from_file(Path::new("/nonexistent/lotcalc.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}

use crate::error::{EngineError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable parameters of the reconciliation engine.
///
/// `fallback_rate` is a placeholder market assumption used wherever no
/// inflow history exists to derive a rate from. It is configuration, not a
/// quoted rate.
///
/// # Examples
///
/// ```
/// use reconciliation_engine::config::EngineConfig;
/// use rust_decimal_macros::dec;
///
/// let config = EngineConfig::default().with_fallback_rate(dec!(118.5));
/// assert!(config.validate().is_ok());
/// assert_eq!(config.trailing_window_days, 30);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Local units per foreign unit when no history is available.
    pub fallback_rate: Decimal,
    /// Length of the trailing window, and cap on the daily-average divisor.
    pub trailing_window_days: u32,
    pub default_horizon_days: u32,
    /// Pre-seed zero ledgers for counterparties with no activity.
    pub include_idle_counterparties: bool,
    pub activity_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fallback_rate: dec!(120),
            trailing_window_days: 30,
            default_horizon_days: 30,
            include_idle_counterparties: false,
            activity_limit: 10,
        }
    }
}

impl EngineConfig {
    /// Load a JSON config file. Missing keys take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fallback_rate <= Decimal::ZERO {
            return Err(EngineError::InvalidConfig(format!(
                "fallback_rate must be positive, got {}",
                self.fallback_rate
            )));
        }
        if self.trailing_window_days == 0 {
            return Err(EngineError::InvalidConfig(
                "trailing_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_fallback_rate(mut self, rate: Decimal) -> Self {
        self.fallback_rate = rate;
        self
    }

    pub fn with_trailing_window_days(mut self, days: u32) -> Self {
        self.trailing_window_days = days;
        self
    }

    pub fn with_default_horizon_days(mut self, days: u32) -> Self {
        self.default_horizon_days = days;
        self
    }

    pub fn with_idle_counterparties(mut self, include: bool) -> Self {
        self.include_idle_counterparties = include;
        self
    }

    pub fn with_activity_limit(mut self, limit: usize) -> Self {
        self.activity_limit = limit;
        self
    }
}

//! Validator configuration and per-run evaluation context.

use crate::prelude::*;
use chrono::{Local, NaiveDateTime};
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::dataset::DEFAULT_CURRENCY;

/// Thresholds and lists used by the quality and consistency checks.
///
/// The defaults are the values the checks were designed around; tests and
/// callers with unusual accounts can tighten or relax them.
///
/// ```rust
/// use trade_guard::core::ValidatorConfig;
///
/// let config = ValidatorConfig::default()
///     .with_max_date_span_days(365)
///     .with_zero_amount_exempt_kind("Balance Adjustment");
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.zero_amount_exempt_kinds.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatorConfig {
    /// Largest span between first and last transaction before warning
    pub max_date_span_days: i64,
    /// Magnitude above which an amount is reported as extreme
    pub extreme_amount: Decimal,
    /// Transaction kinds allowed to carry a zero amount
    pub zero_amount_exempt_kinds: Vec<String>,
    /// Pattern a well-formed symbol must match
    pub symbol_pattern: String,
    /// Maximum number of distinct offending symbols listed in a finding
    pub max_symbol_examples: usize,
    /// Symbol suffixes identifying currency-pair instruments
    pub currency_pair_suffixes: Vec<String>,
    /// Currency assigned to rows whose export has no currency
    pub default_currency: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            max_date_span_days: 2000,
            extreme_amount: Decimal::new(1_000_000, 0),
            zero_amount_exempt_kinds: vec!["Receive Deliver".to_string()],
            symbol_pattern: r"^[A-Z/]{1,10}$".to_string(),
            max_symbol_examples: 5,
            currency_pair_suffixes: vec!["/USD".to_string()],
            default_currency: DEFAULT_CURRENCY.to_string(),
        }
    }
}

impl ValidatorConfig {
    pub fn with_max_date_span_days(mut self, days: i64) -> Self {
        self.max_date_span_days = days;
        self
    }

    pub fn with_extreme_amount(mut self, amount: Decimal) -> Self {
        self.extreme_amount = amount;
        self
    }

    pub fn with_zero_amount_exempt_kind(mut self, kind: impl Into<String>) -> Self {
        self.zero_amount_exempt_kinds.push(kind.into());
        self
    }

    pub fn with_symbol_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.symbol_pattern = pattern.into();
        self
    }

    pub fn with_max_symbol_examples(mut self, max: usize) -> Self {
        self.max_symbol_examples = max;
        self
    }

    pub fn with_currency_pair_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.currency_pair_suffixes.push(suffix.into());
        self
    }

    /// Compiles the symbol pattern.
    pub fn symbol_regex(&self) -> Result<Regex> {
        Regex::new(&self.symbol_pattern).map_err(|e| {
            GuardError::Configuration(format!(
                "Invalid symbol pattern '{}': {e}",
                self.symbol_pattern
            ))
        })
    }

    /// Checks that the configuration can be used to build the checks.
    pub fn validate(&self) -> Result<()> {
        if self.max_date_span_days < 0 {
            return Err(GuardError::Configuration(format!(
                "max_date_span_days must not be negative, got {}",
                self.max_date_span_days
            )));
        }
        if self.extreme_amount.is_sign_negative() {
            return Err(GuardError::Configuration(format!(
                "extreme_amount must not be negative, got {}",
                self.extreme_amount
            )));
        }
        self.symbol_regex()?;
        Ok(())
    }
}

/// Per-run state shared with every constraint.
///
/// The reference time decides which transactions count as "in the future".
/// It is fixed when the run starts so every rule sees the same instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationContext {
    reference_time: NaiveDateTime,
}

impl ValidationContext {
    /// Creates a context evaluated at `reference_time` (local wall-clock).
    pub fn new(reference_time: NaiveDateTime) -> Self {
        Self { reference_time }
    }

    /// Creates a context at the current local time.
    pub fn now() -> Self {
        Self::new(Local::now().naive_local())
    }

    pub fn reference_time(&self) -> NaiveDateTime {
        self.reference_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_default_config_is_valid() {
        let config = ValidatorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_date_span_days, 2000);
        assert_eq!(config.extreme_amount, Decimal::new(1_000_000, 0));
        assert_eq!(config.zero_amount_exempt_kinds, vec!["Receive Deliver"]);
        assert_eq!(config.max_symbol_examples, 5);
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        let config = ValidatorConfig::default().with_symbol_pattern("[A-Z");
        let err = config.validate().unwrap_err();
        assert!(matches!(err, GuardError::Configuration(_)));
    }

    #[test]
    fn test_negative_thresholds_are_rejected() {
        assert!(ValidatorConfig::default()
            .with_max_date_span_days(-1)
            .validate()
            .is_err());
        assert!(ValidatorConfig::default()
            .with_extreme_amount(Decimal::new(-5, 0))
            .validate()
            .is_err());
    }

    #[test]
    fn test_context_keeps_reference_time() {
        let instant = NaiveDate::from_ymd_opt(2025, 6, 30)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap();
        assert_eq!(ValidationContext::new(instant).reference_time(), instant);
    }
}

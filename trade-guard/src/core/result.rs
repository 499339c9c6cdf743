//! Validation result types.

use super::Level;
use crate::sources::SchemaVariant;
use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One warning or error produced by a stage of the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    /// The severity level of the finding
    pub level: Level,
    /// Name of the check or stage that produced it
    pub check: String,
    /// Human-readable description
    pub message: String,
}

impl Finding {
    pub fn warning(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Warning,
            check: check.into(),
            message: message.into(),
        }
    }

    pub fn error(check: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: Level::Error,
            check: check.into(),
            message: message.into(),
        }
    }
}

/// Inclusive calendar range covered by a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} to {}", self.start, self.end)
    }
}

/// Descriptive statistics over a loaded dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    pub total_transactions: usize,
    pub date_range: Option<DateRange>,
    pub unique_symbols: usize,
    /// Frequency of each transaction kind, in first-seen order
    pub transaction_kinds: IndexMap<String, usize>,
    /// Sum of absolute parseable amounts
    pub total_volume: Decimal,
}

impl Default for SummaryStats {
    fn default() -> Self {
        Self {
            total_transactions: 0,
            date_range: None,
            unique_symbols: 0,
            transaction_kinds: IndexMap::new(),
            total_volume: Decimal::ZERO,
        }
    }
}

/// The outcome of validating one export file.
///
/// A report either carries exactly one error (the run was aborted before any
/// check ran) or a full set of warnings and statistics. `passed` is true
/// exactly when there are no errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationReport {
    source: String,
    format: Option<SchemaVariant>,
    passed: bool,
    errors: Vec<Finding>,
    warnings: Vec<Finding>,
    stats: Option<SummaryStats>,
}

impl ValidationReport {
    /// Creates the report of a run aborted by a fatal error.
    pub fn aborted(
        source: impl Into<String>,
        format: Option<SchemaVariant>,
        error: Finding,
    ) -> Self {
        Self {
            source: source.into(),
            format,
            passed: false,
            errors: vec![error],
            warnings: Vec::new(),
            stats: None,
        }
    }

    /// Creates the report of a run that loaded its data and ran every check.
    pub fn completed(
        source: impl Into<String>,
        format: SchemaVariant,
        warnings: Vec<Finding>,
        stats: SummaryStats,
    ) -> Self {
        Self {
            source: source.into(),
            format: Some(format),
            passed: true,
            errors: Vec::new(),
            warnings,
            stats: Some(stats),
        }
    }

    /// The path or label of the validated input.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The detected schema variant, if detection succeeded.
    pub fn format(&self) -> Option<SchemaVariant> {
        self.format
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn errors(&self) -> &[Finding] {
        &self.errors
    }

    pub fn warnings(&self) -> &[Finding] {
        &self.warnings
    }

    pub fn stats(&self) -> Option<&SummaryStats> {
        self.stats.as_ref()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    /// Formats the report as pretty-printed JSON.
    pub fn to_json(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{JsonFormatter, ResultFormatter};
        JsonFormatter::new().format(self)
    }

    /// Formats the report for console display, without colors.
    pub fn to_human(&self) -> crate::prelude::Result<String> {
        use crate::formatters::{FormatterConfig, HumanFormatter, ResultFormatter};
        HumanFormatter::with_config(FormatterConfig::plain()).format(self)
    }

    /// Formats the report using a custom formatter.
    pub fn format_with<F: crate::formatters::ResultFormatter>(
        &self,
        formatter: &F,
    ) -> crate::prelude::Result<String> {
        formatter.format(self)
    }
}

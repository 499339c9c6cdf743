//! Report formatting for console and machine consumption.
//!
//! Two formatters are provided: [`HumanFormatter`] renders the sectioned
//! console report, and [`JsonFormatter`] serializes the report with serde.
//! Neither includes anything time-dependent, so formatting the same report
//! twice produces identical text.
//!
//! # Examples
//!
//! ```rust
//! use trade_guard::core::{Finding, ValidationReport};
//! use trade_guard::formatters::{FormatterConfig, HumanFormatter, ResultFormatter};
//!
//! let report = ValidationReport::aborted(
//!     "broken.csv",
//!     None,
//!     Finding::error("file_format", "Invalid CSV format - missing required headers"),
//! );
//! let text = HumanFormatter::with_config(FormatterConfig::plain())
//!     .format(&report)
//!     .unwrap();
//! assert!(text.contains("File format validation failed"));
//! ```

use crate::core::{Finding, SummaryStats, ValidationReport};
use crate::prelude::*;
use std::fmt::{self, Write};

const RULE_WIDTH: usize = 60;

/// Configuration options for formatting validation reports.
#[derive(Debug, Clone)]
pub struct FormatterConfig {
    /// Include the summary block and transaction-kind histogram
    pub include_stats: bool,
    /// Maximum number of warnings to display (`None` for all)
    pub max_warnings: Option<usize>,
    /// Whether to use ANSI colors (human formatter only)
    pub use_colors: bool,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            include_stats: true,
            max_warnings: None,
            use_colors: true,
        }
    }
}

impl FormatterConfig {
    /// Everything, without colors.
    pub fn plain() -> Self {
        Self {
            use_colors: false,
            ..Self::default()
        }
    }

    pub fn with_stats(mut self, include: bool) -> Self {
        self.include_stats = include;
        self
    }

    pub fn with_max_warnings(mut self, max: Option<usize>) -> Self {
        self.max_warnings = max;
        self
    }

    pub fn with_colors(mut self, use_colors: bool) -> Self {
        self.use_colors = use_colors;
        self
    }
}

/// Trait for rendering a [`ValidationReport`].
///
/// ```rust
/// use trade_guard::core::ValidationReport;
/// use trade_guard::formatters::ResultFormatter;
///
/// struct StatusOnly;
///
/// impl ResultFormatter for StatusOnly {
///     fn format(&self, report: &ValidationReport) -> trade_guard::prelude::Result<String> {
///         Ok(format!("{}: {}", report.source(), report.passed()))
///     }
/// }
/// ```
pub trait ResultFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String>;

    /// Formats with an explicit configuration. The default ignores it.
    fn format_with_config(
        &self,
        report: &ValidationReport,
        _config: &FormatterConfig,
    ) -> Result<String> {
        self.format(report)
    }
}

/// Serializes reports as JSON.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    pub fn new() -> Self {
        Self { pretty: true }
    }

    /// Sets whether to use pretty-printed JSON.
    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultFormatter for JsonFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        let json = if self.pretty {
            serde_json::to_string_pretty(report)
        } else {
            serde_json::to_string(report)
        };
        json.map_err(|e| GuardError::Serialization(format!("Failed to serialize report: {e}")))
    }
}

/// Renders reports as sectioned console text.
///
/// Sections, in order: header, format line, transaction count, data summary,
/// transaction types, warnings, errors, closing status. Sections that do not
/// apply (no stats after an aborted run, no warnings) are left out.
#[derive(Debug, Clone, Default)]
pub struct HumanFormatter {
    config: FormatterConfig,
}

impl HumanFormatter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: FormatterConfig) -> Self {
        Self { config }
    }

    fn paint(&self, text: &str, ansi: &str, config: &FormatterConfig) -> String {
        if config.use_colors {
            format!("\x1b[{ansi}m{text}\x1b[0m")
        } else {
            text.to_string()
        }
    }

    fn render(
        &self,
        out: &mut String,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> fmt::Result {
        writeln!(out, "🔍 Validating: {}", report.source())?;
        writeln!(out, "{}", "=".repeat(RULE_WIDTH))?;

        match (report.format(), report.stats()) {
            (None, _) => writeln!(out, "❌ File format validation failed")?,
            (Some(format), None) => {
                writeln!(out, "✅ File format: {format}")?;
                writeln!(out, "❌ Data loading failed")?;
            }
            (Some(format), Some(stats)) => {
                writeln!(out, "✅ File format: {format}")?;
                writeln!(
                    out,
                    "✅ Data loaded: {} transactions",
                    group_thousands(&stats.total_transactions.to_string())
                )?;
                if config.include_stats {
                    self.render_stats(out, stats)?;
                }
            }
        }

        if report.has_warnings() {
            self.render_warnings(out, report.warnings(), config)?;
        }

        if !report.errors().is_empty() {
            writeln!(out)?;
            writeln!(out, "❌ Errors ({}):", report.errors().len())?;
            for error in report.errors() {
                writeln!(out, "   • {}", error.message)?;
            }
        }

        writeln!(out)?;
        if !report.passed() {
            writeln!(out, "❌ {}", self.paint("Validation FAILED", "31", config))?;
            return Ok(());
        }
        if !report.has_warnings() {
            writeln!(out, "✅ No data quality issues detected!")?;
        }
        writeln!(
            out,
            "🎯 {}",
            self.paint("Validation completed successfully!", "32", config)
        )
    }

    fn render_stats(&self, out: &mut String, stats: &SummaryStats) -> fmt::Result {
        writeln!(out)?;
        writeln!(out, "📊 Data Summary:")?;
        writeln!(
            out,
            "   Total transactions: {}",
            group_thousands(&stats.total_transactions.to_string())
        )?;
        match &stats.date_range {
            Some(range) => writeln!(out, "   Date range: {range}")?,
            None => writeln!(out, "   Date range: n/a")?,
        }
        writeln!(out, "   Unique symbols: {}", stats.unique_symbols)?;
        writeln!(
            out,
            "   Total volume: ${}",
            group_thousands(&format!("{:.2}", stats.total_volume.round_dp(2)))
        )?;

        if !stats.transaction_kinds.is_empty() {
            writeln!(out)?;
            writeln!(out, "📋 Transaction Types:")?;
            for (kind, count) in &stats.transaction_kinds {
                writeln!(out, "   {kind}: {}", group_thousands(&count.to_string()))?;
            }
        }
        Ok(())
    }

    fn render_warnings(
        &self,
        out: &mut String,
        warnings: &[Finding],
        config: &FormatterConfig,
    ) -> fmt::Result {
        let shown = config
            .max_warnings
            .map_or(warnings.len(), |max| max.min(warnings.len()));

        writeln!(out)?;
        writeln!(
            out,
            "⚠️  {}",
            self.paint(&format!("Warnings ({}):", warnings.len()), "33", config)
        )?;
        for warning in &warnings[..shown] {
            writeln!(out, "   • {}", warning.message)?;
        }
        if warnings.len() > shown {
            writeln!(out, "   ... and {} more warnings", warnings.len() - shown)?;
        }
        Ok(())
    }
}

impl ResultFormatter for HumanFormatter {
    fn format(&self, report: &ValidationReport) -> Result<String> {
        self.format_with_config(report, &self.config)
    }

    fn format_with_config(
        &self,
        report: &ValidationReport,
        config: &FormatterConfig,
    ) -> Result<String> {
        let mut output = String::new();
        self.render(&mut output, report, config)
            .map_err(|e| GuardError::Serialization(format!("Failed to render report: {e}")))?;
        Ok(output)
    }
}

/// Inserts `,` between groups of three integer digits.
///
/// ```rust
/// use trade_guard::formatters::group_thousands;
///
/// assert_eq!(group_thousands("1234567.5"), "1,234,567.5");
/// assert_eq!(group_thousands("-1000"), "-1,000");
/// assert_eq!(group_thousands("999"), "999");
/// ```
pub fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (integer, fraction) = match unsigned.find('.') {
        Some(idx) => unsigned.split_at(idx),
        None => (unsigned, ""),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (idx, digit) in integer.chars().enumerate() {
        if idx > 0 && (integer.len() - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    format!("{sign}{grouped}{fraction}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{DateRange, ValidationReport};
    use crate::sources::SchemaVariant;
    use chrono::NaiveDate;
    use indexmap::IndexMap;
    use rust_decimal::Decimal;

    fn stats() -> SummaryStats {
        let mut kinds = IndexMap::new();
        kinds.insert("Trade".to_string(), 1200);
        kinds.insert("Money Movement".to_string(), 3);
        SummaryStats {
            total_transactions: 1203,
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
            }),
            unique_symbols: 14,
            transaction_kinds: kinds,
            total_volume: Decimal::new(123456789, 2),
        }
    }

    fn completed(warnings: Vec<Finding>) -> ValidationReport {
        ValidationReport::completed("history.csv", SchemaVariant::Legacy, warnings, stats())
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("0"), "0");
        assert_eq!(group_thousands("1000"), "1,000");
        assert_eq!(group_thousands("100000"), "100,000");
        assert_eq!(group_thousands("1234567.89"), "1,234,567.89");
        assert_eq!(group_thousands("-12345.6"), "-12,345.6");
    }

    #[test]
    fn test_human_sections_in_order() {
        let report = completed(vec![Finding::warning(
            "zero_amounts",
            "2 transactions with zero amounts",
        )]);
        let text = HumanFormatter::with_config(FormatterConfig::plain())
            .format(&report)
            .unwrap();

        let order = [
            "🔍 Validating: history.csv",
            "✅ File format: legacy",
            "✅ Data loaded: 1,203 transactions",
            "📊 Data Summary:",
            "   Date range: 2023-01-02 to 2024-06-30",
            "   Total volume: $1,234,567.89",
            "📋 Transaction Types:",
            "   Trade: 1,200",
            "   Money Movement: 3",
            "⚠️  Warnings (1):",
            "   • 2 transactions with zero amounts",
            "🎯 Validation completed successfully!",
        ];
        let mut from = 0;
        for needle in order {
            let idx = text[from..]
                .find(needle)
                .unwrap_or_else(|| panic!("missing or out of order: {needle}\n{text}"));
            from += idx + needle.len();
        }
        assert!(!text.contains("No data quality issues"));
        assert!(!text.contains("\x1b["));
    }

    #[test]
    fn test_clean_report_says_so() {
        let text = completed(Vec::new()).to_human().unwrap();
        assert!(text.contains("✅ No data quality issues detected!"));
    }

    #[test]
    fn test_load_failure_keeps_format_line() {
        let report = ValidationReport::aborted(
            "new.csv",
            Some(SchemaVariant::New),
            Finding::error("data_loading", "Error loading data: boom"),
        );
        let text = report.to_human().unwrap();
        assert!(text.contains("✅ File format: new"));
        assert!(text.contains("❌ Data loading failed"));
        assert!(text.contains("❌ Errors (1):\n   • Error loading data: boom"));
        assert!(text.contains("Validation FAILED"));
        assert!(!text.contains("Data Summary"));
    }

    #[test]
    fn test_warning_cap_and_colors() {
        let warnings = (0..4)
            .map(|i| Finding::warning("w", format!("warning {i}")))
            .collect();
        let text = HumanFormatter::with_config(FormatterConfig::default().with_max_warnings(Some(2)))
            .format(&completed(warnings))
            .unwrap();

        assert!(text.contains("warning 1"));
        assert!(!text.contains("warning 2"));
        assert!(text.contains("... and 2 more warnings"));
        assert!(text.contains("\x1b[33m"));
    }

    #[test]
    fn test_stats_can_be_hidden() {
        let text = HumanFormatter::with_config(FormatterConfig::plain().with_stats(false))
            .format(&completed(Vec::new()))
            .unwrap();
        assert!(text.contains("Data loaded"));
        assert!(!text.contains("Data Summary"));
    }

    #[test]
    fn test_json_formatter() {
        let json = JsonFormatter::new().with_pretty(false).format(&completed(Vec::new())).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["source"], "history.csv");
        assert_eq!(value["passed"], true);
        assert_eq!(value["stats"]["total_transactions"], 1203);
        assert_eq!(value["stats"]["total_volume"], "1234567.89");
        let trade = json.find("\"Trade\"").unwrap();
        let money = json.find("\"Money Movement\"").unwrap();
        assert!(trade < money, "kinds must keep first-seen order");
    }
}

//! Symbol shape validation.

use crate::core::{Column, Constraint, ConstraintResult, Dataset, ValidationContext};
use indexmap::IndexSet;
use regex::Regex;

/// Flags symbols that do not look like a plain ticker.
///
/// Option and futures symbols (`SPY 240119C00470000`, `/ESH4`) fail the
/// default pattern, as do lowercase or overly long tickers. The finding lists
/// at most `max_examples` distinct offenders, in the order they first appear.
///
/// ```rust
/// use regex::Regex;
/// use trade_guard::constraints::SymbolFormatConstraint;
///
/// let constraint = SymbolFormatConstraint::new(Regex::new(r"^[A-Z/]{1,10}$").unwrap(), 5);
/// assert!(constraint.is_well_formed("BTC/USD"));
/// assert!(!constraint.is_well_formed("spy"));
/// ```
#[derive(Debug, Clone)]
pub struct SymbolFormatConstraint {
    pattern: Regex,
    max_examples: usize,
}

impl SymbolFormatConstraint {
    pub fn new(pattern: Regex, max_examples: usize) -> Self {
        Self {
            pattern,
            max_examples,
        }
    }

    pub fn is_well_formed(&self, symbol: &str) -> bool {
        self.pattern.is_match(symbol)
    }
}

impl Constraint for SymbolFormatConstraint {
    fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
        let unusual: IndexSet<&str> = dataset
            .rows()
            .iter()
            .filter_map(|row| row.symbol.as_deref())
            .filter(|symbol| !self.is_well_formed(symbol))
            .collect();

        if unusual.is_empty() {
            return ConstraintResult::success_with_metric(0.0);
        }

        let examples: Vec<&str> = unusual.iter().take(self.max_examples).copied().collect();
        ConstraintResult::failure_with_metric(
            unusual.len() as f64,
            format!("Unusual symbol formats detected: {}", examples.join(", ")),
        )
    }

    fn name(&self) -> &str {
        "symbol_format"
    }

    fn required_columns(&self) -> &[Column] {
        &[Column::Symbol]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::{at, ctx};
    use crate::core::CanonicalRow;

    fn constraint() -> SymbolFormatConstraint {
        SymbolFormatConstraint::new(Regex::new(r"^[A-Z/]{1,10}$").unwrap(), 5)
    }

    fn with_symbols(symbols: &[&str]) -> Dataset {
        Dataset::new(
            Column::ALL,
            symbols
                .iter()
                .map(|s| CanonicalRow::new(at(2024, 1, 1)).with_symbol(*s))
                .collect(),
        )
    }

    #[test]
    fn test_well_formed_symbols_pass() {
        let result = constraint().evaluate(&with_symbols(&["AAPL", "BTC/USD", "M"]), &ctx());
        assert!(result.status.is_success());
    }

    #[test]
    fn test_examples_are_distinct_and_capped() {
        let data = with_symbols(&[
            "aapl", "SPY 240119C470", "aapl", "TOOLONGTICKER", "X1", "Y2", "Z3", "W4",
        ]);
        let result = constraint().evaluate(&data, &ctx());

        assert_eq!(result.metric, Some(7.0));
        assert_eq!(
            result.messages,
            vec!["Unusual symbol formats detected: aapl, SPY 240119C470, TOOLONGTICKER, X1, Y2"]
        );
    }

    #[test]
    fn test_missing_symbols_are_ignored() {
        let data = Dataset::new(Column::ALL, vec![CanonicalRow::new(at(2024, 1, 1))]);
        assert!(constraint().evaluate(&data, &ctx()).status.is_success());
    }
}

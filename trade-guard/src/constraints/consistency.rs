//! Per-symbol consistency rules.

use crate::core::{Column, Constraint, ConstraintResult, Dataset, ValidationContext};
use indexmap::IndexMap;
use tracing::instrument;

/// Flags fractional quantities on instruments traded in whole units.
///
/// Rows are grouped by symbol in first-seen order, so findings come out in
/// the order symbols appear in the export. Currency-pair instruments (symbols
/// ending with one of the configured suffixes, e.g. `BTC/USD`) trade in
/// fractions and are exempt.
///
/// ```rust
/// use trade_guard::constraints::FractionalQuantityConstraint;
///
/// let constraint = FractionalQuantityConstraint::new(["/USD"]);
/// assert!(constraint.is_currency_pair("ETH/USD"));
/// assert!(!constraint.is_currency_pair("AAPL"));
/// ```
#[derive(Debug, Clone)]
pub struct FractionalQuantityConstraint {
    currency_pair_suffixes: Vec<String>,
}

impl FractionalQuantityConstraint {
    pub fn new<I, S>(currency_pair_suffixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            currency_pair_suffixes: currency_pair_suffixes.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_currency_pair(&self, symbol: &str) -> bool {
        self.currency_pair_suffixes
            .iter()
            .any(|suffix| symbol.ends_with(suffix.as_str()))
    }
}

impl Constraint for FractionalQuantityConstraint {
    #[instrument(skip(self, dataset, _ctx))]
    fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
        let mut fractional_by_symbol: IndexMap<&str, usize> = IndexMap::new();

        for row in dataset.rows() {
            let Some(symbol) = row.symbol.as_deref() else {
                continue;
            };
            if self.is_currency_pair(symbol) {
                continue;
            }
            let count = fractional_by_symbol.entry(symbol).or_insert(0);
            if row.quantity.is_some_and(|q| !q.fract().is_zero()) {
                *count += 1;
            }
        }

        let messages = fractional_by_symbol
            .into_iter()
            .filter(|(_, count)| *count > 0)
            .map(|(symbol, count)| {
                format!("Fractional quantities found for {symbol}: {count} transactions")
            })
            .collect();

        ConstraintResult::from_messages(messages)
    }

    fn name(&self) -> &str {
        "fractional_quantities"
    }

    fn required_columns(&self) -> &[Column] {
        &[Column::Symbol, Column::Quantity]
    }

    fn description(&self) -> Option<&str> {
        Some("Non-currency instruments should trade in whole units")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::{at, ctx};
    use crate::core::CanonicalRow;
    use rust_decimal::Decimal;

    fn rows(symbol: &str, quantities: &[Decimal]) -> Vec<CanonicalRow> {
        quantities
            .iter()
            .map(|q| {
                CanonicalRow::new(at(2024, 3, 1))
                    .with_symbol(symbol)
                    .with_quantity(*q)
            })
            .collect()
    }

    fn ten_and_a_half() -> [Decimal; 2] {
        [Decimal::new(10, 0), Decimal::new(105, 1)]
    }

    #[test]
    fn test_fractional_stock_quantity_fires() {
        let dataset = Dataset::new(Column::ALL, rows("AAPL", &ten_and_a_half()));
        let result = FractionalQuantityConstraint::new(["/USD"]).evaluate(&dataset, &ctx());
        assert_eq!(
            result.messages,
            vec!["Fractional quantities found for AAPL: 1 transactions"]
        );
    }

    #[test]
    fn test_currency_pair_is_exempt() {
        let dataset = Dataset::new(Column::ALL, rows("BTC/USD", &ten_and_a_half()));
        let result = FractionalQuantityConstraint::new(["/USD"]).evaluate(&dataset, &ctx());
        assert!(result.status.is_success());
    }

    #[test]
    fn test_findings_follow_first_seen_symbol_order() {
        let mut all = rows("TSLA", &[Decimal::new(5, 1)]);
        all.extend(rows("AAPL", &[Decimal::new(25, 1), Decimal::new(1, 0)]));
        all.extend(rows("TSLA", &[Decimal::new(15, 1)]));
        let dataset = Dataset::new(Column::ALL, all);

        let result = FractionalQuantityConstraint::new(["/USD"]).evaluate(&dataset, &ctx());
        assert_eq!(
            result.messages,
            vec![
                "Fractional quantities found for TSLA: 2 transactions",
                "Fractional quantities found for AAPL: 1 transactions",
            ]
        );
    }

    #[test]
    fn test_negative_whole_quantities_pass() {
        let dataset = Dataset::new(
            Column::ALL,
            rows("SPY", &[Decimal::new(-100, 0), Decimal::new(-1000, 1)]),
        );
        let result = FractionalQuantityConstraint::new(["/USD"]).evaluate(&dataset, &ctx());
        assert!(result.status.is_success());
    }
}

//! Summary statistics over a canonical dataset.

use crate::core::{Column, DateRange, Dataset, SummaryStats};
use indexmap::IndexMap;
use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::{instrument, warn};

/// Computes [`SummaryStats`] for a dataset.
///
/// ```rust
/// use trade_guard::analyzers::SummaryAggregator;
/// use trade_guard::core::{Column, Dataset};
///
/// let stats = SummaryAggregator::summarize(&Dataset::new(Column::ALL, Vec::new()));
/// assert_eq!(stats.total_transactions, 0);
/// assert!(stats.date_range.is_none());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryAggregator;

impl SummaryAggregator {
    #[instrument(skip(dataset), fields(rows = dataset.len()))]
    pub fn summarize(dataset: &Dataset) -> SummaryStats {
        let date_range = if dataset.has_column(Column::Timestamp) {
            dataset
                .timestamp_bounds()
                .map(|(min, max)| DateRange {
                    start: min.date(),
                    end: max.date(),
                })
        } else {
            None
        };

        let unique_symbols = if dataset.has_column(Column::Symbol) {
            dataset
                .rows()
                .iter()
                .filter_map(|row| row.symbol.as_deref())
                .collect::<HashSet<_>>()
                .len()
        } else {
            0
        };

        let mut transaction_kinds: IndexMap<String, usize> = IndexMap::new();
        if dataset.has_column(Column::TransactionKind) {
            for kind in dataset
                .rows()
                .iter()
                .filter_map(|row| row.transaction_kind.as_deref())
            {
                *transaction_kinds.entry(kind.to_string()).or_insert(0) += 1;
            }
        }

        let total_volume = if dataset.has_column(Column::Amount) {
            total_volume(dataset)
        } else {
            Decimal::ZERO
        };

        SummaryStats {
            total_transactions: dataset.len(),
            date_range,
            unique_symbols,
            transaction_kinds,
            total_volume,
        }
    }
}

/// Sums absolute amounts, saturating at [`Decimal::MAX`] instead of
/// overflowing.
fn total_volume(dataset: &Dataset) -> Decimal {
    let mut total = Decimal::ZERO;
    for amount in dataset.rows().iter().filter_map(|row| row.amount) {
        match total.checked_add(amount.abs()) {
            Some(sum) => total = sum,
            None => {
                warn!("Total volume exceeds the decimal range, reporting the maximum");
                return Decimal::MAX;
            }
        }
    }
    total
}

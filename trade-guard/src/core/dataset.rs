//! Canonical, format-independent representation of a loaded export.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Currency assumed when an export carries no currency column.
pub const DEFAULT_CURRENCY: &str = "USD";

/// The canonical columns a [`Dataset`] can carry.
///
/// Each column is bound to the header name used by the Legacy export layout,
/// which is also the name shown to users in findings.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Column {
    Timestamp,
    TransactionKind,
    TransactionSubKind,
    Symbol,
    Amount,
    Quantity,
    Currency,
}

impl Column {
    /// All canonical columns, in header order.
    pub const ALL: [Column; 7] = [
        Column::Timestamp,
        Column::TransactionKind,
        Column::TransactionSubKind,
        Column::Symbol,
        Column::Amount,
        Column::Quantity,
        Column::Currency,
    ];

    /// The Legacy header name for this column.
    pub fn header(&self) -> &'static str {
        match self {
            Column::Timestamp => "Date/Time",
            Column::TransactionKind => "Transaction Code",
            Column::TransactionSubKind => "Transaction Subcode",
            Column::Symbol => "Symbol",
            Column::Amount => "Amount",
            Column::Quantity => "Quantity",
            Column::Currency => "Currency",
        }
    }

    /// Resolves a Legacy header name to its canonical column.
    pub fn from_header(header: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.header() == header)
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.header())
    }
}

/// One transaction in canonical form.
///
/// Optional fields are `None` when the cell was empty or, for numeric fields,
/// when the value could not be parsed. A legitimate zero is `Some(0)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRow {
    pub timestamp: NaiveDateTime,
    pub transaction_kind: Option<String>,
    pub transaction_sub_kind: Option<String>,
    pub symbol: Option<String>,
    pub amount: Option<Decimal>,
    pub quantity: Option<Decimal>,
    pub currency: String,
}

impl CanonicalRow {
    /// Creates a row with only a timestamp set.
    pub fn new(timestamp: NaiveDateTime) -> Self {
        Self {
            timestamp,
            transaction_kind: None,
            transaction_sub_kind: None,
            symbol: None,
            amount: None,
            quantity: None,
            currency: DEFAULT_CURRENCY.to_string(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.transaction_kind = Some(kind.into());
        self
    }

    pub fn with_sub_kind(mut self, sub_kind: impl Into<String>) -> Self {
        self.transaction_sub_kind = Some(sub_kind.into());
        self
    }

    pub fn with_symbol(mut self, symbol: impl Into<String>) -> Self {
        self.symbol = Some(symbol.into());
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = Some(amount);
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = Some(quantity);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }
}

/// A numeric cell that was present but could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoercionFailure {
    /// 1-based line number in the loaded text
    pub line: usize,
    pub column: Column,
    /// The cell content as read
    pub raw: String,
}

/// An ordered, immutable collection of canonical rows.
///
/// Row order is file order. The dataset also remembers which canonical
/// columns the source header carried, so checks can tell "column absent"
/// apart from "value missing".
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: BTreeSet<Column>,
    rows: Vec<CanonicalRow>,
    coercion_failures: Vec<CoercionFailure>,
}

impl Dataset {
    /// Creates a dataset from rows and the columns that were present.
    pub fn new<I>(columns: I, rows: Vec<CanonicalRow>) -> Self
    where
        I: IntoIterator<Item = Column>,
    {
        Self {
            columns: columns.into_iter().collect(),
            rows,
            coercion_failures: Vec::new(),
        }
    }

    /// Attaches the numeric coercion failures observed while loading.
    pub fn with_coercion_failures(mut self, failures: Vec<CoercionFailure>) -> Self {
        self.coercion_failures = failures;
        self
    }

    pub fn rows(&self) -> &[CanonicalRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if the source header carried `column`.
    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// Returns true if the source header carried every column in `columns`.
    pub fn has_columns(&self, columns: &[Column]) -> bool {
        columns.iter().all(|c| self.has_column(*c))
    }

    pub fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.columns.iter().copied()
    }

    pub fn coercion_failures(&self) -> &[CoercionFailure] {
        &self.coercion_failures
    }

    /// Counts rows whose value for `column` is missing.
    ///
    /// Timestamps are guaranteed by the loader and currency is defaulted, so
    /// both always report zero.
    pub fn null_count(&self, column: Column) -> usize {
        let is_null = |row: &CanonicalRow| match column {
            Column::Timestamp | Column::Currency => false,
            Column::TransactionKind => row.transaction_kind.is_none(),
            Column::TransactionSubKind => row.transaction_sub_kind.is_none(),
            Column::Symbol => row.symbol.is_none(),
            Column::Amount => row.amount.is_none(),
            Column::Quantity => row.quantity.is_none(),
        };
        self.rows.iter().filter(|row| is_null(row)).count()
    }

    /// Earliest and latest timestamp, or `None` for an empty dataset.
    pub fn timestamp_bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        let mut timestamps = self.rows.iter().map(|row| row.timestamp);
        let first = timestamps.next()?;
        Some(timestamps.fold((first, first), |(min, max), ts| {
            (min.min(ts), max.max(ts))
        }))
    }
}

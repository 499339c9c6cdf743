//! Amount plausibility rules.

use crate::core::{Column, Constraint, ConstraintResult, Dataset, ValidationContext};
use crate::formatters::group_thousands;
use rust_decimal::Decimal;
use std::collections::HashSet;

/// Warns about amounts whose magnitude exceeds a limit.
///
/// The comparison ignores currency; the limit is a plain magnitude.
#[derive(Debug, Clone)]
pub struct ExtremeAmountConstraint {
    limit: Decimal,
}

impl ExtremeAmountConstraint {
    pub fn new(limit: Decimal) -> Self {
        Self { limit }
    }
}

impl Constraint for ExtremeAmountConstraint {
    fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
        let extreme = dataset
            .rows()
            .iter()
            .filter_map(|row| row.amount)
            .filter(|amount| amount.abs() > self.limit)
            .count();

        ConstraintResult::from_count(extreme, |n| {
            format!(
                "{n} transactions with amounts > {}",
                group_thousands(&self.limit.normalize().to_string())
            )
        })
    }

    fn name(&self) -> &str {
        "extreme_amounts"
    }

    fn required_columns(&self) -> &[Column] {
        &[Column::Amount]
    }
}

/// Warns about zero amounts on transaction kinds that should move money.
///
/// Share and option deliveries (`Receive Deliver`) legitimately carry a zero
/// amount; trades and money movements do not. Rows without a kind are never
/// exempt.
#[derive(Debug, Clone)]
pub struct ZeroAmountConstraint {
    exempt_kinds: HashSet<String>,
}

impl ZeroAmountConstraint {
    pub fn new<I, S>(exempt_kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            exempt_kinds: exempt_kinds.into_iter().map(Into::into).collect(),
        }
    }

    fn is_exempt(&self, kind: Option<&str>) -> bool {
        kind.is_some_and(|kind| self.exempt_kinds.contains(kind))
    }
}

impl Constraint for ZeroAmountConstraint {
    fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
        let zero = dataset
            .rows()
            .iter()
            .filter(|row| row.amount.is_some_and(|amount| amount.is_zero()))
            .filter(|row| !self.is_exempt(row.transaction_kind.as_deref()))
            .count();

        ConstraintResult::from_count(zero, |n| format!("{n} transactions with zero amounts"))
    }

    fn name(&self) -> &str {
        "zero_amounts"
    }

    fn required_columns(&self) -> &[Column] {
        &[Column::Amount, Column::TransactionKind]
    }
}

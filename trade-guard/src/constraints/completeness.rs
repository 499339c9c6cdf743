//! Missing-value detection for critical columns.

use crate::core::{Column, Constraint, ConstraintResult, Dataset, ValidationContext};
use tracing::instrument;

/// Reports how many rows are missing a value for one column.
///
/// "Missing" covers both empty cells and numeric cells that could not be
/// parsed; [`CoercionConstraint`](super::CoercionConstraint) separates the
/// latter out.
///
/// ```rust
/// use trade_guard::constraints::CompletenessConstraint;
/// use trade_guard::core::{Column, Constraint};
///
/// let constraint = CompletenessConstraint::new(Column::Amount);
/// assert_eq!(constraint.name(), "completeness");
/// ```
#[derive(Debug, Clone)]
pub struct CompletenessConstraint {
    column: [Column; 1],
}

impl CompletenessConstraint {
    pub fn new(column: Column) -> Self {
        Self { column: [column] }
    }

    pub fn column(&self) -> Column {
        self.column[0]
    }
}

impl Constraint for CompletenessConstraint {
    #[instrument(skip(self, dataset, _ctx), fields(column = %self.column()))]
    fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
        let column = self.column();
        ConstraintResult::from_count(dataset.null_count(column), |n| {
            format!("{n} missing values in {column}")
        })
    }

    fn name(&self) -> &str {
        "completeness"
    }

    fn required_columns(&self) -> &[Column] {
        &self.column
    }

    fn description(&self) -> Option<&str> {
        Some("Critical columns should have a value on every row")
    }
}

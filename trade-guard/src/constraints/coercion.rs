//! Reporting of numeric cells that failed to parse.

use crate::core::{Column, Constraint, ConstraintResult, Dataset, ValidationContext};

/// Warns when numeric cells of one column were present but unparseable.
///
/// The loader keeps such cells as missing rather than zero and records the
/// raw text; this rule surfaces that record so a `--` or `1.2.3` in the
/// export does not vanish silently.
#[derive(Debug, Clone)]
pub struct CoercionConstraint {
    column: [Column; 1],
}

impl CoercionConstraint {
    pub fn new(column: Column) -> Self {
        Self { column: [column] }
    }
}

impl Constraint for CoercionConstraint {
    fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
        let column = self.column[0];
        let mut failures = dataset
            .coercion_failures()
            .iter()
            .filter(|failure| failure.column == column);

        let Some(first) = failures.next() else {
            return ConstraintResult::success_with_metric(0.0);
        };
        let count = 1 + failures.count();

        ConstraintResult::failure_with_metric(
            count as f64,
            format!(
                "{count} values in {column} could not be parsed as numbers (e.g. '{}' on line {})",
                first.raw, first.line
            ),
        )
    }

    fn name(&self) -> &str {
        "numeric_coercion"
    }

    fn required_columns(&self) -> &[Column] {
        &self.column
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constraints::test_support::{at, ctx};
    use crate::core::{CanonicalRow, CoercionFailure};

    #[test]
    fn test_reports_failures_for_its_column_only() {
        let dataset = Dataset::new(
            Column::ALL,
            vec![
                CanonicalRow::new(at(2024, 1, 1)),
                CanonicalRow::new(at(2024, 1, 2)),
            ],
        )
        .with_coercion_failures(vec![
            CoercionFailure {
                line: 2,
                column: Column::Amount,
                raw: "n/a".to_string(),
            },
            CoercionFailure {
                line: 3,
                column: Column::Quantity,
                raw: "ten".to_string(),
            },
            CoercionFailure {
                line: 3,
                column: Column::Amount,
                raw: "1.2.3".to_string(),
            },
        ]);

        let amount = CoercionConstraint::new(Column::Amount).evaluate(&dataset, &ctx());
        assert_eq!(
            amount.messages,
            vec!["2 values in Amount could not be parsed as numbers (e.g. 'n/a' on line 2)"]
        );

        let quantity = CoercionConstraint::new(Column::Quantity).evaluate(&dataset, &ctx());
        assert_eq!(quantity.metric, Some(1.0));
    }

    #[test]
    fn test_no_failures_passes() {
        let dataset = Dataset::new(Column::ALL, vec![CanonicalRow::new(at(2024, 1, 1))]);
        let result = CoercionConstraint::new(Column::Amount).evaluate(&dataset, &ctx());
        assert!(result.status.is_success());
    }
}

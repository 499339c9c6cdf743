//! Timestamp plausibility rules.

use crate::core::{Column, Constraint, ConstraintResult, Dataset, ValidationContext};

const TIMESTAMP: [Column; 1] = [Column::Timestamp];

/// Warns when the export spans more days than expected.
///
/// A very long span usually means two accounts' histories were concatenated
/// or a row carries a mistyped year.
#[derive(Debug, Clone)]
pub struct DateRangeConstraint {
    max_span_days: i64,
}

impl DateRangeConstraint {
    pub fn new(max_span_days: i64) -> Self {
        Self { max_span_days }
    }
}

impl Constraint for DateRangeConstraint {
    fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
        let Some((min, max)) = dataset.timestamp_bounds() else {
            return ConstraintResult::skipped("No data to validate");
        };

        let span = (max - min).num_days();
        if span > self.max_span_days {
            ConstraintResult::failure_with_metric(
                span as f64,
                format!(
                    "Large date range detected: {span} days ({} to {})",
                    min.date(),
                    max.date()
                ),
            )
        } else {
            ConstraintResult::success_with_metric(span as f64)
        }
    }

    fn name(&self) -> &str {
        "date_range"
    }

    fn required_columns(&self) -> &[Column] {
        &TIMESTAMP
    }
}

/// Warns about transactions dated after the run's reference time.
#[derive(Debug, Clone, Default)]
pub struct FutureDateConstraint;

impl FutureDateConstraint {
    pub fn new() -> Self {
        Self
    }
}

impl Constraint for FutureDateConstraint {
    fn evaluate(&self, dataset: &Dataset, ctx: &ValidationContext) -> ConstraintResult {
        let now = ctx.reference_time();
        let future = dataset
            .rows()
            .iter()
            .filter(|row| row.timestamp > now)
            .count();

        ConstraintResult::from_count(future, |n| format!("{n} transactions have future dates"))
    }

    fn name(&self) -> &str {
        "future_dates"
    }

    fn required_columns(&self) -> &[Column] {
        &TIMESTAMP
    }

    fn description(&self) -> Option<&str> {
        Some("Transactions must not be dated after the validation run")
    }
}

//! Constraint trait and related types for validation rules.

use super::{Column, Dataset, ValidationContext};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// The status of a constraint evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintStatus {
    /// Nothing to report
    Success,
    /// The rule found at least one problem
    Failure,
    /// The rule could not run (a required column is absent)
    Skipped,
}

impl ConstraintStatus {
    pub fn is_success(&self) -> bool {
        matches!(self, ConstraintStatus::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ConstraintStatus::Failure)
    }

    pub fn is_skipped(&self) -> bool {
        matches!(self, ConstraintStatus::Skipped)
    }
}

/// The result of evaluating a constraint.
///
/// A failed result carries one message per finding. Most rules report a
/// single message; grouped rules such as the fractional-quantity check report
/// one per offending symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintResult {
    pub status: ConstraintStatus,
    /// Optional metric computed during evaluation (usually an offending row count)
    pub metric: Option<f64>,
    /// Finding messages on failure, or the reason on skip
    pub messages: Vec<String>,
}

impl ConstraintResult {
    /// Creates a successful constraint result.
    pub fn success() -> Self {
        Self {
            status: ConstraintStatus::Success,
            metric: None,
            messages: Vec::new(),
        }
    }

    /// Creates a successful constraint result with a metric.
    pub fn success_with_metric(metric: f64) -> Self {
        Self {
            metric: Some(metric),
            ..Self::success()
        }
    }

    /// Creates a failed constraint result.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            status: ConstraintStatus::Failure,
            metric: None,
            messages: vec![message.into()],
        }
    }

    /// Creates a failed constraint result with a metric.
    pub fn failure_with_metric(metric: f64, message: impl Into<String>) -> Self {
        Self {
            metric: Some(metric),
            ..Self::failure(message)
        }
    }

    /// Creates a result from a list of messages: success when the list is
    /// empty, failure otherwise.
    pub fn from_messages(messages: Vec<String>) -> Self {
        if messages.is_empty() {
            Self::success()
        } else {
            Self {
                status: ConstraintStatus::Failure,
                metric: Some(messages.len() as f64),
                messages,
            }
        }
    }

    /// Creates a skipped constraint result.
    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: ConstraintStatus::Skipped,
            metric: None,
            messages: vec![reason.into()],
        }
    }

    /// Converts an offending-row count into a result: success for zero,
    /// failure with `message` otherwise.
    pub fn from_count(count: usize, message: impl FnOnce(usize) -> String) -> Self {
        if count == 0 {
            Self::success_with_metric(0.0)
        } else {
            Self::failure_with_metric(count as f64, message(count))
        }
    }
}

/// A read-only rule evaluated against a [`Dataset`].
///
/// Implementations must not depend on anything but the dataset and the
/// context, so a rule can be reused across runs and threads.
///
/// ```rust
/// use trade_guard::core::{Column, Constraint, ConstraintResult, Dataset, ValidationContext};
///
/// #[derive(Debug)]
/// struct NonEmpty;
///
/// impl Constraint for NonEmpty {
///     fn evaluate(&self, dataset: &Dataset, _ctx: &ValidationContext) -> ConstraintResult {
///         if dataset.is_empty() {
///             ConstraintResult::failure("export contains no transactions")
///         } else {
///             ConstraintResult::success()
///         }
///     }
///
///     fn name(&self) -> &str {
///         "non_empty"
///     }
/// }
/// ```
pub trait Constraint: Debug + Send + Sync {
    /// Evaluates the rule. Called only when every required column is present.
    fn evaluate(&self, dataset: &Dataset, ctx: &ValidationContext) -> ConstraintResult;

    /// Returns the name of the constraint.
    fn name(&self) -> &str;

    /// Columns that must be present in the source header for the rule to run.
    fn required_columns(&self) -> &[Column] {
        &[]
    }

    /// Returns a description of what this constraint validates.
    fn description(&self) -> Option<&str> {
        None
    }
}

/// A boxed constraint for use in collections.
pub type BoxedConstraint = Box<dyn Constraint>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_result_builders() {
        let success = ConstraintResult::success();
        assert!(success.status.is_success());
        assert!(success.metric.is_none());
        assert!(success.messages.is_empty());

        let failure = ConstraintResult::failure_with_metric(3.0, "3 bad rows");
        assert!(failure.status.is_failure());
        assert_eq!(failure.metric, Some(3.0));
        assert_eq!(failure.messages, vec!["3 bad rows".to_string()]);

        let skipped = ConstraintResult::skipped("column 'Symbol' absent");
        assert!(skipped.status.is_skipped());
    }

    #[test]
    fn test_from_count() {
        let ok = ConstraintResult::from_count(0, |n| format!("{n} bad"));
        assert!(ok.status.is_success());
        assert_eq!(ok.metric, Some(0.0));

        let bad = ConstraintResult::from_count(2, |n| format!("{n} bad"));
        assert!(bad.status.is_failure());
        assert_eq!(bad.messages, vec!["2 bad".to_string()]);
    }

    #[test]
    fn test_from_messages() {
        assert!(ConstraintResult::from_messages(Vec::new())
            .status
            .is_success());

        let result = ConstraintResult::from_messages(vec!["a".into(), "b".into()]);
        assert!(result.status.is_failure());
        assert_eq!(result.metric, Some(2.0));
        assert_eq!(result.messages.len(), 2);
    }
}

//! Check type and builder for grouping constraints.
//!
//! A [`Check`] is a named, ordered group of constraints sharing one severity
//! level. The engine runs two of them: [`Check::quality`] over individual
//! rows and [`Check::consistency`] across rows of the same symbol.
//!
//! ```rust
//! use trade_guard::core::{Check, Level};
//! use trade_guard::constraints::FutureDateConstraint;
//!
//! let check = Check::builder("dates")
//!     .level(Level::Warning)
//!     .description("Transactions must not be dated after the run")
//!     .constraint(FutureDateConstraint::new())
//!     .build();
//!
//! assert_eq!(check.constraints().len(), 1);
//! ```

use super::{
    constraint::BoxedConstraint, Constraint, ConstraintResult, Dataset, Finding, Level,
    ValidationContext, ValidatorConfig,
};
use crate::constraints::{
    CoercionConstraint, CompletenessConstraint, DateRangeConstraint, ExtremeAmountConstraint,
    FractionalQuantityConstraint, FutureDateConstraint, SymbolFormatConstraint,
    ZeroAmountConstraint,
};
use crate::core::Column;
use crate::prelude::*;
use tracing::{debug, instrument};

/// A validation check containing one or more constraints.
///
/// Constraints run in insertion order and each one runs unconditionally;
/// a constraint whose required columns are absent is skipped, never failed.
#[derive(Debug)]
pub struct Check {
    name: String,
    level: Level,
    description: Option<String>,
    constraints: Vec<BoxedConstraint>,
}

impl Check {
    /// Creates a new builder for constructing a check.
    pub fn builder(name: impl Into<String>) -> CheckBuilder {
        CheckBuilder::new(name)
    }

    /// The row-level data-quality rules, in reporting order.
    pub fn quality(config: &ValidatorConfig) -> Result<Self> {
        Ok(Self::builder("data_quality")
            .level(Level::Warning)
            .description("Row-level data-quality rules")
            .constraint(CompletenessConstraint::new(Column::Timestamp))
            .constraint(CompletenessConstraint::new(Column::Amount))
            .constraint(CompletenessConstraint::new(Column::Symbol))
            .constraint(DateRangeConstraint::new(config.max_date_span_days))
            .constraint(FutureDateConstraint::new())
            .constraint(ExtremeAmountConstraint::new(config.extreme_amount))
            .constraint(ZeroAmountConstraint::new(
                config.zero_amount_exempt_kinds.iter().cloned(),
            ))
            .constraint(SymbolFormatConstraint::new(
                config.symbol_regex()?,
                config.max_symbol_examples,
            ))
            .constraint(CoercionConstraint::new(Column::Amount))
            .constraint(CoercionConstraint::new(Column::Quantity))
            .build())
    }

    /// The cross-row consistency rules.
    pub fn consistency(config: &ValidatorConfig) -> Self {
        Self::builder("transaction_consistency")
            .level(Level::Warning)
            .description("Per-symbol consistency rules")
            .constraint(FractionalQuantityConstraint::new(
                config.currency_pair_suffixes.iter().cloned(),
            ))
            .build()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn constraints(&self) -> &[BoxedConstraint] {
        &self.constraints
    }

    /// Evaluates one constraint, skipping it when its columns are absent.
    pub fn evaluate_constraint(
        constraint: &dyn Constraint,
        dataset: &Dataset,
        ctx: &ValidationContext,
    ) -> ConstraintResult {
        let missing: Vec<&str> = constraint
            .required_columns()
            .iter()
            .filter(|column| !dataset.has_column(**column))
            .map(|column| column.header())
            .collect();

        if missing.is_empty() {
            constraint.evaluate(dataset, ctx)
        } else {
            ConstraintResult::skipped(format!("missing column(s): {}", missing.join(", ")))
        }
    }

    /// Runs every constraint and returns the findings in constraint order.
    #[instrument(skip(self, dataset, ctx), fields(check = %self.name, rows = dataset.len()))]
    pub fn run(&self, dataset: &Dataset, ctx: &ValidationContext) -> Vec<Finding> {
        let mut findings = Vec::new();

        for constraint in &self.constraints {
            let result = Self::evaluate_constraint(constraint.as_ref(), dataset, ctx);
            debug!(
                constraint = constraint.name(),
                status = ?result.status,
                metric = ?result.metric,
                "Constraint evaluated"
            );

            if result.status.is_failure() {
                findings.extend(result.messages.into_iter().map(|message| Finding {
                    level: self.level,
                    check: constraint.name().to_string(),
                    message,
                }));
            }
        }

        findings
    }
}

/// Builder for constructing [`Check`] instances.
#[derive(Debug)]
pub struct CheckBuilder {
    name: String,
    level: Level,
    description: Option<String>,
    constraints: Vec<BoxedConstraint>,
}

impl CheckBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            level: Level::default(),
            description: None,
            constraints: Vec::new(),
        }
    }

    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a constraint; constraints run in the order they are added.
    pub fn constraint(mut self, constraint: impl Constraint + 'static) -> Self {
        self.constraints.push(Box::new(constraint));
        self
    }

    pub fn build(self) -> Check {
        Check {
            name: self.name,
            level: self.level,
            description: self.description,
            constraints: self.constraints,
        }
    }
}

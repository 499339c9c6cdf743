//! Core validation types.
//!
//! ## Overview
//!
//! - **[`Validator`]**: runs the whole pipeline over one export file
//! - **[`Check`]**: a named, ordered group of constraints with a severity level
//! - **[`Constraint`]**: one rule (implemented in the `constraints` module)
//! - **[`Dataset`]**: the canonical rows every constraint reads
//! - **[`ValidationReport`]**: the outcome, consumed by the formatters
//!
//! ## Architecture
//!
//! ```text
//! Validator
//!     ├── sniff_file ──► SchemaVariant
//!     ├── canonicalize ──► Dataset
//!     ├── Check "data_quality" (Level: Warning)
//!     │   ├── CompletenessConstraint × 3
//!     │   ├── DateRangeConstraint, FutureDateConstraint
//!     │   ├── ExtremeAmountConstraint, ZeroAmountConstraint
//!     │   ├── SymbolFormatConstraint
//!     │   └── CoercionConstraint × 2
//!     ├── Check "transaction_consistency" (Level: Warning)
//!     │   └── FractionalQuantityConstraint
//!     └── SummaryAggregator ──► SummaryStats
//! ```
//!
//! Only a failure before the checks run (unreadable file, unknown layout,
//! load error) produces an error finding; checks only ever warn.

mod check;
mod constraint;
mod context;
mod dataset;
mod level;
mod result;
mod validator;

pub use check::{Check, CheckBuilder};
pub use constraint::{BoxedConstraint, Constraint, ConstraintResult, ConstraintStatus};
pub use context::{ValidationContext, ValidatorConfig};
pub use dataset::{CanonicalRow, CoercionFailure, Column, Dataset, DEFAULT_CURRENCY};
pub use level::Level;
pub use result::{DateRange, Finding, SummaryStats, ValidationReport};
pub use validator::{Validator, ValidatorBuilder, FORMAT_STAGE, LOAD_STAGE};

//! # trade-guard - validation for brokerage transaction exports
//!
//! trade-guard checks a Tastyworks transaction-history CSV before it is fed
//! to anything that computes with it. It recognizes both the current and the
//! legacy export layout, loads either into one canonical row shape, runs a
//! fixed set of data-quality and consistency rules, and summarizes the data.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use trade_guard::prelude::*;
//!
//! # fn example() -> Result<()> {
//! let validator = Validator::builder()
//!     .config(ValidatorConfig::default().with_max_date_span_days(3650))
//!     .build()?;
//!
//! let report = validator.validate("transactions.csv");
//! print!("{}", report.to_human()?);
//! if !report.passed() {
//!     std::process::exit(1);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Pipeline
//!
//! 1. [`sources::sniff_file`] classifies the header line as
//!    [`SchemaVariant::New`](sources::SchemaVariant) or `Legacy`.
//! 2. [`sources::canonicalize`] loads the rows into a [`core::Dataset`]; New
//!    files first pass through a [`sources::RowTransformer`].
//! 3. The quality and consistency [`core::Check`]s produce warnings.
//! 4. [`analyzers::SummaryAggregator`] computes [`core::SummaryStats`].
//!
//! A failure in steps 1 or 2 ends the run with a single error finding and
//! `passed = false`. Warnings never fail a run.
//!
//! ## Logging
//!
//! All pipeline stages emit `tracing` events. Install a subscriber with
//! [`logging::setup::init_logging`] or bring your own.

pub mod analyzers;
pub mod constraints;
pub mod core;
pub mod error;
pub mod formatters;
pub mod logging;
pub mod prelude;
pub mod sources;

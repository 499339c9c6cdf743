//! Descriptive analysis of loaded datasets.
//!
//! Analyzers never fail: a column the export does not carry simply yields a
//! zero or empty statistic.

mod summary;

pub use summary::SummaryAggregator;

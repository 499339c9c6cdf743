//! Prelude for commonly used types and traits in trade-guard.

pub use crate::core::{ValidationContext, ValidationReport, Validator, ValidatorConfig};
pub use crate::error::{GuardError, Result};
pub use crate::formatters::{FormatterConfig, ResultFormatter};
pub use crate::logging::LogConfig;

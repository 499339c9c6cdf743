//! Validation constraints for transaction exports.
//!
//! Every constraint implements [`Constraint`](crate::core::Constraint) and is
//! read-only over the [`Dataset`](crate::core::Dataset). The row-level rules
//! make up [`Check::quality`](crate::core::Check::quality); the grouped rule
//! makes up [`Check::consistency`](crate::core::Check::consistency).
//!
//! | Constraint | Finding |
//! |---|---|
//! | [`CompletenessConstraint`] | `N missing values in <column>` |
//! | [`DateRangeConstraint`] | `Large date range detected: ...` |
//! | [`FutureDateConstraint`] | `N transactions have future dates` |
//! | [`ExtremeAmountConstraint`] | `N transactions with amounts > <limit>` |
//! | [`ZeroAmountConstraint`] | `N transactions with zero amounts` |
//! | [`SymbolFormatConstraint`] | `Unusual symbol formats detected: ...` |
//! | [`CoercionConstraint`] | `N values in <column> could not be parsed as numbers` |
//! | [`FractionalQuantityConstraint`] | `Fractional quantities found for <symbol>: N transactions` |

mod amounts;
mod coercion;
mod completeness;
mod consistency;
mod pattern;
mod temporal;

pub use amounts::{ExtremeAmountConstraint, ZeroAmountConstraint};
pub use coercion::CoercionConstraint;
pub use completeness::CompletenessConstraint;
pub use consistency::FractionalQuantityConstraint;
pub use pattern::SymbolFormatConstraint;
pub use temporal::{DateRangeConstraint, FutureDateConstraint};

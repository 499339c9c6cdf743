//! Finding severity levels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity of a [`Finding`](super::Finding).
///
/// - **Error**: the run could not complete (unreadable file, unknown header
///   layout, load failure). Any error flips the report to failed.
/// - **Warning**: an advisory data-quality or consistency finding. Warnings
///   are always reported in full and never affect the outcome.
///
/// Levels are ordered by severity: Error > Warning.
///
/// ```rust
/// use trade_guard::core::Level;
///
/// assert!(Level::Error > Level::Warning);
/// assert!(Level::Error.is_at_least(Level::Warning));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    /// Advisory finding
    #[default]
    Warning = 1,
    /// Pipeline-fatal finding
    Error = 2,
}

impl Level {
    /// Returns the string representation of the level.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }

    /// Checks if this level is at least as severe as another level.
    pub fn is_at_least(&self, other: Level) -> bool {
        *self >= other
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_ordering() {
        assert!(Level::Error > Level::Warning);
        assert!(Level::Warning.is_at_least(Level::Warning));
        assert!(!Level::Warning.is_at_least(Level::Error));
    }

    #[test]
    fn test_level_display() {
        assert_eq!(Level::Warning.to_string(), "warning");
        assert_eq!(Level::Error.to_string(), "error");
    }

    #[test]
    fn test_level_serde() {
        let json = serde_json::to_string(&Level::Error).unwrap();
        assert_eq!(json, "\"error\"");

        let level: Level = serde_json::from_str("\"warning\"").unwrap();
        assert_eq!(level, Level::Warning);
    }
}

//! Input sources: schema sniffing and loading of export files.
//!
//! Loading happens in two steps. [`sniff_file`] reads only the first line and
//! resolves the [`SchemaVariant`] once; [`canonicalize`] then loads the whole
//! file into a [`Dataset`](crate::core::Dataset), delegating New-variant
//! files to a [`RowTransformer`] first.

use crate::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use tracing::{debug, instrument};

mod csv;
mod transform;

pub use self::csv::{canonicalize, parse_legacy, parse_timestamp};
pub use transform::{NewFormatTransformer, RowTransformer};

/// Header tokens identifying the current export layout.
///
/// `Symbol` is shared by both layouts and is deliberately not a token.
pub const NEW_FORMAT_TOKENS: [&str; 5] = ["Date", "Type", "Sub Type", "Action", "Value"];

/// Header tokens identifying the legacy export layout.
pub const LEGACY_FORMAT_TOKENS: [&str; 4] = [
    "Date/Time",
    "Transaction Code",
    "Transaction Subcode",
    "Amount",
];

/// The two recognized export layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchemaVariant {
    /// Current layout (`Date,Type,Sub Type,Action,Symbol,...,Value,...`)
    New,
    /// Legacy layout (`Date/Time,Transaction Code,Transaction Subcode,...,Amount,...`)
    Legacy,
}

impl SchemaVariant {
    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaVariant::New => "new",
            SchemaVariant::Legacy => "legacy",
        }
    }

    /// The header tokens that identify this variant.
    pub fn tokens(&self) -> &'static [&'static str] {
        match self {
            SchemaVariant::New => &NEW_FORMAT_TOKENS,
            SchemaVariant::Legacy => &LEGACY_FORMAT_TOKENS,
        }
    }

    fn matches(&self, fields: &[&str]) -> bool {
        self.tokens().iter().any(|token| fields.contains(token))
    }
}

impl fmt::Display for SchemaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Splits a header line into trimmed, unquoted field names.
fn header_fields(line: &str) -> Vec<&str> {
    line.trim_start_matches('\u{feff}')
        .trim_end_matches(['\r', '\n'])
        .split(',')
        .map(|field| field.trim().trim_matches('"').trim())
        .collect()
}

/// Classifies the first line of an export.
///
/// New-variant tokens are checked first, so a line carrying tokens of both
/// variants is classified as [`SchemaVariant::New`].
///
/// ```rust
/// use trade_guard::sources::{detect, SchemaVariant};
///
/// let line = "Date/Time,Transaction Code,Transaction Subcode,Symbol,Amount";
/// assert_eq!(detect(line).unwrap(), SchemaVariant::Legacy);
/// assert!(detect("foo,bar").is_err());
/// ```
pub fn detect(first_line: &str) -> Result<SchemaVariant> {
    let fields = header_fields(first_line);

    [SchemaVariant::New, SchemaVariant::Legacy]
        .into_iter()
        .find(|variant| variant.matches(&fields))
        .ok_or(GuardError::UnrecognizedFormat)
}

/// Reads the first line of `path` and classifies it.
#[instrument]
pub fn sniff_file(path: &Path) -> Result<SchemaVariant> {
    let file = File::open(path).map_err(|e| GuardError::unreadable(path, e))?;
    let mut first_line = String::new();
    BufReader::new(file)
        .read_line(&mut first_line)
        .map_err(|e| GuardError::unreadable(path, e))?;

    let variant = detect(&first_line)?;
    debug!(%variant, "Detected export layout");
    Ok(variant)
}

/// Expands glob patterns into the list of matching files, in pattern order.
///
/// A pattern without glob metacharacters is kept as-is even when the file
/// does not exist, so the missing file is reported by its own validation run.
pub fn expand_globs(patterns: &[String]) -> Result<Vec<String>> {
    let mut paths = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            paths.push(pattern.clone());
            continue;
        }

        let matches = glob::glob(pattern).map_err(|e| {
            GuardError::Configuration(format!("Invalid glob pattern '{pattern}': {e}"))
        })?;

        let mut matched = Vec::new();
        for entry in matches {
            let path = entry.map_err(|e| GuardError::Io(e.into_error()))?;
            if path.is_file() {
                matched.push(path.to_string_lossy().into_owned());
            }
        }
        if matched.is_empty() {
            return Err(GuardError::Configuration(format!(
                "No files found matching glob pattern '{pattern}'"
            )));
        }
        paths.extend(matched);
    }

    Ok(paths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const NEW_HEADER: &str = "Date,Type,Sub Type,Action,Symbol,Instrument Type,Description,Value,Quantity,Average Price,Commissions,Fees,Multiplier,Root Symbol,Underlying Symbol,Expiration Date,Strike Price,Call or Put,Order #,Currency";
    const LEGACY_HEADER: &str = "Date/Time,Transaction Code,Transaction Subcode,Symbol,Buy/Sell,Open/Close,Quantity,Expiration Date,Strike,Call/Put,Price,Fees,Amount,Description,Account Reference";

    #[test]
    fn test_detects_real_headers() {
        assert_eq!(detect(NEW_HEADER).unwrap(), SchemaVariant::New);
        assert_eq!(detect(LEGACY_HEADER).unwrap(), SchemaVariant::Legacy);
    }

    #[test]
    fn test_legacy_date_time_is_not_new_date() {
        assert_eq!(
            detect("Date/Time,Symbol,Quantity").unwrap(),
            SchemaVariant::Legacy
        );
    }

    #[test]
    fn test_new_wins_a_tie() {
        assert_eq!(detect("Date,Amount").unwrap(), SchemaVariant::New);
    }

    #[test]
    fn test_handles_bom_quotes_and_crlf() {
        let line = "\u{feff}\"Date/Time\",\"Transaction Code\",\"Amount\"\r\n";
        assert_eq!(detect(line).unwrap(), SchemaVariant::Legacy);
    }

    #[test]
    fn test_rejects_unknown_and_symbol_only_headers() {
        assert!(matches!(
            detect("id,name,email"),
            Err(GuardError::UnrecognizedFormat)
        ));
        assert!(matches!(
            detect("Symbol,Quantity"),
            Err(GuardError::UnrecognizedFormat)
        ));
        assert!(matches!(detect(""), Err(GuardError::UnrecognizedFormat)));
    }

    #[test]
    fn test_sniff_reads_first_line_only() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{LEGACY_HEADER}").unwrap();
        writeln!(file, "not,a,valid,row,\"unterminated").unwrap();

        assert_eq!(sniff_file(file.path()).unwrap(), SchemaVariant::Legacy);
    }

    #[test]
    fn test_sniff_missing_file() {
        let err = sniff_file(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert!(matches!(err, GuardError::UnreadableFile { .. }));
    }

    #[test]
    fn test_expand_globs() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.csv", "a.csv", "notes.txt"] {
            std::fs::write(dir.path().join(name), LEGACY_HEADER).unwrap();
        }

        let pattern = format!("{}/*.csv", dir.path().display());
        let paths = expand_globs(&[pattern, "literal.csv".to_string()]).unwrap();
        assert_eq!(paths.len(), 3);
        assert!(paths[0].ends_with("a.csv"));
        assert!(paths[1].ends_with("b.csv"));
        assert_eq!(paths[2], "literal.csv");

        let empty = format!("{}/*.xlsx", dir.path().display());
        assert!(expand_globs(&[empty]).is_err());
    }
}

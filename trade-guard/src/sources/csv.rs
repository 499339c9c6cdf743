//! Legacy-layout CSV loading into the canonical [`Dataset`].

use super::{RowTransformer, SchemaVariant};
use crate::core::{CanonicalRow, CoercionFailure, Column, Dataset};
use crate::prelude::*;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, instrument};

/// Date-time layouts accepted for `Date/Time`, tried in order.
const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %I:%M %p",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date-only layouts, interpreted as midnight.
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Parses an export timestamp.
///
/// Values carrying a UTC offset keep the wall-clock time written in the
/// file; the offset itself is dropped.
///
/// ```rust
/// use trade_guard::sources::parse_timestamp;
///
/// let ts = parse_timestamp("2024-01-15T15:30:00+0200").unwrap();
/// assert_eq!(ts.to_string(), "2024-01-15 15:30:00");
/// assert!(parse_timestamp("next tuesday").is_none());
/// ```
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.naive_local());
    }
    if let Ok(ts) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(ts.naive_local());
    }
    if let Some(ts) = DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    {
        return Some(ts);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

fn parse_decimal(value: &str) -> Option<Decimal> {
    Decimal::from_str(value)
        .or_else(|_| Decimal::from_scientific(value))
        .ok()
}

/// Column positions resolved from the header row.
struct HeaderMap {
    positions: Vec<(Column, usize)>,
    width: usize,
}

impl HeaderMap {
    fn new(headers: &::csv::StringRecord) -> Result<Self> {
        let positions: Vec<(Column, usize)> = Column::ALL
            .into_iter()
            .filter_map(|column| {
                headers
                    .iter()
                    .position(|h| h.trim_start_matches('\u{feff}') == column.header())
                    .map(|idx| (column, idx))
            })
            .collect();

        if !positions.iter().any(|(c, _)| *c == Column::Timestamp) {
            return Err(GuardError::MissingColumn {
                column: Column::Timestamp.header().to_string(),
            });
        }

        Ok(Self {
            positions,
            width: headers.len(),
        })
    }

    fn columns(&self) -> impl Iterator<Item = Column> + '_ {
        self.positions.iter().map(|(c, _)| *c)
    }

    fn cell<'r>(&self, record: &'r ::csv::StringRecord, column: Column) -> Option<&'r str> {
        self.positions
            .iter()
            .find(|(c, _)| *c == column)
            .and_then(|(_, idx)| record.get(*idx))
            .filter(|value| !value.is_empty())
    }
}

/// Parses Legacy-layout CSV text into a [`Dataset`].
///
/// The `Date/Time` column is mandatory and every row must carry a parseable
/// timestamp; anything else fails the whole load. Numeric cells that cannot
/// be parsed become missing and are recorded as coercion failures.
pub fn parse_legacy<R: Read>(reader: R, default_currency: &str) -> Result<Dataset> {
    let mut reader = ::csv::ReaderBuilder::new()
        .flexible(true)
        .trim(::csv::Trim::All)
        .from_reader(reader);

    let headers = HeaderMap::new(reader.headers()?)?;
    let mut rows = Vec::new();
    let mut coercion_failures = Vec::new();

    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let line = record
            .position()
            .map(|p| p.line() as usize)
            .unwrap_or(idx + 2);

        if record.len() > headers.width {
            return Err(GuardError::Csv(::csv::Error::from(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!(
                    "line {line}: expected {} fields, found {}",
                    headers.width,
                    record.len()
                ),
            ))));
        }

        let raw_timestamp = headers.cell(&record, Column::Timestamp).unwrap_or("");
        let timestamp =
            parse_timestamp(raw_timestamp).ok_or_else(|| GuardError::InvalidTimestamp {
                line,
                value: raw_timestamp.to_string(),
            })?;

        let text = |column: Column| headers.cell(&record, column).map(str::to_string);
        let mut number = |column: Column| {
            let raw = headers.cell(&record, column)?;
            let parsed = parse_decimal(raw);
            if parsed.is_none() {
                coercion_failures.push(CoercionFailure {
                    line,
                    column,
                    raw: raw.to_string(),
                });
            }
            parsed
        };

        let amount = number(Column::Amount);
        let quantity = number(Column::Quantity);
        rows.push(CanonicalRow {
            timestamp,
            transaction_kind: text(Column::TransactionKind),
            transaction_sub_kind: text(Column::TransactionSubKind),
            symbol: text(Column::Symbol),
            amount,
            quantity,
            currency: text(Column::Currency).unwrap_or_else(|| default_currency.to_string()),
        });
    }

    debug!(
        rows = rows.len(),
        coercion_failures = coercion_failures.len(),
        "Parsed legacy CSV"
    );
    Ok(Dataset::new(headers.columns(), rows).with_coercion_failures(coercion_failures))
}

/// Loads an export of the given variant into a [`Dataset`].
///
/// Legacy files are parsed directly. New files are first reshaped by
/// `transformer` into Legacy-layout text, which is then parsed the same way.
#[instrument(skip(transformer), fields(variant = %variant))]
pub fn canonicalize(
    path: &Path,
    variant: SchemaVariant,
    transformer: &dyn RowTransformer,
    default_currency: &str,
) -> Result<Dataset> {
    let dataset = match variant {
        SchemaVariant::Legacy => {
            let file = File::open(path).map_err(|e| GuardError::unreadable(path, e))?;
            parse_legacy(file, default_currency)?
        }
        SchemaVariant::New => {
            let transformed = transformer.transform(path)?;
            parse_legacy(transformed.as_bytes(), default_currency)?
        }
    };

    info!(rows = dataset.len(), "Data loaded");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Date/Time,Transaction Code,Transaction Subcode,Symbol,Buy/Sell,Open/Close,Quantity,Expiration Date,Strike,Call/Put,Price,Fees,Amount,Description,Account Reference";

    fn load(body: &str) -> Result<Dataset> {
        parse_legacy(format!("{HEADER}\n{body}").as_bytes(), "USD")
    }

    #[test]
    fn test_timestamp_layouts() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 15)
            .unwrap()
            .and_hms_opt(22, 30, 0)
            .unwrap();
        for value in [
            "2021-03-15 22:30:00",
            "2021-03-15T22:30:00",
            "2021-03-15 22:30",
            "03/15/2021 10:30 PM",
            "03/15/2021 22:30",
            "2021-03-15T22:30:00-0400",
            "2021-03-15T22:30:00+00:00",
        ] {
            assert_eq!(parse_timestamp(value), Some(expected), "{value}");
        }
        assert_eq!(
            parse_timestamp("2021-03-15").map(|ts| ts.date()),
            NaiveDate::from_ymd_opt(2021, 3, 15)
        );
        assert_eq!(parse_timestamp("  "), None);
    }

    #[test]
    fn test_loads_rows_in_file_order() {
        let dataset = load(
            "03/01/2024 10:00 AM,Trade,Buy to Open,AAPL,Buy,Open,10,,,,150.00,1.00,-1500.00,Bought AAPL,ACC1\n\
             02/01/2024 09:00 AM,Money Movement,Deposit,,,,,,,,,0.00,1000.00,Deposit,ACC1\n",
        )
        .unwrap();

        assert_eq!(dataset.len(), 2);
        let first = &dataset.rows()[0];
        assert_eq!(first.transaction_kind.as_deref(), Some("Trade"));
        assert_eq!(first.transaction_sub_kind.as_deref(), Some("Buy to Open"));
        assert_eq!(first.symbol.as_deref(), Some("AAPL"));
        assert_eq!(first.amount, Some(Decimal::new(-150000, 2)));
        assert_eq!(first.quantity, Some(Decimal::new(10, 0)));
        assert_eq!(first.currency, "USD");

        let second = &dataset.rows()[1];
        assert_eq!(second.symbol, None);
        assert_eq!(second.quantity, None);
        assert!(dataset.coercion_failures().is_empty());
        assert!(dataset.has_columns(&[Column::Symbol, Column::Quantity, Column::Amount]));
        assert!(!dataset.has_column(Column::Currency));
    }

    #[test]
    fn test_unparseable_numbers_are_missing_and_recorded() {
        let dataset = load("2024-01-02 10:00,Trade,Sell to Close,SPY,Sell,Close,ten,,,,,,--,x,ACC1\n")
            .unwrap();

        let row = &dataset.rows()[0];
        assert_eq!(row.amount, None);
        assert_eq!(row.quantity, None);
        let failures = dataset.coercion_failures();
        assert_eq!(failures.len(), 2);
        assert_eq!(failures[0].column, Column::Amount);
        assert_eq!(failures[0].raw, "--");
        assert_eq!(failures[0].line, 2);
        assert_eq!(failures[1].column, Column::Quantity);
    }

    #[test]
    fn test_bad_timestamp_fails_the_load() {
        let err = load(
            "2024-01-02 10:00,Trade,,SPY,,,1,,,,,,1.00,,\n\
             soon,Trade,,SPY,,,1,,,,,,1.00,,\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            GuardError::InvalidTimestamp { line: 3, ref value } if value == "soon"
        ));
    }

    #[test]
    fn test_empty_timestamp_fails_the_load() {
        let err = load(",Trade,,SPY,,,1,,,,,,1.00,,\n").unwrap_err();
        assert!(matches!(err, GuardError::InvalidTimestamp { line: 2, .. }));
    }

    #[test]
    fn test_missing_timestamp_column() {
        let err = parse_legacy("Transaction Code,Amount\nTrade,1.00\n".as_bytes(), "USD")
            .unwrap_err();
        assert!(matches!(err, GuardError::MissingColumn { .. }));
    }

    #[test]
    fn test_too_many_fields_is_a_load_error() {
        let err = parse_legacy(
            "Date/Time,Amount\n2024-01-01,1.00,extra\n".as_bytes(),
            "USD",
        )
        .unwrap_err();
        assert!(matches!(err, GuardError::Csv(_)));
    }

    #[test]
    fn test_currency_column_overrides_default() {
        let dataset = parse_legacy(
            "Date/Time,Amount,Currency\n2024-01-01,1.00,EUR\n2024-01-02,2.00,\n".as_bytes(),
            "USD",
        )
        .unwrap();
        assert_eq!(dataset.rows()[0].currency, "EUR");
        assert_eq!(dataset.rows()[1].currency, "USD");
    }

    #[test]
    fn test_scientific_amounts_parse() {
        let dataset =
            parse_legacy("Date/Time,Amount\n2024-01-01,1.5e3\n".as_bytes(), "USD").unwrap();
        assert_eq!(dataset.rows()[0].amount, Some(Decimal::new(1500, 0)));
    }
}

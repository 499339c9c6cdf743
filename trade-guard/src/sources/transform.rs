//! Reshaping of New-layout exports into the Legacy layout.

use super::parse_timestamp;
use crate::prelude::*;
use rust_decimal::Decimal;
use std::fmt::Debug;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, instrument};

/// Converts a New-layout export into Legacy-layout CSV text.
///
/// The loader only relies on the output using Legacy header names; how a
/// transformer gets there is its own business. Any failure is reported as
/// [`GuardError::Transform`].
pub trait RowTransformer: Debug + Send + Sync {
    fn transform(&self, path: &Path) -> Result<String>;
}

/// Header written by [`NewFormatTransformer`].
pub const LEGACY_HEADER: [&str; 16] = [
    "Date/Time",
    "Transaction Code",
    "Transaction Subcode",
    "Symbol",
    "Buy/Sell",
    "Open/Close",
    "Quantity",
    "Expiration Date",
    "Strike",
    "Call/Put",
    "Price",
    "Fees",
    "Amount",
    "Description",
    "Account Reference",
    "Currency",
];

const REQUIRED_NEW_COLUMNS: [&str; 3] = ["Date", "Type", "Value"];

/// Built-in transformer for the current Tastyworks export layout.
///
/// ```text
/// Date,Type,Sub Type,Action,Symbol,Instrument Type,Description,Value,Quantity,
/// Average Price,Commissions,Fees,Multiplier,Root Symbol,Underlying Symbol,
/// Expiration Date,Strike Price,Call or Put,Order #,Currency
/// ```
///
/// Cells that cannot be normalized (an unparseable date or number) are passed
/// through unchanged so the loader reports them the same way it would for a
/// Legacy file.
#[derive(Debug, Clone, Default)]
pub struct NewFormatTransformer;

impl NewFormatTransformer {
    pub fn new() -> Self {
        Self
    }

    /// Transforms New-layout CSV text held in memory.
    pub fn transform_reader<R: std::io::Read>(&self, reader: R) -> Result<String> {
        let mut reader = ::csv::ReaderBuilder::new()
            .flexible(true)
            .trim(::csv::Trim::All)
            .from_reader(reader);

        let headers = reader
            .headers()
            .map_err(|e| GuardError::transform_with_source("cannot read header", Box::new(e)))?
            .clone();
        let position = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim_start_matches('\u{feff}') == name)
        };

        let missing: Vec<&str> = REQUIRED_NEW_COLUMNS
            .into_iter()
            .filter(|name| position(*name).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(GuardError::transform(format!(
                "missing column(s): {}",
                missing.join(", ")
            )));
        }

        let columns = NewColumns {
            date: position("Date"),
            kind: position("Type"),
            sub_type: position("Sub Type"),
            action: position("Action"),
            symbol: position("Symbol"),
            underlying: position("Underlying Symbol"),
            description: position("Description"),
            value: position("Value"),
            quantity: position("Quantity"),
            average_price: position("Average Price"),
            commissions: position("Commissions"),
            fees: position("Fees"),
            expiration: position("Expiration Date"),
            strike: position("Strike Price"),
            call_put: position("Call or Put"),
            currency: position("Currency"),
        };

        let mut writer = ::csv::Writer::from_writer(Vec::new());
        writer
            .write_record(LEGACY_HEADER)
            .map_err(|e| GuardError::transform_with_source("cannot write header", Box::new(e)))?;

        let mut rows = 0usize;
        for record in reader.records() {
            let record = record
                .map_err(|e| GuardError::transform_with_source("malformed record", Box::new(e)))?;
            writer
                .write_record(columns.to_legacy(&record))
                .map_err(|e| GuardError::transform_with_source("cannot write row", Box::new(e)))?;
            rows += 1;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| GuardError::transform(format!("cannot flush output: {e}")))?;
        debug!(rows, "Transformed export to legacy layout");
        String::from_utf8(bytes)
            .map_err(|e| GuardError::transform_with_source("output is not UTF-8", Box::new(e)))
    }
}

impl RowTransformer for NewFormatTransformer {
    #[instrument(skip(self))]
    fn transform(&self, path: &Path) -> Result<String> {
        let file = File::open(path).map_err(|e| {
            GuardError::transform_with_source(
                format!("cannot open {}", path.display()),
                Box::new(e),
            )
        })?;
        self.transform_reader(file)
    }
}

/// Positions of the New-layout columns the transformer reads.
struct NewColumns {
    date: Option<usize>,
    kind: Option<usize>,
    sub_type: Option<usize>,
    action: Option<usize>,
    symbol: Option<usize>,
    underlying: Option<usize>,
    description: Option<usize>,
    value: Option<usize>,
    quantity: Option<usize>,
    average_price: Option<usize>,
    commissions: Option<usize>,
    fees: Option<usize>,
    expiration: Option<usize>,
    strike: Option<usize>,
    call_put: Option<usize>,
    currency: Option<usize>,
}

impl NewColumns {
    fn to_legacy(&self, record: &::csv::StringRecord) -> [String; 16] {
        let get = |idx: Option<usize>| idx.and_then(|i| record.get(i)).unwrap_or("");

        let date = get(self.date);
        let date_time = parse_timestamp(date)
            .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| date.to_string());

        let action = get(self.action);
        let sub_code = if action.is_empty() {
            get(self.sub_type).to_string()
        } else {
            title_case_action(action)
        };

        let symbol = match get(self.underlying) {
            "" => get(self.symbol),
            underlying => underlying,
        };

        let call_put = get(self.call_put)
            .chars()
            .next()
            .map(|c| c.to_ascii_uppercase().to_string())
            .unwrap_or_default();

        let price = match parse_number(get(self.average_price)) {
            Some(price) => price.abs().to_string(),
            None => strip_grouping(get(self.average_price)),
        };

        let fees = fee_part(get(self.commissions)) + fee_part(get(self.fees));

        [
            date_time,
            get(self.kind).to_string(),
            sub_code,
            symbol.to_string(),
            buy_sell(action).to_string(),
            open_close(action).to_string(),
            strip_grouping(get(self.quantity)),
            get(self.expiration).to_string(),
            strip_grouping(get(self.strike)),
            call_put,
            price,
            fees.to_string(),
            strip_grouping(get(self.value)),
            get(self.description).to_string(),
            String::new(),
            get(self.currency).to_string(),
        ]
    }
}

/// Removes thousands separators (`"1,000.00"` becomes `"1000.00"`).
fn strip_grouping(value: &str) -> String {
    value.replace(',', "")
}

fn parse_number(value: &str) -> Option<Decimal> {
    Decimal::from_str(&strip_grouping(value)).ok()
}

/// Commission and fee cells use `--` for "none".
fn fee_part(value: &str) -> Decimal {
    parse_number(value).map(|d| d.abs()).unwrap_or(Decimal::ZERO)
}

/// `BUY_TO_OPEN` becomes `Buy to Open`.
fn title_case_action(action: &str) -> String {
    action
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let lower = word.to_ascii_lowercase();
            if lower == "to" {
                return lower;
            }
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn buy_sell(action: &str) -> &'static str {
    if action.starts_with("BUY") {
        "Buy"
    } else if action.starts_with("SELL") {
        "Sell"
    } else {
        ""
    }
}

fn open_close(action: &str) -> &'static str {
    if action.ends_with("OPEN") {
        "Open"
    } else if action.ends_with("CLOSE") {
        "Close"
    } else {
        ""
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "Date,Type,Sub Type,Action,Symbol,Instrument Type,Description,Value,Quantity,Average Price,Commissions,Fees,Multiplier,Root Symbol,Underlying Symbol,Expiration Date,Strike Price,Call or Put,Order #,Currency
2024-01-03T14:00:00+0200,Money Movement,Deposit,,,,Wire Funds Received,\"1,000.00\",0,,--,0.00,,,,,,,,USD
2024-01-15T15:30:00+0200,Trade,Buy,BUY_TO_OPEN,AAPL,Equity,Bought 10 AAPL @ 150.00,\"-1,500.00\",10,-150.00,1.00,0.14,1,AAPL,AAPL,,,,,USD
";

    fn rows(text: &str) -> Vec<Vec<String>> {
        let mut reader = ::csv::Reader::from_reader(text.as_bytes());
        reader
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn test_transforms_sample_export() {
        let output = NewFormatTransformer::new()
            .transform_reader(SAMPLE.as_bytes())
            .unwrap();

        assert!(output.starts_with("Date/Time,Transaction Code,Transaction Subcode,Symbol,"));
        let rows = rows(&output);
        assert_eq!(rows.len(), 2);

        let deposit = &rows[0];
        assert_eq!(deposit[0], "2024-01-03 14:00:00");
        assert_eq!(deposit[1], "Money Movement");
        assert_eq!(deposit[2], "Deposit");
        assert_eq!(deposit[3], "");
        assert_eq!(deposit[11], "0.00");
        assert_eq!(deposit[12], "1000.00");
        assert_eq!(deposit[15], "USD");

        let trade = &rows[1];
        assert_eq!(trade[2], "Buy to Open");
        assert_eq!(trade[3], "AAPL");
        assert_eq!(trade[4], "Buy");
        assert_eq!(trade[5], "Open");
        assert_eq!(trade[6], "10");
        assert_eq!(trade[10], "150.00");
        assert_eq!(trade[11], "1.14");
        assert_eq!(trade[12], "-1500.00");
    }

    #[test]
    fn test_missing_required_columns() {
        let err = NewFormatTransformer::new()
            .transform_reader("Date,Type,Symbol\n2024-01-01,Trade,SPY\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, GuardError::Transform { .. }));
        assert!(err.to_string().contains("Value"));
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        let output = NewFormatTransformer::new()
            .transform_reader("Date,Type,Value\nsomeday,Trade,1.00\n".as_bytes())
            .unwrap();
        assert_eq!(rows(&output)[0][0], "someday");
    }

    #[test]
    fn test_missing_file_is_a_transform_error() {
        let err = NewFormatTransformer::new()
            .transform(Path::new("/no/such/export.csv"))
            .unwrap_err();
        assert!(matches!(err, GuardError::Transform { .. }));
    }

    #[test]
    fn test_action_helpers() {
        assert_eq!(title_case_action("SELL_TO_CLOSE"), "Sell to Close");
        assert_eq!(title_case_action("BUY"), "Buy");
        assert_eq!(buy_sell("SELL_TO_OPEN"), "Sell");
        assert_eq!(open_close("BUY_TO_CLOSE"), "Close");
        assert_eq!(open_close(""), "");
    }
}

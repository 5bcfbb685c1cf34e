//! Series normalization: provider records → [`CanonicalSeries`].
//!
//! Column names are resolved once per payload against a declared alias table
//! (case-insensitive). Values are coerced leniently: anything that does not
//! parse becomes `None`. Rows without a date or a close are dropped, the rest
//! are sorted ascending and deduplicated by date.

use super::provider::RawRecord;
use crate::domain::{Bar, CanonicalSeries};
use chrono::NaiveDate;
use serde_json::Value;

/// Canonical OHLCV field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Date,
    Open,
    High,
    Low,
    Close,
    Volume,
}

/// Accepted provider names per canonical field, lowercase, in priority order.
pub const ALIASES: [(Field, &[&str]); 6] = [
    (Field::Date, &["ngay", "date", "tradingdate"]),
    (Field::Open, &["giamocua", "open"]),
    (Field::High, &["giacaonhat", "high"]),
    (Field::Low, &["giathapnhat", "low"]),
    (Field::Close, &["giadongcua", "close"]),
    (
        Field::Volume,
        &["kl", "volume", "vol", "khoiluong", "khoi_luong", "khoiluongkhoplenh"],
    ),
];

/// Day-first formats tried in order. Two-digit years go first so that
/// `%Y` does not swallow `25` as the year 25.
const DATE_FORMATS: [&str; 7] = [
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%Y%m%d",
];

/// Which provider key (lowercase alias) feeds each canonical field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub date: Option<&'static str>,
    pub open: Option<&'static str>,
    pub high: Option<&'static str>,
    pub low: Option<&'static str>,
    pub close: Option<&'static str>,
    pub volume: Option<&'static str>,
}

impl ColumnMap {
    /// Resolve every field against the union of keys seen in `records`.
    pub fn resolve(records: &[RawRecord]) -> Self {
        let present = |alias: &str| {
            records
                .iter()
                .any(|r| r.keys().any(|k| k.eq_ignore_ascii_case(alias)))
        };

        let mut map = ColumnMap::default();
        for (field, aliases) in ALIASES {
            let found = aliases.iter().copied().find(|a| present(a));
            match field {
                Field::Date => map.date = found,
                Field::Open => map.open = found,
                Field::High => map.high = found,
                Field::Low => map.low = found,
                Field::Close => map.close = found,
                Field::Volume => map.volume = found,
            }
        }
        map
    }
}

/// Normalize provider records into a canonical series.
///
/// Never fails: empty or unusable input yields an empty series.
pub fn normalize(records: &[RawRecord]) -> CanonicalSeries {
    let columns = ColumnMap::resolve(records);
    let (Some(date_key), Some(close_key)) = (columns.date, columns.close) else {
        return CanonicalSeries::empty();
    };

    let bars = records
        .iter()
        .filter_map(|record| {
            let date = lookup(record, date_key).and_then(parse_date)?;
            let close = lookup(record, close_key).and_then(parse_number)?;
            let number = |key: Option<&str>| key.and_then(|k| lookup(record, k)).and_then(parse_number);
            Some(Bar {
                date,
                open: number(columns.open),
                high: number(columns.high),
                low: number(columns.low),
                close,
                volume: number(columns.volume),
            })
        })
        .collect();

    CanonicalSeries::from_bars(bars)
}

fn lookup<'a>(record: &'a RawRecord, key: &str) -> Option<&'a Value> {
    record
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(key))
        .map(|(_, v)| v)
}

/// Lenient numeric coercion. Strings may carry `,` thousands separators.
pub fn parse_number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned.parse::<f64>().ok()?
        }
        _ => return None,
    };
    n.is_finite().then_some(n)
}

/// Day-first date parsing; any time-of-day suffix is ignored.
pub fn parse_date(value: &Value) -> Option<NaiveDate> {
    let s = value.as_str()?.trim();
    let day_part = s.split([' ', 'T']).next()?;
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(day_part, fmt).ok())
}

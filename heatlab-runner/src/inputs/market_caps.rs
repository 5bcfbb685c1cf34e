//! Market-cap mapping: symbol → authoritative market capitalization.
//!
//! Header form names a `symbol` column and one of `market_cap`, `marketcap`
//! or `market-cap`; otherwise rows are read as `symbol,market_cap`. Values
//! may carry thousands separators. An unparseable value is kept as `None`
//! so the aggregator falls through to its estimate.

use heatlab_core::domain::{normalize_symbol, Symbol};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::{cell, csv_reader, read_optional, InputError};

const CAP_HEADERS: [&str; 3] = ["market_cap", "marketcap", "market-cap"];

pub type MarketCapMap = HashMap<Symbol, Option<f64>>;

fn header_columns(record: &csv::StringRecord) -> Option<(usize, usize)> {
    let find = |label: &str| record.iter().position(|c| c.eq_ignore_ascii_case(label));
    let symbol = find("symbol")?;
    let cap = CAP_HEADERS.iter().find_map(|&label| find(label))?;
    Some((symbol, cap))
}

fn parse_cap(raw: &str) -> Option<f64> {
    raw.replace(',', "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

pub fn parse_market_caps(input: impl AsRef<[u8]>) -> MarketCapMap {
    let mut reader = csv_reader(input.as_ref());
    let mut map = MarketCapMap::new();
    let mut columns: Option<(usize, usize)> = None;

    for (line, row) in reader.records().enumerate() {
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 1, error = %e, "skipping unreadable market-cap row");
                continue;
            }
        };

        let (sym_idx, cap_idx) = match columns {
            Some(cols) => cols,
            None => match header_columns(&record) {
                Some(header) => {
                    columns = Some(header);
                    continue;
                }
                None => *columns.insert((0, 1)),
            },
        };

        let Some(symbol) = cell(&record, sym_idx).and_then(normalize_symbol) else {
            continue;
        };
        let cap = cell(&record, cap_idx).and_then(parse_cap);
        if cap.is_none() {
            warn!(%symbol, "unparseable market cap, will estimate");
        }
        map.insert(symbol, cap);
    }
    map
}

/// Load the market-cap table; a missing file yields an empty map.
pub fn load_market_caps(path: &Path) -> Result<MarketCapMap, InputError> {
    let Some(bytes) = read_optional(path, "market-cap")? else {
        return Ok(MarketCapMap::new());
    };
    let map = parse_market_caps(&bytes);
    info!(path = %path.display(), entries = map.len(), "loaded market caps");
    Ok(map)
}

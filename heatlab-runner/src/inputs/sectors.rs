//! Sector mapping: symbol → {sector, display name}.
//!
//! Accepts either a header row naming `symbol`, `sector` and optionally
//! `name` (any order, any case), or positional rows `symbol,sector[,name]`.

use heatlab_core::domain::{normalize_symbol, Symbol};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

use super::{cell, csv_reader, read_optional, InputError};

pub const UNKNOWN_SECTOR: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorInfo {
    pub sector: String,
    pub name: String,
}

pub type SectorMap = HashMap<Symbol, SectorInfo>;

#[derive(Debug, Clone, Copy)]
struct Columns {
    symbol: usize,
    sector: usize,
    name: Option<usize>,
}

impl Columns {
    const POSITIONAL: Columns = Columns {
        symbol: 0,
        sector: 1,
        name: Some(2),
    };

    fn from_header(record: &csv::StringRecord) -> Option<Columns> {
        let find = |label: &str| record.iter().position(|c| c.eq_ignore_ascii_case(label));
        Some(Columns {
            symbol: find("symbol")?,
            sector: find("sector")?,
            name: find("name"),
        })
    }
}

pub fn parse_sectors(input: impl AsRef<[u8]>) -> SectorMap {
    let mut reader = csv_reader(input.as_ref());
    let mut map = SectorMap::new();
    let mut columns: Option<Columns> = None;

    for (line, row) in reader.records().enumerate() {
        let record = match row {
            Ok(record) => record,
            Err(e) => {
                warn!(line = line + 1, error = %e, "skipping unreadable sector row");
                continue;
            }
        };

        let cols = match columns {
            Some(cols) => cols,
            None => match Columns::from_header(&record) {
                Some(header) => {
                    columns = Some(header);
                    continue;
                }
                None => *columns.insert(Columns::POSITIONAL),
            },
        };

        let Some(symbol) = cell(&record, cols.symbol).and_then(normalize_symbol) else {
            continue;
        };
        let sector = cell(&record, cols.sector).unwrap_or(UNKNOWN_SECTOR).to_string();
        let name = cols
            .name
            .and_then(|idx| cell(&record, idx))
            .map_or_else(|| symbol.clone(), str::to_string);

        map.insert(symbol, SectorInfo { sector, name });
    }
    map
}

/// Load the sector table; a missing file yields an empty map.
pub fn load_sectors(path: &Path) -> Result<SectorMap, InputError> {
    let Some(bytes) = read_optional(path, "sector")? else {
        return Ok(SectorMap::new());
    };
    let map = parse_sectors(&bytes);
    info!(path = %path.display(), entries = map.len(), "loaded sectors");
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_columns_in_any_order() {
        let map = parse_sectors("Name,SYMBOL,Sector\nVietcombank,vcb,Banks\nFPT Corp,FPT,Tech\n");
        assert_eq!(map["VCB"].sector, "Banks");
        assert_eq!(map["VCB"].name, "Vietcombank");
        assert_eq!(map["FPT"].name, "FPT Corp");
    }

    #[test]
    fn header_without_name_defaults_to_symbol() {
        let map = parse_sectors("symbol,sector\nHPG,Steel\n");
        assert_eq!(map["HPG"].name, "HPG");
    }

    #[test]
    fn positional_two_and_three_columns() {
        let map = parse_sectors("VNM,Consumer\nMWG,Retail,Mobile World\n");
        assert_eq!(map["VNM"].sector, "Consumer");
        assert_eq!(map["VNM"].name, "VNM");
        assert_eq!(map["MWG"].name, "Mobile World");
    }

    #[test]
    fn blank_cells_degrade_per_row() {
        let map = parse_sectors("symbol,sector,name\nSSI,,\n,Banks,Orphan\nVND,Brokers,\n");
        assert_eq!(map["SSI"].sector, "Unknown");
        assert_eq!(map["SSI"].name, "SSI");
        assert_eq!(map["VND"].sector, "Brokers");
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn single_column_row_gets_unknown_sector() {
        let map = parse_sectors("GAS\n");
        assert_eq!(map["GAS"].sector, "Unknown");
    }
}

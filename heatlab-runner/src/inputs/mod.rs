//! Run inputs read from disk: the symbol list and the two optional mappings.
//!
//! The symbol list is required. The sector and market-cap tables are optional:
//! a missing file falls back to an empty map (sector `Unknown`, estimated
//! market cap), and a malformed row degrades to defaults for that row only.

pub mod market_caps;
pub mod sectors;
pub mod symbols;

pub use market_caps::{load_market_caps, parse_market_caps, MarketCapMap};
pub use sectors::{load_sectors, parse_sectors, SectorInfo, SectorMap};
pub use symbols::{load_symbols, parse_symbols};

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum InputError {
    #[error("symbols file not found: {path}")]
    MissingSymbols { path: PathBuf },

    #[error("no symbols in {path}")]
    EmptySymbols { path: PathBuf },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Read an optional input file as raw bytes. A missing file is `Ok(None)`.
///
/// Bytes are not decoded here; a row that is not valid UTF-8 surfaces from
/// the csv reader and only that row is skipped.
pub(crate) fn read_optional(path: &Path, what: &str) -> Result<Option<Vec<u8>>, InputError> {
    match std::fs::read(path) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(path = %path.display(), "no {what} file, using defaults");
            Ok(None)
        }
        Err(source) => Err(InputError::Io {
            path: path.to_path_buf(),
            source,
        }),
    }
}

/// Flexible, whitespace-trimming CSV reader with no header handling.
pub(crate) fn csv_reader(bytes: &[u8]) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(bytes)
}

/// Non-empty cell at `idx`, if any.
pub(crate) fn cell(record: &csv::StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).filter(|s| !s.is_empty())
}

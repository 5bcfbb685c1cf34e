//! Symbol list: one ticker per line.

use heatlab_core::domain::{normalize_symbol, Symbol};
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

use super::InputError;

/// Parse a symbol list. Blank lines and `#` comments are skipped, tickers
/// are normalized, and repeats are dropped keeping the first occurrence.
pub fn parse_symbols(text: &str) -> Vec<Symbol> {
    let mut seen = HashSet::new();
    text.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(normalize_symbol)
        .filter(|sym| seen.insert(sym.clone()))
        .collect()
}

/// Load the symbol list. A missing or empty list is fatal.
pub fn load_symbols(path: &Path) -> Result<Vec<Symbol>, InputError> {
    let text = std::fs::read_to_string(path).map_err(|source| {
        if source.kind() == ErrorKind::NotFound {
            InputError::MissingSymbols {
                path: path.to_path_buf(),
            }
        } else {
            InputError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let symbols = parse_symbols(&text);
    if symbols.is_empty() {
        return Err(InputError::EmptySymbols {
            path: path.to_path_buf(),
        });
    }
    Ok(symbols)
}

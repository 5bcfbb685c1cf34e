//! History source trait and structured error types.
//!
//! The HistorySource trait abstracts over daily-bar providers so the pipeline
//! can swap implementations and use in-memory fakes in tests.

use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// One provider-native daily record, before normalization.
///
/// Field names and value types are whatever the provider sent.
pub type RawRecord = Map<String, Value>;

/// Structured error types for history fetches.
///
/// The display string is what ends up in a failed SymbolResult.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("request timed out after {timeout:?}")]
    Timeout { timeout: Duration },

    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("HTTP {status} from provider")]
    HttpStatus { status: u16 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("data error: {0}")]
    Other(String),
}

/// Trait for daily history providers.
///
/// Implementations are called concurrently from the fetch pool, one call per
/// symbol, and must not share mutable state between calls.
pub trait HistorySource: Send + Sync {
    /// Identifier stamped into the output document (e.g. `CAFEF_HISTORY`).
    fn name(&self) -> &str;

    /// Fetch up to `count` most recent daily records for `symbol`.
    fn fetch(&self, symbol: &str, count: usize) -> Result<Vec<RawRecord>, DataError>;
}

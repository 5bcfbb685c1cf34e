//! Heatlab Core — domain types, history sources, normalization, summaries.
//!
//! This crate covers everything that happens to a single symbol:
//! - Domain types (bars, canonical series, symbol results, history ranges)
//! - The `HistorySource` trait and the CafeF HTTP implementation
//! - Series normalization from loosely-typed provider records
//! - Per-symbol price-change summaries with failure folded into data

pub mod data;
pub mod domain;
pub mod summarize;

pub use summarize::{summarize_series, summarize_symbol};

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything that crosses the fetch pool is Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::SymbolResult>();
        require_sync::<domain::SymbolResult>();
        require_send::<domain::CanonicalSeries>();
        require_sync::<domain::CanonicalSeries>();
        require_send::<domain::HistoryRange>();
        require_sync::<domain::HistoryRange>();
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::CafefProvider>();
        require_sync::<data::CafefProvider>();
    }

    struct Unreachable;

    impl data::HistorySource for Unreachable {
        fn name(&self) -> &str {
            "UNREACHABLE"
        }

        fn fetch(&self, _symbol: &str, _count: usize) -> Result<Vec<data::RawRecord>, data::DataError> {
            Err(data::DataError::NetworkUnreachable("connection refused".into()))
        }
    }

    /// A fetch failure comes back as a failed result, not an error.
    #[test]
    fn fetch_failure_is_folded_into_result() {
        let r: domain::SymbolResult = summarize_symbol(&Unreachable, "AAA", 30);
        assert_eq!(r.symbol, "AAA");
        assert!(r.error().unwrap().contains("connection refused"));
        assert_eq!(r.price(), None);
        assert_eq!(r.n_points(), 0);
    }
}

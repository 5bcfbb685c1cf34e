//! Fetch fan-out / fan-in.
//!
//! One `summarize_symbol` task per symbol on a private rayon pool of fixed
//! width. The caller blocks until every task has settled; `collect` is the
//! barrier. Tasks share nothing but the source (read-only) and the progress
//! observer, and each yields exactly one `SymbolResult`, failure included.

use heatlab_core::data::HistorySource;
use heatlab_core::domain::{Symbol, SymbolResult};
use heatlab_core::summarize_symbol;
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("worker pool width must be at least 1")]
    InvalidWidth,

    #[error("failed to build worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// Observer for batch progress. Called from worker threads.
pub trait FetchProgress: Send + Sync {
    /// Called as each symbol settles. `done` counts completions so far.
    fn on_complete(&self, symbol: &str, done: usize, total: usize, result: &SymbolResult);

    /// Called once after the barrier.
    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize);
}

/// Reports progress as tracing events.
pub struct LogProgress;

impl FetchProgress for LogProgress {
    fn on_complete(&self, symbol: &str, done: usize, total: usize, result: &SymbolResult) {
        match result.error() {
            Some(reason) => debug!(%symbol, done, total, %reason, "symbol failed"),
            None => debug!(%symbol, done, total, n_points = result.n_points(), "symbol done"),
        }
    }

    fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
        info!(succeeded, failed, total, "fetch batch complete");
    }
}

/// Summarize every symbol with at most `workers` fetches in flight.
///
/// Results come back in input order, though completion order is arbitrary.
pub fn fetch_all(
    source: &dyn HistorySource,
    symbols: &[Symbol],
    days: usize,
    workers: usize,
    progress: Option<&dyn FetchProgress>,
) -> Result<Vec<SymbolResult>, CoordinatorError> {
    if workers == 0 {
        return Err(CoordinatorError::InvalidWidth);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("heatlab-fetch-{i}"))
        .build()?;

    let total = symbols.len();
    let done = AtomicUsize::new(0);
    info!(total, workers, days, source = source.name(), "fetching history");

    let results: Vec<SymbolResult> = pool.install(|| {
        symbols
            .par_iter()
            .with_max_len(1)
            .map(|symbol| {
                let result = summarize_symbol(source, symbol, days);
                if let Some(p) = progress {
                    let n = done.fetch_add(1, Ordering::Relaxed) + 1;
                    p.on_complete(symbol, n, total, &result);
                }
                result
            })
            .collect()
    });

    let failed = results.iter().filter(|r| r.is_failed()).count();
    if let Some(p) = progress {
        p.on_batch_complete(total - failed, failed, total);
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use heatlab_core::data::{DataError, RawRecord};
    use serde_json::json;
    use std::sync::Mutex;

    struct FixedSource;

    impl HistorySource for FixedSource {
        fn name(&self) -> &str {
            "FIXED"
        }

        fn fetch(&self, symbol: &str, _count: usize) -> Result<Vec<RawRecord>, DataError> {
            if symbol.starts_with('X') {
                return Err(DataError::NetworkUnreachable("no route".into()));
            }
            let row = json!({"Ngay": "01/02/2025", "GiaDongCua": 5.0});
            Ok(vec![row.as_object().cloned().unwrap()])
        }
    }

    #[derive(Default)]
    struct Recorder {
        seen: Mutex<Vec<(String, usize)>>,
        batch: Mutex<Option<(usize, usize, usize)>>,
    }

    impl FetchProgress for Recorder {
        fn on_complete(&self, symbol: &str, done: usize, _total: usize, _result: &SymbolResult) {
            self.seen.lock().unwrap().push((symbol.to_string(), done));
        }

        fn on_batch_complete(&self, succeeded: usize, failed: usize, total: usize) {
            *self.batch.lock().unwrap() = Some((succeeded, failed, total));
        }
    }

    fn syms(names: &[&str]) -> Vec<Symbol> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_result_per_symbol_in_input_order() {
        let symbols = syms(&["AAA", "XBAD", "BBB", "CCC"]);
        let results = fetch_all(&FixedSource, &symbols, 30, 2, None).unwrap();
        let order: Vec<&str> = results.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(order, vec!["AAA", "XBAD", "BBB", "CCC"]);
        assert!(results[1].is_failed());
        assert_eq!(results[0].price(), Some(5.0));
    }

    #[test]
    fn zero_width_rejected() {
        let err = fetch_all(&FixedSource, &syms(&["AAA"]), 30, 0, None).unwrap_err();
        assert!(matches!(err, CoordinatorError::InvalidWidth));
    }

    #[test]
    fn empty_symbol_list_is_fine() {
        let results = fetch_all(&FixedSource, &[], 30, 4, None).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn progress_sees_every_symbol_once() {
        let recorder = Recorder::default();
        let symbols = syms(&["AAA", "XBAD", "BBB"]);
        fetch_all(&FixedSource, &symbols, 30, 3, Some(&recorder)).unwrap();

        let mut seen = recorder.seen.lock().unwrap().clone();
        let mut counts: Vec<usize> = seen.iter().map(|(_, n)| *n).collect();
        counts.sort_unstable();
        assert_eq!(counts, vec![1, 2, 3]);

        seen.sort();
        let names: Vec<&str> = seen.iter().map(|(s, _)| s.as_str()).collect();
        assert_eq!(names, vec!["AAA", "BBB", "XBAD"]);
        assert_eq!(*recorder.batch.lock().unwrap(), Some((2, 1, 3)));
    }
}

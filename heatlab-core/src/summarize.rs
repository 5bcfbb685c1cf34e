//! Per-symbol summary: fetch → normalize → summarize.
//!
//! `summarize_symbol` is the unit of work the fetch pool runs. It never
//! returns an error: every failure below it is folded into
//! `Outcome::Failed` so a batch always gets exactly one result per symbol.

use crate::data::normalize::normalize;
use crate::data::provider::HistorySource;
use crate::domain::{CanonicalSeries, PriceSummary, SymbolResult};
use tracing::{debug, warn};

/// Summarize an already-normalized series.
///
/// An empty series gives `NoData`. `change_pct` is `None` when the first
/// close is exactly zero or the ratio is not finite.
pub fn summarize_series(symbol: &str, series: &CanonicalSeries) -> SymbolResult {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return SymbolResult::no_data(symbol);
    };

    let change = last.close - first.close;
    let change_pct = (first.close != 0.0)
        .then(|| change / first.close * 100.0)
        .filter(|p| p.is_finite());

    let (sum, count) = series
        .volumes()
        .fold((0.0_f64, 0usize), |(sum, n), v| (sum + v, n + 1));
    let avg_volume = (count > 0).then(|| sum / count as f64);

    SymbolResult::summary(
        symbol,
        PriceSummary {
            price: last.close,
            change,
            change_pct,
            avg_volume,
            n_points: series.len(),
        },
    )
}

/// Fetch `days` bars for `symbol` and summarize them.
pub fn summarize_symbol(source: &dyn HistorySource, symbol: &str, days: usize) -> SymbolResult {
    let records = match source.fetch(symbol, days) {
        Ok(records) => records,
        Err(e) => {
            warn!(%symbol, error = %e, "history fetch failed");
            return SymbolResult::failed(symbol, e.to_string());
        }
    };

    let series = normalize(&records);
    debug!(
        %symbol,
        raw_rows = records.len(),
        kept_rows = series.len(),
        "normalized history"
    );
    summarize_series(symbol, &series)
}

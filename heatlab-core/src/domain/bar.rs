//! Bar and CanonicalSeries: normalized daily price history of one symbol.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One trading day after normalization.
///
/// `date` and `close` are always present; the other fields stay optional
/// because providers routinely omit them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: f64,
    pub volume: Option<f64>,
}

/// Date-ordered, date-unique sequence of bars.
///
/// The only way to build one is [`CanonicalSeries::from_bars`], which sorts
/// and deduplicates, so dates are strictly increasing for every instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalSeries {
    bars: Vec<Bar>,
}

impl CanonicalSeries {
    /// Sort ascending by date (stable) and keep the first bar seen for each date.
    pub fn from_bars(mut bars: Vec<Bar>) -> Self {
        bars.sort_by_key(|b| b.date);
        bars.dedup_by_key(|b| b.date);
        Self { bars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn first(&self) -> Option<&Bar> {
        self.bars.first()
    }

    pub fn last(&self) -> Option<&Bar> {
        self.bars.last()
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    /// Volumes that are present, in date order.
    pub fn volumes(&self) -> impl Iterator<Item = f64> + '_ {
        self.bars.iter().filter_map(|b| b.volume)
    }
}

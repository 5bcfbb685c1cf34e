//! Sector aggregation.
//!
//! Folds per-symbol results into flat entries and sector buckets:
//!
//! 1. Results without a `change_pct` are dropped (hard filter).
//! 2. Display name and sector come from the sector map, else symbol / `Unknown`.
//! 3. Market cap is resolved by [`resolve_market_cap`].
//! 4. Each entry is added to its sector's running total.
//!
//! Results are put in symbol order before folding, so totals do not depend
//! on the order the fetch pool delivered them in.

use heatlab_core::domain::{Symbol, SymbolResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

use crate::inputs::sectors::UNKNOWN_SECTOR;
use crate::inputs::{MarketCapMap, SectorMap};

/// Which fallback tier produced a market cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketCapSource {
    /// Finite value from the market-cap table.
    Provided,
    /// `avg_volume × price`.
    Estimated,
    /// Neither was available.
    #[default]
    Missing,
}

/// Resolve a symbol's market cap.
///
/// Tiers, first match wins:
/// 1. `provided`, if present and finite
/// 2. `avg_volume × price`, if both are present and the product is finite
/// 3. `None`
pub fn resolve_market_cap(
    result: &SymbolResult,
    provided: Option<f64>,
) -> (Option<f64>, MarketCapSource) {
    if let Some(cap) = provided.filter(|c| c.is_finite()) {
        return (Some(cap), MarketCapSource::Provided);
    }
    if let (Some(volume), Some(price)) = (result.avg_volume(), result.price()) {
        let estimate = volume * price;
        if estimate.is_finite() {
            return (Some(estimate), MarketCapSource::Estimated);
        }
    }
    (None, MarketCapSource::Missing)
}

/// One plottable symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatEntry {
    pub symbol: Symbol,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub change: f64,
    pub change_pct: f64,
    pub market_cap_basic: Option<f64>,
    /// Average daily volume over the window.
    pub volume: Option<f64>,
    pub n_points: usize,
    #[serde(skip)]
    pub market_cap_source: MarketCapSource,
}

impl FlatEntry {
    fn from_result(
        result: &SymbolResult,
        sectors: &SectorMap,
        market_caps: &MarketCapMap,
    ) -> Option<FlatEntry> {
        let change_pct = result.change_pct()?;
        let price = result.price()?;
        let change = result.change()?;

        let (name, sector) = match sectors.get(&result.symbol) {
            Some(info) => (info.name.clone(), info.sector.clone()),
            None => (result.symbol.clone(), UNKNOWN_SECTOR.to_string()),
        };
        let provided = market_caps.get(&result.symbol).copied().flatten();
        let (market_cap_basic, market_cap_source) = resolve_market_cap(result, provided);

        Some(FlatEntry {
            symbol: result.symbol.clone(),
            name,
            sector,
            price,
            change,
            change_pct,
            market_cap_basic,
            volume: result.avg_volume(),
            n_points: result.n_points(),
            market_cap_source,
        })
    }
}

/// A sector bucket with its running market-cap total.
#[derive(Debug, Clone, PartialEq)]
pub struct SectorEntry {
    pub name: String,
    pub items: Vec<FlatEntry>,
    cap_total: f64,
    contributors: usize,
}

impl SectorEntry {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            items: Vec::new(),
            cap_total: 0.0,
            contributors: 0,
        }
    }

    fn add(&mut self, entry: FlatEntry) {
        if let Some(cap) = entry.market_cap_basic {
            self.cap_total += cap;
            self.contributors += 1;
        }
        self.items.push(entry);
    }

    /// Aggregate market cap; `None` unless some member contributed and the
    /// total is positive.
    pub fn market_cap(&self) -> Option<f64> {
        (self.contributors > 0 && self.cap_total > 0.0).then_some(self.cap_total)
    }

    /// Members that contributed a market cap.
    pub fn contributors(&self) -> usize {
        self.contributors
    }
}

/// Result of the fold: buckets in sector-name order, flat list in symbol order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Aggregation {
    pub sectors: BTreeMap<String, SectorEntry>,
    pub flat: Vec<FlatEntry>,
}

impl Aggregation {
    pub fn is_empty(&self) -> bool {
        self.flat.is_empty()
    }
}

pub fn aggregate(
    results: &[SymbolResult],
    sectors: &SectorMap,
    market_caps: &MarketCapMap,
) -> Aggregation {
    let mut ordered: Vec<&SymbolResult> = results.iter().collect();
    ordered.sort_by(|a, b| {
        a.symbol.cmp(&b.symbol).then_with(|| {
            let pct = |r: &SymbolResult| r.change_pct().unwrap_or(f64::NEG_INFINITY);
            pct(*a).total_cmp(&pct(*b))
        })
    });

    let mut agg = Aggregation::default();
    let mut skipped = 0usize;

    for result in ordered {
        let Some(entry) = FlatEntry::from_result(result, sectors, market_caps) else {
            skipped += 1;
            continue;
        };
        agg.sectors
            .entry(entry.sector.clone())
            .or_insert_with(|| SectorEntry::new(&entry.sector))
            .add(entry.clone());
        agg.flat.push(entry);
    }

    debug!(
        kept = agg.flat.len(),
        skipped,
        sectors = agg.sectors.len(),
        "aggregated results"
    );
    agg
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::SectorInfo;
    use heatlab_core::domain::PriceSummary;

    fn summary(symbol: &str, price: f64, pct: Option<f64>, avg_volume: Option<f64>) -> SymbolResult {
        SymbolResult::summary(
            symbol,
            PriceSummary {
                price,
                change: 1.0,
                change_pct: pct,
                avg_volume,
                n_points: 2,
            },
        )
    }

    #[test]
    fn provided_cap_wins_over_estimate() {
        let r = summary("AAA", 12.0, Some(20.0), Some(1000.0));
        assert_eq!(
            resolve_market_cap(&r, Some(5.0)),
            (Some(5.0), MarketCapSource::Provided)
        );
    }

    #[test]
    fn estimate_is_volume_times_price() {
        let r = summary("AAA", 12.0, Some(20.0), Some(1000.0));
        assert_eq!(
            resolve_market_cap(&r, None),
            (Some(12000.0), MarketCapSource::Estimated)
        );
        assert_eq!(
            resolve_market_cap(&r, Some(f64::NAN)),
            (Some(12000.0), MarketCapSource::Estimated)
        );
    }

    #[test]
    fn no_volume_means_missing() {
        let r = summary("AAA", 12.0, Some(20.0), None);
        assert_eq!(resolve_market_cap(&r, None), (None, MarketCapSource::Missing));
    }

    #[test]
    fn null_pct_is_filtered_not_zero_filled() {
        let results = vec![
            summary("AAA", 12.0, Some(20.0), None),
            summary("ZZZ", 5.0, None, None),
            SymbolResult::failed("BBB", "boom"),
            SymbolResult::no_data("CCC"),
        ];
        let agg = aggregate(&results, &SectorMap::new(), &MarketCapMap::new());
        let kept: Vec<&str> = agg.flat.iter().map(|e| e.symbol.as_str()).collect();
        assert_eq!(kept, vec!["AAA"]);
    }

    #[test]
    fn unmapped_symbol_lands_in_unknown() {
        let mut sectors = SectorMap::new();
        sectors.insert(
            "AAA".into(),
            SectorInfo {
                sector: "Banks".into(),
                name: "Alpha Bank".into(),
            },
        );
        let results = vec![
            summary("AAA", 12.0, Some(20.0), None),
            summary("BBB", 8.0, Some(-3.0), None),
        ];
        let agg = aggregate(&results, &sectors, &MarketCapMap::new());
        assert_eq!(agg.sectors["Banks"].items[0].name, "Alpha Bank");
        let bbb = &agg.sectors["Unknown"].items[0];
        assert_eq!(bbb.symbol, "BBB");
        assert_eq!(bbb.name, "BBB");
    }

    #[test]
    fn sector_without_caps_reports_none() {
        let results = vec![
            summary("AAA", 12.0, Some(1.0), None),
            summary("BBB", 8.0, Some(2.0), None),
        ];
        let agg = aggregate(&results, &SectorMap::new(), &MarketCapMap::new());
        let unknown = &agg.sectors["Unknown"];
        assert_eq!(unknown.items.len(), 2);
        assert_eq!(unknown.contributors(), 0);
        assert_eq!(unknown.market_cap(), None);
    }

    #[test]
    fn zero_total_reports_none() {
        let mut caps = MarketCapMap::new();
        caps.insert("AAA".into(), Some(0.0));
        let agg = aggregate(
            &[summary("AAA", 12.0, Some(1.0), None)],
            &SectorMap::new(),
            &caps,
        );
        assert_eq!(agg.sectors["Unknown"].contributors(), 1);
        assert_eq!(agg.sectors["Unknown"].market_cap(), None);
    }

    #[test]
    fn sector_total_sums_members() {
        let mut caps = MarketCapMap::new();
        caps.insert("AAA".into(), Some(100.0));
        caps.insert("BBB".into(), None);
        let results = vec![
            summary("AAA", 12.0, Some(1.0), None),
            summary("BBB", 2.0, Some(2.0), Some(10.0)),
            summary("CCC", 3.0, Some(3.0), None),
        ];
        let agg = aggregate(&results, &SectorMap::new(), &caps);
        let unknown = &agg.sectors["Unknown"];
        assert_eq!(unknown.market_cap(), Some(120.0));
        assert_eq!(unknown.contributors(), 2);
        assert_eq!(agg.flat[1].market_cap_source, MarketCapSource::Estimated);
        assert_eq!(agg.flat[2].market_cap_source, MarketCapSource::Missing);
    }
}

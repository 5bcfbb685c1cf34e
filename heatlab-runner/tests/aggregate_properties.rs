//! Property tests for the sector fold.
//!
//! 1. Order independence: any permutation of the results yields identical
//!    sector totals and the same flat entries
//! 2. Null caps: a sector with no contributing member reports `None`
//! 3. Filter: exactly the results with a `change_pct` are plotted

use heatlab_core::domain::{PriceSummary, SymbolResult};
use heatlab_runner::{aggregate, MarketCapMap, SectorInfo, SectorMap};
use proptest::prelude::*;
use std::collections::BTreeSet;

const SECTORS: [&str; 4] = ["Banks", "Energy", "Retail", "Tech"];

#[derive(Debug, Clone)]
struct Case {
    results: Vec<SymbolResult>,
    sectors: SectorMap,
    market_caps: MarketCapMap,
}

fn arb_outcome(symbol: String) -> impl Strategy<Value = SymbolResult> {
    let summary = (
        0.01..500.0_f64,
        prop::option::of(-50.0..50.0_f64),
        prop::option::of(0.0..1e6_f64),
    )
        .prop_map({
            let symbol = symbol.clone();
            move |(price, change_pct, avg_volume)| {
                SymbolResult::summary(
                    symbol.clone(),
                    PriceSummary {
                        price,
                        change: change_pct.unwrap_or(0.0) * price / 100.0,
                        change_pct,
                        avg_volume,
                        n_points: 3,
                    },
                )
            }
        });
    prop_oneof![
        6 => summary,
        1 => Just(SymbolResult::failed(symbol.clone(), "timeout")),
        1 => Just(SymbolResult::no_data(symbol)),
    ]
}

fn arb_case() -> impl Strategy<Value = Case> {
    prop::collection::btree_set("[A-Z]{3}", 1..30).prop_flat_map(|symbols| {
        let symbols: Vec<String> = symbols.into_iter().collect();
        let n = symbols.len();
        let results = symbols
            .iter()
            .cloned()
            .map(arb_outcome)
            .collect::<Vec<_>>();
        let sector_picks = prop::collection::vec(prop::option::of(0..SECTORS.len()), n);
        let caps = prop::collection::vec(
            prop::option::of(prop::option::of(1e3..1e9_f64)),
            n,
        );
        (results, sector_picks, caps).prop_map(move |(results, picks, caps)| {
            let mut sectors = SectorMap::new();
            let mut market_caps = MarketCapMap::new();
            for ((symbol, pick), cap) in symbols.iter().zip(picks).zip(caps) {
                if let Some(i) = pick {
                    sectors.insert(
                        symbol.clone(),
                        SectorInfo {
                            sector: SECTORS[i].to_string(),
                            name: format!("{symbol} Holdings"),
                        },
                    );
                }
                if let Some(cap) = cap {
                    market_caps.insert(symbol.clone(), cap);
                }
            }
            Case {
                results,
                sectors,
                market_caps,
            }
        })
    })
}

fn arb_case_with_shuffle() -> impl Strategy<Value = (Case, Vec<SymbolResult>)> {
    arb_case().prop_flat_map(|case| {
        let shuffled = Just(case.results.clone()).prop_shuffle();
        (Just(case), shuffled)
    })
}

proptest! {
    #[test]
    fn fold_is_order_independent((case, shuffled) in arb_case_with_shuffle()) {
        let a = aggregate(&case.results, &case.sectors, &case.market_caps);
        let b = aggregate(&shuffled, &case.sectors, &case.market_caps);

        prop_assert_eq!(a.sectors.len(), b.sectors.len());
        for (name, sa) in &a.sectors {
            let sb = &b.sectors[name];
            prop_assert_eq!(sa.market_cap().map(f64::to_bits), sb.market_cap().map(f64::to_bits));
            prop_assert_eq!(sa.items.len(), sb.items.len());
        }

        let set = |flat: &[heatlab_runner::FlatEntry]| -> BTreeSet<String> {
            flat.iter().map(|e| format!("{e:?}")).collect()
        };
        prop_assert_eq!(set(&a.flat), set(&b.flat));
    }

    #[test]
    fn capless_sector_reports_none(case in arb_case()) {
        let agg = aggregate(&case.results, &case.sectors, &case.market_caps);
        for sector in agg.sectors.values() {
            let any_cap = sector.items.iter().any(|e| e.market_cap_basic.is_some());
            if !any_cap {
                prop_assert_eq!(sector.market_cap(), None);
            }
            prop_assert_ne!(sector.market_cap(), Some(0.0));
        }
    }

    #[test]
    fn only_results_with_pct_are_plotted(case in arb_case()) {
        let agg = aggregate(&case.results, &case.sectors, &case.market_caps);
        let expected: BTreeSet<&str> = case
            .results
            .iter()
            .filter(|r| r.change_pct().is_some())
            .map(|r| r.symbol.as_str())
            .collect();
        let plotted: BTreeSet<&str> = agg.flat.iter().map(|e| e.symbol.as_str()).collect();
        prop_assert_eq!(expected, plotted);

        let bucketed: usize = agg.sectors.values().map(|s| s.items.len()).sum();
        prop_assert_eq!(bucketed, agg.flat.len());
    }
}

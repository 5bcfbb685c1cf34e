//! Treemap document and chart-input table.

use chrono::{DateTime, Utc};
use heatlab_core::domain::HistoryRange;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::aggregate::{Aggregation, FlatEntry};

pub const UNIFORM_NOTES: &str = "Blocks are uniform size; color = % change";
pub const MARKET_CAP_NOTES: &str = "Block area = market cap; color = % change";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("No valid items to plot (no data)")]
    NoValidItems,
}

/// How chart blocks are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizeMode {
    /// Every block has size 1.
    #[default]
    Uniform,
    /// Block area is the resolved market cap.
    MarketCap,
}

impl SizeMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SizeMode::Uniform => "uniform",
            SizeMode::MarketCap => "market_cap",
        }
    }

    fn notes(self) -> &'static str {
        match self {
            SizeMode::Uniform => UNIFORM_NOTES,
            SizeMode::MarketCap => MARKET_CAP_NOTES,
        }
    }
}

impl fmt::Display for SizeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SizeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "uniform" => Ok(SizeMode::Uniform),
            "market_cap" | "market-cap" | "marketcap" => Ok(SizeMode::MarketCap),
            other => Err(format!(
                "unknown size mode '{other}' (expected uniform or market_cap)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    #[serde(rename = "dataSource")]
    pub data_source: String,
    pub range: HistoryRange,
    /// UTC, `%Y-%m-%dT%H:%M:%SZ`.
    pub generated_at: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectorBlock {
    pub name: String,
    pub sector_market_cap: Option<f64>,
    pub items: Vec<FlatEntry>,
}

/// The run's terminal artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreemapDocument {
    pub meta: Meta,
    pub sectors: Vec<SectorBlock>,
    pub flat: Vec<FlatEntry>,
}

/// One row of the chart-input table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    /// `[sector, symbol]`
    pub path: [String; 2],
    pub name: String,
    pub size: f64,
    /// `change_pct`
    pub color: f64,
}

pub fn build_document(
    agg: Aggregation,
    data_source: &str,
    range: HistoryRange,
    size_mode: SizeMode,
    generated_at: DateTime<Utc>,
) -> Result<TreemapDocument, DocumentError> {
    if agg.is_empty() {
        return Err(DocumentError::NoValidItems);
    }

    let sectors = agg
        .sectors
        .into_values()
        .map(|sector| SectorBlock {
            sector_market_cap: sector.market_cap(),
            name: sector.name,
            items: sector.items,
        })
        .collect();

    Ok(TreemapDocument {
        meta: Meta {
            data_source: data_source.to_string(),
            range,
            generated_at: generated_at.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            notes: size_mode.notes().to_string(),
        },
        sectors,
        flat: agg.flat,
    })
}

/// Derive the chart table. In market-cap mode, entries without a market cap
/// have no area and are left out.
pub fn chart_table(flat: &[FlatEntry], size_mode: SizeMode) -> Vec<ChartRow> {
    flat.iter()
        .filter_map(|e| {
            let size = match size_mode {
                SizeMode::Uniform => 1.0,
                SizeMode::MarketCap => e.market_cap_basic?,
            };
            Some(ChartRow {
                path: [e.sector.clone(), e.symbol.clone()],
                name: e.name.clone(),
                size,
                color: e.change_pct,
            })
        })
        .collect()
}

//! SymbolResult: the fixed-shape outcome of summarizing one symbol.
//!
//! A result is one of three outcomes: a price summary, no usable data, or a
//! failure with a human-readable reason. The flat field view (`price`,
//! `change`, `change_pct`, `avg_volume`, `n_points`, `error`) is derived from
//! the outcome, so a failed result can never carry numbers and a summary
//! always has at least one observation.

use serde::{Deserialize, Serialize};

use super::symbol::Symbol;

/// Price movement over the requested window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    /// Last close.
    pub price: f64,
    /// Last close minus first close.
    pub change: f64,
    /// `change / first_close * 100`; `None` when the first close is zero.
    pub change_pct: Option<f64>,
    /// Mean of the volumes present in the series.
    pub avg_volume: Option<f64>,
    /// Number of bars in the series (always >= 1).
    pub n_points: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Summary(PriceSummary),
    /// The source answered but nothing survived normalization.
    NoData,
    /// Fetching or decoding failed.
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolResult {
    pub symbol: Symbol,
    pub outcome: Outcome,
}

impl SymbolResult {
    pub fn summary(symbol: impl Into<Symbol>, summary: PriceSummary) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: Outcome::Summary(summary),
        }
    }

    pub fn no_data(symbol: impl Into<Symbol>) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: Outcome::NoData,
        }
    }

    pub fn failed(symbol: impl Into<Symbol>, reason: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            outcome: Outcome::Failed {
                reason: reason.into(),
            },
        }
    }

    fn as_summary(&self) -> Option<&PriceSummary> {
        match &self.outcome {
            Outcome::Summary(s) => Some(s),
            _ => None,
        }
    }

    pub fn price(&self) -> Option<f64> {
        self.as_summary().map(|s| s.price)
    }

    pub fn change(&self) -> Option<f64> {
        self.as_summary().map(|s| s.change)
    }

    pub fn change_pct(&self) -> Option<f64> {
        self.as_summary().and_then(|s| s.change_pct)
    }

    pub fn avg_volume(&self) -> Option<f64> {
        self.as_summary().and_then(|s| s.avg_volume)
    }

    pub fn n_points(&self) -> usize {
        self.as_summary().map_or(0, |s| s.n_points)
    }

    pub fn error(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Failed { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self.outcome, Outcome::Failed { .. })
    }

    /// Flat record with nullable fields, as printed by the CLI.
    pub fn to_record(&self) -> SymbolRecord {
        SymbolRecord {
            symbol: self.symbol.clone(),
            price: self.price(),
            change: self.change(),
            change_pct: self.change_pct(),
            avg_volume: self.avg_volume(),
            n_points: self.n_points(),
            error: self.error().map(str::to_string),
        }
    }
}

/// Nullable-field view of a [`SymbolResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolRecord {
    pub symbol: Symbol,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub change_pct: Option<f64>,
    pub avg_volume: Option<f64>,
    pub n_points: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

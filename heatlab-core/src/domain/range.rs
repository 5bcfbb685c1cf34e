//! Requested history window.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How far back to look, expressed as a number of most-recent daily bars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum HistoryRange {
    #[serde(rename = "week")]
    Week,
    #[default]
    #[serde(rename = "month")]
    Month,
    #[serde(rename = "3mo")]
    ThreeMonths,
    #[serde(rename = "6mo")]
    SixMonths,
    #[serde(rename = "year")]
    Year,
}

impl HistoryRange {
    pub const ALL: [HistoryRange; 5] = [
        HistoryRange::Week,
        HistoryRange::Month,
        HistoryRange::ThreeMonths,
        HistoryRange::SixMonths,
        HistoryRange::Year,
    ];

    /// Number of bars requested from the history source.
    pub fn days(self) -> usize {
        match self {
            HistoryRange::Week => 7,
            HistoryRange::Month => 30,
            HistoryRange::ThreeMonths => 90,
            HistoryRange::SixMonths => 180,
            HistoryRange::Year => 365,
        }
    }

    /// Token used on the command line, in config files and in artifact names.
    pub fn as_str(self) -> &'static str {
        match self {
            HistoryRange::Week => "week",
            HistoryRange::Month => "month",
            HistoryRange::ThreeMonths => "3mo",
            HistoryRange::SixMonths => "6mo",
            HistoryRange::Year => "year",
        }
    }
}

impl fmt::Display for HistoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryRange {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(HistoryRange::Week),
            "month" => Ok(HistoryRange::Month),
            "3mo" => Ok(HistoryRange::ThreeMonths),
            "6mo" => Ok(HistoryRange::SixMonths),
            "year" => Ok(HistoryRange::Year),
            other => Err(format!(
                "unknown range '{other}'. Valid: week, month, 3mo, 6mo, year"
            )),
        }
    }
}

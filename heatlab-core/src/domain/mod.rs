//! Domain types for heatlab

pub mod bar;
pub mod range;
pub mod result;
pub mod symbol;

pub use bar::{Bar, CanonicalSeries};
pub use range::HistoryRange;
pub use result::{Outcome, PriceSummary, SymbolRecord, SymbolResult};
pub use symbol::{normalize_symbol, Symbol};

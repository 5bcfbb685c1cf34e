//! History sources and series normalization

pub mod cafef;
pub mod normalize;
pub mod provider;

pub use cafef::CafefProvider;
pub use normalize::{normalize, ColumnMap};
pub use provider::{DataError, HistorySource, RawRecord};

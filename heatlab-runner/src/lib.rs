//! Heatlab Runner — fetch fan-out, sector aggregation, document export.
//!
//! This crate builds on `heatlab-core` to provide:
//! - Run configuration (TOML) and input loading (symbols, sectors, market caps)
//! - Bounded-width fetch pool with progress reporting
//! - Order-independent sector aggregation with market-cap fallback
//! - Treemap document and chart table
//! - JSON / CSV / HTML artifact export

pub mod aggregate;
pub mod config;
pub mod coordinator;
pub mod document;
pub mod export;
pub mod inputs;
pub mod pipeline;

pub use aggregate::{aggregate, resolve_market_cap, Aggregation, FlatEntry, MarketCapSource, SectorEntry};
pub use config::{ConfigError, RunConfig};
pub use coordinator::{fetch_all, CoordinatorError, FetchProgress, LogProgress};
pub use document::{
    build_document, chart_table, ChartRow, DocumentError, Meta, SectorBlock, SizeMode,
    TreemapDocument,
};
pub use export::{ArtifactPaths, ArtifactWriter};
pub use inputs::{InputError, MarketCapMap, SectorInfo, SectorMap};
pub use pipeline::{run_and_export, run_pipeline, Inputs, PipelineError, PipelineOutput};

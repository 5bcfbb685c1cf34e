//! End-to-end run: fan-out fetch, aggregate, build the document.
//!
//! [`run_pipeline`] touches no files. [`run_and_export`] writes artifacts
//! only after a document was built, so a failed run leaves nothing on disk.

use chrono::Utc;
use heatlab_core::data::HistorySource;
use heatlab_core::domain::{Symbol, SymbolResult};
use thiserror::Error;
use tracing::{info, warn};

use crate::aggregate::aggregate;
use crate::config::RunConfig;
use crate::coordinator::{fetch_all, CoordinatorError, FetchProgress};
use crate::export::{ArtifactPaths, ArtifactWriter};
use crate::document::{build_document, chart_table, ChartRow, DocumentError, TreemapDocument};
use crate::inputs::{
    load_market_caps, load_sectors, load_symbols, InputError, MarketCapMap, SectorMap,
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Coordinator(#[from] CoordinatorError),

    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// Symbols plus the two optional mappings.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    pub symbols: Vec<Symbol>,
    pub sectors: SectorMap,
    pub market_caps: MarketCapMap,
}

impl Inputs {
    /// Load from the files named in `config`.
    pub fn load(config: &RunConfig) -> Result<Self, InputError> {
        Ok(Self {
            symbols: load_symbols(&config.symbols_file)?,
            sectors: load_sectors(&config.sectors_file)?,
            market_caps: load_market_caps(&config.market_caps_file)?,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub document: TreemapDocument,
    pub chart: Vec<ChartRow>,
    /// Every per-symbol result, failures included.
    pub results: Vec<SymbolResult>,
}

pub fn run_pipeline(
    config: &RunConfig,
    source: &dyn HistorySource,
    inputs: &Inputs,
    progress: Option<&dyn FetchProgress>,
) -> Result<PipelineOutput, PipelineError> {
    let results = fetch_all(
        source,
        &inputs.symbols,
        config.range.days(),
        config.workers,
        progress,
    )?;

    for r in &results {
        if let Some(reason) = r.error() {
            warn!(symbol = %r.symbol, %reason, "excluded from heatmap");
        }
    }

    let agg = aggregate(&results, &inputs.sectors, &inputs.market_caps);
    info!(
        plotted = agg.flat.len(),
        total = results.len(),
        sectors = agg.sectors.len(),
        "aggregation complete"
    );

    let document = build_document(agg, source.name(), config.range, config.size_mode, Utc::now())?;
    let chart = chart_table(&document.flat, config.size_mode);

    Ok(PipelineOutput {
        document,
        chart,
        results,
    })
}

/// Run the pipeline, then write its artifacts into `config.output_dir`.
pub fn run_and_export(
    config: &RunConfig,
    source: &dyn HistorySource,
    inputs: &Inputs,
    progress: Option<&dyn FetchProgress>,
) -> anyhow::Result<(PipelineOutput, ArtifactPaths)> {
    let output = run_pipeline(config, source, inputs, progress)?;
    let writer = ArtifactWriter::new(&config.output_dir)?;
    let paths = writer.write_all(&output.document, &output.chart)?;
    Ok((output, paths))
}

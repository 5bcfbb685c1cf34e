//! Heatlab CLI — sector heatmaps from daily price history.
//!
//! Commands:
//! - `build` — fetch every listed symbol, aggregate by sector, write artifacts
//! - `summary` — fetch and summarize a single symbol, print it as JSON
//! - `ranges` — list the accepted ranges and their bar counts

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use heatlab_core::data::cafef::DEFAULT_BASE_URL;
use heatlab_core::data::CafefProvider;
use heatlab_core::domain::{normalize_symbol, HistoryRange};
use heatlab_core::summarize_symbol;
use heatlab_runner::{run_and_export, Inputs, LogProgress, RunConfig, SizeMode};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "heatlab",
    about = "Heatlab — sector-grouped price-change heatmaps"
)]
struct Cli {
    /// Debug-level logging (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch all symbols and write the heatmap artifacts.
    Build {
        /// Range: week, month, 3mo, 6mo, year.
        #[arg(long)]
        range: Option<HistoryRange>,

        /// TOML config file; flags override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbol list, one ticker per line.
        #[arg(long)]
        symbols: Option<PathBuf>,

        /// Sector table (symbol, sector[, name]).
        #[arg(long)]
        sectors: Option<PathBuf>,

        /// Market-cap table (symbol, market_cap).
        #[arg(long)]
        market_caps: Option<PathBuf>,

        /// Concurrent fetches.
        #[arg(long)]
        workers: Option<usize>,

        /// Per-request timeout in seconds.
        #[arg(long)]
        timeout_secs: Option<u64>,

        /// Artifact directory.
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Block sizing: uniform or market_cap.
        #[arg(long)]
        size_mode: Option<SizeMode>,

        /// History endpoint host.
        #[arg(long)]
        base_url: Option<String>,
    },
    /// Fetch and summarize one symbol.
    Summary {
        /// Ticker (e.g. VNM).
        symbol: String,

        /// Range: week, month, 3mo, 6mo, year.
        #[arg(long, default_value = "month")]
        range: HistoryRange,

        /// Per-request timeout in seconds.
        #[arg(long, default_value_t = 10)]
        timeout_secs: u64,

        /// History endpoint host.
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },
    /// List accepted ranges.
    Ranges,
}

/// Flag overrides for `build`, applied on top of the config file.
struct BuildOverrides {
    range: Option<HistoryRange>,
    symbols: Option<PathBuf>,
    sectors: Option<PathBuf>,
    market_caps: Option<PathBuf>,
    workers: Option<usize>,
    timeout_secs: Option<u64>,
    output_dir: Option<PathBuf>,
    size_mode: Option<SizeMode>,
    base_url: Option<String>,
}

impl BuildOverrides {
    fn apply(self, config: &mut RunConfig) {
        if let Some(v) = self.range {
            config.range = v;
        }
        if let Some(v) = self.symbols {
            config.symbols_file = v;
        }
        if let Some(v) = self.sectors {
            config.sectors_file = v;
        }
        if let Some(v) = self.market_caps {
            config.market_caps_file = v;
        }
        if let Some(v) = self.workers {
            config.workers = v;
        }
        if let Some(v) = self.timeout_secs {
            config.timeout_secs = v;
        }
        if let Some(v) = self.output_dir {
            config.output_dir = v;
        }
        if let Some(v) = self.size_mode {
            config.size_mode = v;
        }
        if let Some(v) = self.base_url {
            config.base_url = v;
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            range,
            config,
            symbols,
            sectors,
            market_caps,
            workers,
            timeout_secs,
            output_dir,
            size_mode,
            base_url,
        } => run_build(
            config,
            BuildOverrides {
                range,
                symbols,
                sectors,
                market_caps,
                workers,
                timeout_secs,
                output_dir,
                size_mode,
                base_url,
            },
        ),
        Commands::Summary {
            symbol,
            range,
            timeout_secs,
            base_url,
        } => run_summary(&symbol, range, timeout_secs, &base_url),
        Commands::Ranges => {
            for range in HistoryRange::ALL {
                println!("{:<6} {:>3} days", range.as_str(), range.days());
            }
            Ok(())
        }
    }
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn run_build(config_path: Option<PathBuf>, overrides: BuildOverrides) -> Result<()> {
    let mut config = match &config_path {
        Some(path) => RunConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => RunConfig::default(),
    };
    overrides.apply(&mut config);
    config.validate()?;

    let inputs = Inputs::load(&config)?;
    info!(
        symbols = inputs.symbols.len(),
        sectors = inputs.sectors.len(),
        market_caps = inputs.market_caps.len(),
        range = %config.range,
        "inputs loaded"
    );

    let provider = CafefProvider::with_base_url(config.base_url.clone(), config.timeout())?;
    let (_, paths) = run_and_export(&config, &provider, &inputs, Some(&LogProgress))?;

    println!("Wrote JSON: {}", paths.document_json.display());
    println!("Wrote CSV:  {}", paths.chart_csv.display());
    println!("Wrote HTML: {}", paths.heatmap_html.display());
    Ok(())
}

fn run_summary(symbol: &str, range: HistoryRange, timeout_secs: u64, base_url: &str) -> Result<()> {
    let symbol = normalize_symbol(symbol).context("symbol must not be empty")?;
    let provider = CafefProvider::with_base_url(base_url, Duration::from_secs(timeout_secs))?;

    let result = summarize_symbol(&provider, &symbol, range.days());
    println!("{}", serde_json::to_string_pretty(&result.to_record())?);
    Ok(())
}

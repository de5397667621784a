//! FLO-2D output extractor.
//!
//! Turns model outputs into ASCII grids and station water-level series, and
//! stores forecast horizons in a JSON catalog.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};

use extractor::{
    init_logging, load_extractor_config, resolve_config, ExtractorFileConfig, LogFormat,
    ResolvedConfig, RunArgs,
};
use ingestion::{subtract_grid_files, Extractor, RunReport, Step, SLICED_DEPTH_FILE};
use storage::{JsonCatalogSink, Station};

#[derive(Parser, Debug)]
#[command(name = "extractor")]
#[command(about = "Extract grids and water-level series from FLO-2D model outputs")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "EXTRACTOR_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (RUST_LOG takes precedence)
    #[arg(long)]
    log_level: Option<String>,

    /// Log format
    #[arg(long, value_enum)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write one water-level grid per time step
    Grid {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Extract station series and store forecast horizons
    WaterLevel {
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Grids and station series in one pass
    Run {
        #[command(flatten)]
        run: RunArgs,
        #[command(flatten)]
        store: StoreArgs,
    },
    /// Write the maximum-inundation grid
    MaxGrid {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Copy the depth blocks inside --start-hour/--end-hour to a new file
    Slice {
        #[command(flatten)]
        run: RunArgs,
        /// Output file (default: TIMDEP_S.OUT in the output directory)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Write the cell-wise difference of two ASCII grids
    Subtract {
        a: PathBuf,
        b: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
    },
}

#[derive(clap::Args, Debug, Clone, Default)]
struct StoreArgs {
    /// Only write CSV files, do not store forecasts
    #[arg(long)]
    no_store: bool,

    /// Add configured stations to the catalog before storing
    #[arg(long)]
    register_stations: bool,
}

fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            error!(error = format!("{:#}", e), "Extraction failed");
            eprintln!("Error: {:#}", e);
            ExitCode::from(1)
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    let file = match &cli.config {
        Some(path) => load_extractor_config(path)?,
        None => ExtractorFileConfig::default(),
    };

    let level = cli.log_level.clone().unwrap_or_else(|| file.logging.level.clone());
    let format = cli
        .log_format
        .or_else(|| LogFormat::from_name(&file.logging.format))
        .unwrap_or(LogFormat::Pretty);
    init_logging(&level, format)?;

    info!(config = ?cli.config, "Starting FLO-2D extractor");

    let now = chrono::Local::now().naive_local();
    match cli.command {
        Command::Grid { run } => {
            let resolved = resolve_config(&file, &run, now)?;
            Ok(run_steps(&resolved, &[Step::Grid], None)?.is_success())
        }
        Command::MaxGrid { run } => {
            let resolved = resolve_config(&file, &run, now)?;
            Ok(run_steps(&resolved, &[Step::MaxGrid], None)?.is_success())
        }
        Command::WaterLevel { run, store } => {
            let resolved = resolve_config(&file, &run, now)?;
            let steps = water_level_steps(&store, &[]);
            Ok(run_steps(&resolved, &steps, Some(&store))?.is_success())
        }
        Command::Run { run, store } => {
            let resolved = resolve_config(&file, &run, now)?;
            let steps = water_level_steps(&store, &[Step::Grid]);
            Ok(run_steps(&resolved, &steps, Some(&store))?.is_success())
        }
        Command::Slice { run, output } => {
            let resolved = resolve_config(&file, &run, now)?;
            let config = &resolved.extraction;
            let output = output.unwrap_or_else(|| config.output_dir.join(SLICED_DEPTH_FILE));
            let summary = Extractor::new(config)
                .slice(&output)
                .with_context(|| format!("Failed to slice into {:?}", output))?;
            info!(
                blocks_read = summary.blocks_read,
                blocks_written = summary.blocks_written,
                "Slice complete"
            );
            Ok(true)
        }
        Command::Subtract { a, b, output } => {
            subtract_grid_files(&a, &b, &output)
                .with_context(|| format!("Failed to subtract {:?} - {:?}", a, b))?;
            Ok(true)
        }
    }
}

fn water_level_steps(store: &StoreArgs, before: &[Step]) -> Vec<Step> {
    let mut steps = before.to_vec();
    steps.extend([Step::ChannelSeries, Step::FloodPlainSeries]);
    if !store.no_store {
        steps.push(Step::Forecast);
    }
    steps
}

fn run_steps(resolved: &ResolvedConfig, steps: &[Step], store: Option<&StoreArgs>) -> Result<RunReport> {
    let config = &resolved.extraction;
    let extractor = Extractor::new(config);

    let needs_sink = steps.contains(&Step::Forecast);
    if !needs_sink {
        return Ok(extractor.run(steps, None));
    }

    let mut catalog = JsonCatalogSink::open(&resolved.catalog_path)
        .with_context(|| format!("Failed to open catalog {:?}", resolved.catalog_path))?;

    if store.map_or(false, |s| s.register_stations) {
        let stations = &config.water_level.stations;
        for name in stations.channel.values().chain(stations.flood_plain.values()) {
            if catalog.add_station(Station::new(name.clone()))? {
                info!(station = %name, "Registered station");
            }
        }
    }

    let report = extractor.run(steps, Some(&mut catalog));
    info!(catalog = %catalog.path().display(), "Catalog updated");
    Ok(report)
}

//! Resolution of the effective extraction configuration.
//!
//! Precedence, highest first: command line, run file (`RUN_FLO2D.json`),
//! YAML configuration, built-in defaults.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, NaiveTime, Timelike};
use clap::Args;
use flo2d_common::{parse_date, parse_time, HourWindow, UtcOffset};
use flo2d_parser::ChannelColumn;
use ingestion::{ExtractionConfig, RunTimes, DEFAULT_MODEL};
use tracing::info;

use crate::config_loader::ExtractorFileConfig;
use crate::run_file::RunFile;

/// Default run file name, looked up in the input directory.
pub const RUN_FILE_NAME: &str = "RUN_FLO2D.json";

/// Default catalog file name, placed in the output directory.
pub const CATALOG_FILE_NAME: &str = "catalog.json";

/// Options shared by every extraction command.
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory holding the model outputs
    #[arg(short = 'i', long, env = "FLO2D_MODEL_DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving grids and series (default: input directory)
    #[arg(short = 'o', long, env = "FLO2D_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Model name (FLO2D_250, FLO2D_150, FLO2D_30)
    #[arg(short, long)]
    pub model: Option<String>,

    /// Cell size in metres, overriding the model preset
    #[arg(long)]
    pub cell_size: Option<f64>,

    /// Model state date (YYYY-MM-DD)
    #[arg(short = 'd', long)]
    pub date: Option<String>,

    /// Model state time (HH:MM:SS)
    #[arg(short = 't', long)]
    pub time: Option<String>,

    /// Date of model hour 0 (YYYY-MM-DD)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Time of model hour 0 (HH:MM:SS)
    #[arg(long)]
    pub start_time: Option<String>,

    /// Suffix of the output directories
    #[arg(long)]
    pub suffix: Option<String>,

    /// Run name, optionally with a <strftime> section
    #[arg(long)]
    pub run_name: Option<String>,

    /// UTC offset applied before storage, e.g. +05:30
    #[arg(long, allow_hyphen_values = true)]
    pub utc_offset: Option<String>,

    /// Minimum depth written to grids
    #[arg(long)]
    pub threshold: Option<f64>,

    /// First model hour processed
    #[arg(long)]
    pub start_hour: Option<f64>,

    /// Last model hour processed
    #[arg(long)]
    pub end_hour: Option<f64>,

    /// Replace stored forecast events that already exist
    #[arg(short, long)]
    pub force: bool,
}

/// Effective configuration of one invocation.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub extraction: ExtractionConfig,
    pub catalog_path: PathBuf,
}

fn first<T: Clone>(options: &[Option<&T>]) -> Option<T> {
    options.iter().flatten().next().map(|v| (*v).clone())
}

fn channel_column(name: Option<&str>) -> ChannelColumn {
    match name.map(str::to_lowercase).as_deref() {
        Some("depth") => ChannelColumn::Depth,
        _ => ChannelColumn::Elevation,
    }
}

/// Combine the YAML file, the run file and the command line into one
/// [`ExtractionConfig`]. `now` provides the default model state time.
pub fn resolve_config(
    file: &ExtractorFileConfig,
    args: &RunArgs,
    now: NaiveDateTime,
) -> Result<ResolvedConfig> {
    let input_dir = args
        .input_dir
        .clone()
        .or_else(|| file.input_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("."));
    let output_dir = args
        .output_dir
        .clone()
        .or_else(|| file.output_dir.as_ref().map(PathBuf::from))
        .unwrap_or_else(|| input_dir.clone());

    let run_file_path = input_dir.join(file.run_file.as_deref().unwrap_or(RUN_FILE_NAME));
    let run = RunFile::load(&run_file_path)?;

    // Times
    let state_date = match first(&[args.date.as_ref(), run.model_state_date.as_ref()]) {
        Some(s) => parse_date(&s)?,
        None => now.date(),
    };
    let state_time = match first(&[args.time.as_ref(), run.model_state_time.as_ref()]) {
        Some(s) => parse_time(&s)?,
        None => now.time().with_nanosecond(0).unwrap_or(now.time()),
    };
    let base_date = match first(&[args.start_date.as_ref(), run.timeseries_start_date.as_ref()]) {
        Some(s) => parse_date(&s)?,
        None => state_date,
    };
    let base_time = match first(&[args.start_time.as_ref(), run.timeseries_start_time.as_ref()]) {
        Some(s) => parse_time(&s)?,
        None => NaiveTime::MIN,
    };
    let mut times = RunTimes::new(state_date, state_time).with_base(base_date.and_time(base_time));
    if let Some(suffix) = first(&[args.suffix.as_ref(), run.output_suffix.as_ref()]) {
        times = times.with_output_suffix(suffix);
    }

    let model = first(&[args.model.as_ref(), file.model.as_ref()])
        .unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let cell_size = args.cell_size.or(file.cell_size);
    let mut config = ExtractionConfig::new(input_dir, output_dir, times).with_model(model, cell_size);

    // File names
    let inputs = &file.inputs;
    let set = |target: &mut String, value: &Option<String>| {
        if let Some(v) = value {
            *target = v.clone();
        }
    };
    set(&mut config.inputs.reference_points, &inputs.reference_points);
    set(&mut config.inputs.depth, &inputs.depth);
    set(&mut config.inputs.hydrograph, &inputs.hydrograph);
    set(&mut config.inputs.max_surface, &inputs.max_surface);
    set(&mut config.inputs.topography, &inputs.topography);

    let outputs = &file.outputs;
    set(&mut config.outputs.grid_file, &outputs.grid_file);
    set(&mut config.outputs.grid_dir, &outputs.grid_dir);
    set(&mut config.outputs.water_level_file, &outputs.water_level_file);
    set(&mut config.outputs.water_level_dir, &outputs.water_level_dir);
    set(&mut config.outputs.max_grid_file, &outputs.max_grid_file);

    // Grid
    let grid = &file.grid;
    if let Some(threshold) = args.threshold.or(grid.min_threshold) {
        config.grid.min_threshold = threshold;
    }
    if let Some(nodata) = grid.nodata {
        config.grid.nodata = nodata;
    }
    if let Some(column) = grid.depth_column {
        config.grid.depth_column = column;
    }
    let start = args.start_hour.or(grid.start_hour);
    let end = args.end_hour.or(grid.end_hour);
    if start.is_some() || end.is_some() {
        config.grid.window = HourWindow::new(start.unwrap_or(f64::NEG_INFINITY), end)?;
    }

    // Water level
    let wl = &file.water_level;
    config.water_level.stations = wl.stations.clone();
    config.water_level.channel_column = channel_column(wl.channel_column.as_deref());
    if let Some(column) = wl.flood_plain_column {
        config.water_level.flood_plain_column = column;
    }
    if let Some(missing) = wl.missing_value {
        config.water_level.missing_value = missing;
    }
    config.water_level.force_insert = args.force || wl.force_insert.unwrap_or(false);
    if let Some(name) = first(&[args.run_name.as_ref(), run.run_name.as_ref(), wl.run_name.as_ref()]) {
        config.water_level.run_name = name;
    }
    if let Some(offset) = first(&[args.utc_offset.as_ref(), run.utc_offset.as_ref(), wl.utc_offset.as_ref()]) {
        config.water_level.utc_offset = UtcOffset::parse(&offset)?;
    }

    config.validate().context("Invalid extraction configuration")?;

    let catalog_path = file
        .sink
        .catalog
        .as_ref()
        .map(PathBuf::from)
        .unwrap_or_else(|| config.output_dir.join(CATALOG_FILE_NAME));

    info!(
        model = %config.model,
        cell_size = config.cell_size,
        state = %config.times.state,
        base = %config.times.base,
        input_dir = %config.input_dir.display(),
        output_dir = %config.output_dir.display(),
        "Resolved configuration"
    );

    Ok(ResolvedConfig {
        extraction: config,
        catalog_path,
    })
}
